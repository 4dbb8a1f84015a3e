//! Shared integration-test harness for running the `ptyrun` binary against
//! stub executables.

#![allow(dead_code)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;

/// Upper bound for any single wrapper run in these tests.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(20);

/// Helpers for invoking the built `ptyrun` binary.
pub struct PtyrunProcess;

impl PtyrunProcess {
    /// Path of the binary under test.
    #[must_use]
    pub fn bin() -> &'static str {
        env!("CARGO_BIN_EXE_ptyrun")
    }

    /// A `Command` for the binary with stdin detached and logging quiet.
    #[must_use]
    pub fn command(args: &[&str]) -> Command {
        let mut cmd = Command::new(Self::bin());
        cmd.args(args)
            .stdin(Stdio::null())
            .env_remove("PTYRUN_LOG_LEVEL")
            .env_remove("CLAUDE_CODE_BIN");
        cmd
    }

    /// Runs the binary to completion and captures its output.
    ///
    /// Panics if the run exceeds [`RUN_TIMEOUT`], so a hung wrapper fails the
    /// test instead of stalling it.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        let child = Self::command(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn ptyrun");

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(child.wait_with_output());
        });

        rx.recv_timeout(RUN_TIMEOUT)
            .unwrap_or_else(|_| panic!("ptyrun did not exit within {RUN_TIMEOUT:?}: {args:?}"))
            .expect("failed to collect output")
    }
}

/// Writes an executable shell script named `name` into `dir`.
#[allow(clippy::missing_panics_doc)]
pub fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    {
        let mut file = std::fs::File::create(&path).expect("create stub");
        writeln!(file, "#!/bin/sh").expect("write stub");
        file.write_all(body.as_bytes()).expect("write stub");
        file.sync_all().expect("sync stub");
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod stub");
    path
}

/// Child output with the terminal's CRLF line endings folded to LF.
#[must_use]
pub fn normalized_stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).replace("\r\n", "\n")
}
