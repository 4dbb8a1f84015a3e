//! Pseudo-terminal process wrapper.
//!
//! [`run`] is the whole lifecycle of one wrapped invocation:
//!
//! 1. resolve the executable and check the working directory
//! 2. allocate a pty pair and spawn the child on the slave side
//! 3. relay master output to the caller and caller input to the master
//! 4. wait for the child to exit, or forward a termination signal to it
//! 5. drain leftover output, release the pty, report the outcome
//!
//! The pty pair belongs to a single run and is closed when the run returns,
//! whichever path it returns by.

mod raw_mode;
pub mod relay;

use std::io::{Read, Write};
use std::sync::{Arc, Mutex};

use nix::errno::Errno;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;
use portable_pty::{Child, ChildKiller, ExitStatus, MasterPty, PtyPair, native_pty_system};
use scopeguard::ScopeGuard;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{RelayConfig, TerminalSize};
use crate::error::{EnvironmentError, LaunchError, Result};
use crate::invocation::Invocation;
use crate::signals::{self, ForwardedSignal, SignalListener};

pub use raw_mode::RawModeGuard;
pub use relay::SharedBuffer;

// ============================================================================
// Outcome
// ============================================================================

/// How a wrapped run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The child exited on its own with this code, or `128 + signo` if a
    /// signal killed it.
    Exited(i32),
    /// The wrapper was signalled and passed the signal on.
    Signalled {
        /// Signal received and forwarded
        signal: ForwardedSignal,
        /// Child exit code, if it exited within the grace period
        child_code: Option<i32>,
    },
}

impl RunOutcome {
    /// Exit code the wrapper should exit with.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Exited(code) => *code,
            Self::Signalled { signal, .. } => signal.exit_code(),
        }
    }
}

fn exit_code_of(status: &ExitStatus) -> i32 {
    i32::try_from(status.exit_code()).unwrap_or(i32::MAX)
}

/// Blocks until the child exits and returns its exit code.
///
/// portable-pty folds every signal death into code 1, so the child is
/// reaped with `waitpid` to keep the signal number.
fn wait_for_exit(
    pid: Option<u32>,
    mut child: Box<dyn Child + Send + Sync>,
) -> std::io::Result<i32> {
    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return child.wait().map(|status| exit_code_of(&status));
    };

    loop {
        match waitpid(Pid::from_raw(pid), None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(code),
            Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(128 + sig as i32),
            Ok(_) | Err(Errno::EINTR) => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Kills and reaps a child whose relays could not be set up.
fn reap_after_setup_failure(pid: Option<u32>, mut child: Box<dyn Child + Send + Sync>) {
    warn!(?pid, "relay setup failed, killing child");
    match pid {
        Some(pid) => {
            let _ = signals::force_kill(pid);
        }
        None => {
            let _ = child.kill();
        }
    }
    let _ = child.wait();
}

// ============================================================================
// Caller streams
// ============================================================================

/// The caller's side of the relay.
pub struct RelayIo {
    input: Option<Box<dyn Read + Send>>,
    output: Box<dyn Write + Send>,
    _raw_mode: Option<RawModeGuard>,
}

impl RelayIo {
    /// Relays the process's own stdin and stdout.
    ///
    /// With `forward_stdin` and a terminal on stdin, the terminal is put in
    /// raw mode until this value is dropped.
    #[must_use]
    pub fn stdio(forward_stdin: bool) -> Self {
        let (input, raw_mode): (Option<Box<dyn Read + Send>>, _) = if forward_stdin {
            (Some(Box::new(std::io::stdin())), RawModeGuard::enable())
        } else {
            (None, None)
        };
        Self {
            input,
            output: Box::new(std::io::stdout()),
            _raw_mode: raw_mode,
        }
    }

    /// Relays arbitrary streams.
    pub fn new<W>(input: Option<Box<dyn Read + Send>>, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            input,
            output: Box::new(output),
            _raw_mode: None,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// A child running on the slave side of a freshly allocated pty.
///
/// Dropping the session closes the master; the slave is already closed in
/// the parent once the child has been spawned.
pub struct PtySession {
    master: Box<dyn MasterPty + Send>,
    child: Box<dyn Child + Send + Sync>,
    pid: Option<u32>,
}

impl PtySession {
    /// Resolves, allocates and spawns.
    ///
    /// # Errors
    ///
    /// Returns a `LaunchError` if the executable or working directory is
    /// unusable or the spawn fails, and `EnvironmentError::PtyUnavailable`
    /// if no pty can be allocated.
    pub fn spawn(invocation: &Invocation, size: TerminalSize) -> Result<Self> {
        let program = invocation.resolve_program()?;
        invocation.check_working_dir()?;

        let PtyPair { master, slave } = native_pty_system()
            .openpty(size.into())
            .map_err(|e| EnvironmentError::PtyUnavailable(e.to_string()))?;

        let child = slave
            .spawn_command(invocation.command_builder(&program))
            .map_err(|e| LaunchError::SpawnFailed {
                program: program.clone(),
                message: e.to_string(),
            })?;
        // The child holds its own copies; ours would keep the master from
        // ever seeing end of stream.
        drop(slave);

        let pid = child.process_id();
        info!(?pid, program = %program.display(), "child started");

        Ok(Self { master, child, pid })
    }

    /// Process id of the child, when the platform reports one.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }
}

// ============================================================================
// Run
// ============================================================================

/// Runs `invocation` under a pty, relaying through `io`, until it exits.
///
/// A non-zero child exit is a successful run: it comes back as
/// `RunOutcome::Exited` carrying the child's code.
///
/// # Errors
///
/// Returns `PtyrunError::Launch` if the child cannot be started,
/// `PtyrunError::Environment` if the pty or signal handlers are unavailable,
/// and `PtyrunError::Io` if waiting on the child fails.
pub async fn run(invocation: &Invocation, config: &RelayConfig, io: RelayIo) -> Result<RunOutcome> {
    let mut signals = SignalListener::install()?;

    let PtySession { master, child, pid } = PtySession::spawn(invocation, config.size)?;
    let RelayIo {
        input,
        output,
        _raw_mode,
    } = io;

    // Until the relays are up, a failure must not leave the child running.
    let child = scopeguard::guard(child, |child| reap_after_setup_failure(pid, child));

    let reader = master
        .try_clone_reader()
        .map_err(|e| EnvironmentError::PtySetup(e.to_string()))?;
    let output_task = tokio::task::spawn_blocking(move || relay::pump(reader, output));

    let pty_writer = match input {
        Some(input) => {
            let writer: relay::SharedWriter = Arc::new(Mutex::new(Some(
                master
                    .take_writer()
                    .map_err(|e| EnvironmentError::PtySetup(e.to_string()))?,
            )));
            relay::spawn_input(input, Arc::clone(&writer))?;
            Some(writer)
        }
        None => None,
    };

    let child = ScopeGuard::into_inner(child);
    let killer = child.clone_killer();
    let mut wait_task = tokio::task::spawn_blocking(move || wait_for_exit(pid, child));

    let outcome: std::io::Result<RunOutcome> = tokio::select! {
        code = &mut wait_task => {
            code.map_err(std::io::Error::other)
                .and_then(|code| code.map(RunOutcome::Exited))
        }
        signal = signals.recv() => {
            info!(%signal, ?pid, "forwarding signal to child");
            Ok(terminate(pid, killer, signal, config, &mut wait_task).await)
        }
    };

    drain(output_task, config).await;

    if let Some(writer) = &pty_writer {
        relay::close_writer(writer);
    }
    drop(master);
    debug!(?outcome, "pty released");

    Ok(outcome?)
}

/// Forwards `signal`, then escalates to SIGKILL after the grace period.
async fn terminate(
    pid: Option<u32>,
    mut killer: Box<dyn ChildKiller + Send + Sync>,
    signal: ForwardedSignal,
    config: &RelayConfig,
    wait_task: &mut JoinHandle<std::io::Result<i32>>,
) -> RunOutcome {
    match pid {
        Some(pid) => {
            if let Err(e) = signals::forward(pid, signal.as_nix()) {
                debug!(pid, error = %e, "signal not delivered");
            }
        }
        None => {
            let _ = killer.kill();
        }
    }

    match tokio::time::timeout(config.kill_timeout, &mut *wait_task).await {
        Ok(Ok(Ok(code))) => {
            return RunOutcome::Signalled {
                signal,
                child_code: Some(code),
            };
        }
        Ok(_) => {
            return RunOutcome::Signalled {
                signal,
                child_code: None,
            };
        }
        Err(_) => {}
    }

    warn!(?pid, timeout = ?config.kill_timeout, "child ignored signal, killing");
    match pid {
        Some(pid) => {
            let _ = signals::force_kill(pid);
        }
        None => {
            let _ = killer.kill();
        }
    }

    let child_code = match tokio::time::timeout(config.kill_timeout, wait_task).await {
        Ok(Ok(Ok(code))) => Some(code),
        _ => None,
    };
    RunOutcome::Signalled { signal, child_code }
}

/// Waits for the output relay to reach end of stream, bounded by the drain
/// timeout.
async fn drain(output_task: JoinHandle<std::io::Result<u64>>, config: &RelayConfig) {
    match tokio::time::timeout(config.drain_timeout, output_task).await {
        Ok(Ok(Ok(bytes))) => debug!(bytes, "output relay finished"),
        Ok(Ok(Err(e))) => warn!(error = %e, "output relay failed"),
        Ok(Err(e)) => warn!(error = %e, "output relay panicked"),
        Err(_) => warn!(
            timeout = ?config.drain_timeout,
            "terminal still open after child exit, detaching output relay"
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================
