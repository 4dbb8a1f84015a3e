//! Termination signal forwarding.
//!
//! The wrapper listens for SIGINT, SIGTERM and SIGHUP while the child runs.
//! A received signal is passed on to the child's process group so the child
//! (and anything it spawned on the same terminal) goes down with the wrapper.

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill, killpg};
use nix::unistd::Pid;
use tokio::signal::unix::{SignalKind, signal};
use tracing::debug;

use crate::error::{EnvironmentError, ExitCode};

/// A termination signal the wrapper forwards to its child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardedSignal {
    /// SIGINT
    Interrupt,
    /// SIGTERM
    Terminate,
    /// SIGHUP
    Hangup,
}

impl ForwardedSignal {
    /// The corresponding `nix` signal.
    #[must_use]
    pub const fn as_nix(self) -> Signal {
        match self {
            Self::Interrupt => Signal::SIGINT,
            Self::Terminate => Signal::SIGTERM,
            Self::Hangup => Signal::SIGHUP,
        }
    }

    /// Exit code the wrapper uses after forwarding this signal (`128 + signo`).
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Interrupt => ExitCode::INTERRUPTED,
            Self::Terminate => ExitCode::TERMINATED,
            Self::Hangup => ExitCode::HANGUP,
        }
    }
}

impl std::fmt::Display for ForwardedSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_nix().as_str())
    }
}

/// Listens for the signals the wrapper forwards.
///
/// Install it before spawning the child so no signal slips through between
/// spawn and the first `recv`.
pub struct SignalListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

impl SignalListener {
    /// Registers the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns `EnvironmentError::SignalHandler` if registration fails.
    pub fn install() -> Result<Self, EnvironmentError> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).map_err(EnvironmentError::SignalHandler)?,
            terminate: signal(SignalKind::terminate()).map_err(EnvironmentError::SignalHandler)?,
            hangup: signal(SignalKind::hangup()).map_err(EnvironmentError::SignalHandler)?,
        })
    }

    /// Waits for the next forwarded signal.
    pub async fn recv(&mut self) -> ForwardedSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ForwardedSignal::Interrupt,
            _ = self.terminate.recv() => ForwardedSignal::Terminate,
            _ = self.hangup.recv() => ForwardedSignal::Hangup,
        }
    }
}

/// Sends `sig` to the process group led by `pid`, falling back to `pid` alone.
///
/// The child runs as a session leader on its terminal, so its pid doubles
/// as its process group id.
///
/// # Errors
///
/// Returns the errno of the final `kill` attempt. `ESRCH` means the child
/// is already gone.
pub fn forward(pid: u32, sig: Signal) -> nix::Result<()> {
    let pid = Pid::from_raw(i32::try_from(pid).map_err(|_| Errno::EINVAL)?);
    match killpg(pid, sig) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!(%pid, signal = %sig, error = %e, "killpg failed, signalling pid");
            kill(pid, sig)
        }
    }
}

/// Sends SIGKILL to the child's process group.
///
/// # Errors
///
/// See [`forward`].
pub fn force_kill(pid: u32) -> nix::Result<()> {
    forward(pid, Signal::SIGKILL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_128_plus_signo() {
        for sig in [
            ForwardedSignal::Interrupt,
            ForwardedSignal::Terminate,
            ForwardedSignal::Hangup,
        ] {
            assert_eq!(sig.exit_code(), 128 + sig.as_nix() as i32);
        }
    }

    #[test]
    fn display_uses_signal_name() {
        assert_eq!(ForwardedSignal::Terminate.to_string(), "SIGTERM");
        assert_eq!(ForwardedSignal::Interrupt.to_string(), "SIGINT");
    }

    #[test]
    fn forward_to_missing_process_is_esrch() {
        // Above any possible pid_max, so never a live process.
        let err = forward(i32::MAX as u32, Signal::SIGTERM).unwrap_err();
        assert_eq!(err, Errno::ESRCH);
    }

    #[tokio::test]
    async fn install_listener() {
        assert!(SignalListener::install().is_ok());
    }

    #[test]
    fn forward_terminates_child_group() {
        use std::os::unix::process::CommandExt;

        let mut child = std::process::Command::new("sleep")
            .arg("30")
            .process_group(0)
            .spawn()
            .unwrap();

        forward(child.id(), Signal::SIGTERM).unwrap();
        let status = child.wait().unwrap();
        assert!(!status.success());
    }
}
