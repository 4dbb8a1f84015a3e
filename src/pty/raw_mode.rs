//! Raw mode for the caller's terminal.
//!
//! When the wrapper runs in front of a human, keystrokes must reach the
//! child unprocessed: Ctrl+C becomes a byte the child's own terminal turns
//! into SIGINT, and line editing happens in the child. The guard puts stdin
//! into raw mode and restores the saved settings when dropped.

use std::io::IsTerminal;

use nix::sys::termios::{self, SetArg, Termios};
use tracing::{debug, warn};

/// Restores the original terminal settings on drop.
pub struct RawModeGuard {
    original: Termios,
}

impl RawModeGuard {
    /// Switches stdin to raw mode if it is a terminal.
    ///
    /// Returns `None` when stdin is not a terminal or its settings cannot
    /// be changed; relaying still works, just without raw input.
    #[must_use]
    pub fn enable() -> Option<Self> {
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return None;
        }

        let original = match termios::tcgetattr(&stdin) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "could not read terminal settings");
                return None;
            }
        };

        let mut raw = original.clone();
        termios::cfmakeraw(&mut raw);
        if let Err(e) = termios::tcsetattr(&stdin, SetArg::TCSANOW, &raw) {
            warn!(error = %e, "could not enable raw mode");
            return None;
        }

        debug!("stdin switched to raw mode");
        Some(Self { original })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(e) = termios::tcsetattr(std::io::stdin(), SetArg::TCSANOW, &self.original) {
            warn!(error = %e, "could not restore terminal settings");
        }
    }
}
