//! Relay configuration
//!
//! Knobs for a single wrapped run. The CLI fills these from flags and
//! `PTYRUN_*` environment variables; library callers use [`RelayConfig::default`].

use std::time::Duration;

use portable_pty::PtySize;

/// Default terminal dimensions.
pub const DEFAULT_ROWS: u16 = 40;
/// Default terminal dimensions.
pub const DEFAULT_COLS: u16 = 120;

/// How long to keep reading child output after it exits.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Grace period between forwarding a signal and sending SIGKILL.
pub const DEFAULT_KILL_TIMEOUT: Duration = Duration::from_secs(5);

/// Pseudo-terminal window size reported to the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    /// Number of rows
    pub rows: u16,
    /// Number of columns
    pub cols: u16,
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
        }
    }
}

impl From<TerminalSize> for PtySize {
    fn from(size: TerminalSize) -> Self {
        Self {
            rows: size.rows,
            cols: size.cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

/// Configuration for one wrapped run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Window size of the allocated pseudo-terminal.
    pub size: TerminalSize,
    /// Copy the caller's stdin into the pseudo-terminal.
    pub forward_stdin: bool,
    /// Upper bound on reading leftover output once the child has exited.
    ///
    /// Grandchildren that inherited the terminal can keep it open forever;
    /// after this long the wrapper stops waiting for them.
    pub drain_timeout: Duration,
    /// Time the child gets to exit after a forwarded signal.
    pub kill_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            size: TerminalSize::default(),
            forward_stdin: true,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            kill_timeout: DEFAULT_KILL_TIMEOUT,
        }
    }
}
