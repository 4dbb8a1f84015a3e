//! Error types for `ptyrun`
//!
//! Every failure the wrapper itself can produce maps onto a dedicated exit
//! code, so automation callers can tell a wrapper failure apart from the
//! child's own exit status.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `ptyrun` CLI operations.
///
/// A child that starts successfully owns the exit code: whatever it exits
/// with is what the wrapper exits with. The constants below are only used
/// when the wrapper fails on its own or is signalled.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error (relay I/O failure)
    pub const ERROR: i32 = 1;

    /// Pseudo-terminal or signal handling unavailable on this host
    pub const ENVIRONMENT_ERROR: i32 = 125;

    /// Executable found but could not be executed
    pub const NOT_EXECUTABLE: i32 = 126;

    /// Executable or working directory not found
    pub const LAUNCH_FAILED: i32 = 127;

    /// Terminated by SIGHUP
    pub const HANGUP: i32 = 129;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `ptyrun` operations.
///
/// A child that exits non-zero is *not* an error; see
/// [`RunOutcome`](crate::pty::RunOutcome).
#[derive(Debug, Error)]
pub enum PtyrunError {
    /// The target executable could not be started
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// The host lacks a capability the wrapper needs
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// I/O error while relaying
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PtyrunError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Launch(e) => e.exit_code(),
            Self::Environment(_) => ExitCode::ENVIRONMENT_ERROR,
            Self::Io(_) | Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Launch Errors
// ============================================================================

/// Failures to start the target executable.
///
/// These are reported before the child runs, so they never collide with a
/// child's exit status.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Executable does not exist on disk or in `PATH`
    #[error("launch failed: executable not found: {program}")]
    NotFound {
        /// Program as supplied by the caller
        program: PathBuf,
    },

    /// Path exists but is not an executable regular file
    #[error("launch failed: not an executable file: {path}")]
    NotExecutable {
        /// Resolved path
        path: PathBuf,
    },

    /// Requested working directory is missing or not a directory
    #[error("launch failed: working directory not found: {path}")]
    WorkingDirectory {
        /// Requested working directory
        path: PathBuf,
    },

    /// The operating system refused to start the process
    #[error("launch failed: could not spawn {program}: {message}")]
    SpawnFailed {
        /// Resolved executable path
        program: PathBuf,
        /// Underlying spawn error
        message: String,
    },
}

impl LaunchError {
    /// Returns the exit code for this launch failure.
    ///
    /// Follows the shell convention: 127 for "not found", 126 for
    /// "found but cannot execute".
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::WorkingDirectory { .. } => ExitCode::LAUNCH_FAILED,
            Self::NotExecutable { .. } | Self::SpawnFailed { .. } => ExitCode::NOT_EXECUTABLE,
        }
    }
}

// ============================================================================
// Environment Errors
// ============================================================================

/// Host capability errors.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    /// Pseudo-terminal allocation unsupported or exhausted
    #[error("pseudo-terminal unavailable: {0}")]
    PtyUnavailable(String),

    /// Pseudo-terminal allocated but its streams could not be opened
    #[error("pseudo-terminal setup failed: {0}")]
    PtySetup(String),

    /// Signal handlers could not be installed
    #[error("signal handling unavailable: {0}")]
    SignalHandler(#[source] std::io::Error),
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `ptyrun` operations.
pub type Result<T> = std::result::Result<T, PtyrunError>;

// ============================================================================
// Tests
// ============================================================================
