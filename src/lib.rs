//! `ptyrun` - run interactive agent CLIs headlessly under a pseudo-terminal
//!
//! Some command-line agents hang or change behavior without a terminal.
//! This crate starts such a program on the slave side of a freshly
//! allocated pseudo-terminal, streams its output back, forwards input and
//! termination signals, and reports the child's exit code as its own.

pub mod cli;
pub mod config;
pub mod error;
pub mod headless;
pub mod invocation;
pub mod observability;
pub mod pty;
pub mod signals;
