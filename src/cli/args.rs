//! CLI argument definitions
//!
//! All Clap derive structs for `ptyrun` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::{DEFAULT_COLS, DEFAULT_ROWS, RelayConfig, TerminalSize};
use crate::headless::HeadlessOptions;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Run interactive agent CLIs headlessly under a pseudo-terminal.
#[derive(Parser, Debug)]
#[command(name = "ptyrun", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all wrapper logging.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "PTYRUN_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "PTYRUN_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the agent CLI headlessly with the common pass-through flags.
    #[command(visible_alias = "run")]
    Headless(HeadlessArgs),

    /// Run any program under a pseudo-terminal, forwarding arguments verbatim.
    Exec(ExecArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Session Options
// ============================================================================

/// Options shared by every command that launches a child.
#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Working directory for the child (defaults to the current directory).
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable for the child, as KEY=VALUE (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Pseudo-terminal rows.
    #[arg(long, default_value_t = DEFAULT_ROWS, env = "PTYRUN_ROWS")]
    pub rows: u16,

    /// Pseudo-terminal columns.
    #[arg(long, default_value_t = DEFAULT_COLS, env = "PTYRUN_COLS")]
    pub cols: u16,

    /// Do not forward stdin to the child.
    #[arg(long)]
    pub no_stdin: bool,

    /// How long to keep reading output after the child exits (e.g. "2s", "500ms").
    #[arg(
        long,
        default_value = "2s",
        value_parser = humantime::parse_duration,
        env = "PTYRUN_DRAIN_TIMEOUT"
    )]
    pub drain_timeout: Duration,

    /// Grace period after forwarding a signal before the child is killed.
    #[arg(
        long,
        default_value = "5s",
        value_parser = humantime::parse_duration,
        env = "PTYRUN_KILL_TIMEOUT"
    )]
    pub kill_timeout: Duration,

    /// Print the command that would run instead of running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for --dry-run.
    #[arg(long, default_value = "human", requires = "dry_run")]
    pub format: OutputFormat,
}

impl SessionArgs {
    /// Relay configuration described by these options.
    #[must_use]
    pub const fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            size: TerminalSize {
                rows: self.rows,
                cols: self.cols,
            },
            forward_stdin: !self.no_stdin,
            drain_timeout: self.drain_timeout,
            kill_timeout: self.kill_timeout,
        }
    }
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

// ============================================================================
// Headless Command
// ============================================================================

/// Arguments for `headless`.
///
/// Each flag is forwarded to the agent binary as-is; values are never
/// checked here.
#[derive(Args, Debug)]
pub struct HeadlessArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Path or name of the agent binary.
    #[arg(long, alias = "claude-bin", default_value = "claude", env = "CLAUDE_CODE_BIN")]
    pub agent_bin: PathBuf,

    /// Headless prompt.
    #[arg(short = 'p', long = "prompt", allow_hyphen_values = true)]
    pub prompt: Option<String>,

    /// Permission mode, e.g. "plan" for read-only analysis.
    #[arg(long)]
    pub permission_mode: Option<String>,

    /// Allowed tools, e.g. "Bash(git diff:*),Read".
    #[arg(long = "allowedTools", visible_alias = "allowed-tools")]
    pub allowed_tools: Option<String>,

    /// Output format of the agent, e.g. text, json or stream-json.
    #[arg(long)]
    pub output_format: Option<String>,

    /// JSON schema for structured output.
    #[arg(long)]
    pub json_schema: Option<String>,

    /// Text appended to the default system prompt.
    #[arg(long, allow_hyphen_values = true)]
    pub append_system_prompt: Option<String>,

    /// Replacement system prompt.
    #[arg(long, allow_hyphen_values = true)]
    pub system_prompt: Option<String>,

    /// Continue the most recent session.
    #[arg(long = "continue")]
    pub continue_latest: bool,

    /// Resume a specific session id.
    #[arg(long)]
    pub resume: Option<String>,

    /// Extra arguments for the agent, after `--`.
    #[arg(last = true)]
    pub extra: Vec<String>,
}

impl HeadlessArgs {
    /// The pass-through options carried by these arguments.
    #[must_use]
    pub fn options(&self) -> HeadlessOptions {
        HeadlessOptions {
            permission_mode: self.permission_mode.clone(),
            prompt: self.prompt.clone(),
            allowed_tools: self.allowed_tools.clone(),
            output_format: self.output_format.clone(),
            json_schema: self.json_schema.clone(),
            append_system_prompt: self.append_system_prompt.clone(),
            system_prompt: self.system_prompt.clone(),
            continue_latest: self.continue_latest,
            resume: self.resume.clone(),
            extra: self.extra.clone(),
        }
    }
}

// ============================================================================
// Exec Command
// ============================================================================

/// Arguments for `exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Program and its arguments, after `--`.
    #[arg(last = true, required = true, value_name = "PROGRAM [ARGS]")]
    pub command: Vec<String>,
}

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
