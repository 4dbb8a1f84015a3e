//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler. Handlers
//! return the process exit code: for launching commands that is the child's.

pub mod completions;
pub mod exec;
pub mod headless;
pub mod version;

use serde_json::json;
use tracing::info;

use crate::cli::args::{Cli, Commands, OutputFormat, SessionArgs};
use crate::error::{ExitCode, PtyrunError};
use crate::invocation::Invocation;
use crate::pty::{self, RelayIo};

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<i32, PtyrunError> {
    match cli.command {
        Commands::Headless(args) => headless::run(&args).await,
        Commands::Exec(args) => exec::run(&args).await,
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version(args) => {
            version::run(&args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Runs `invocation` with the given session options, or prints it for
/// `--dry-run`.
async fn launch(invocation: Invocation, session: &SessionArgs) -> Result<i32, PtyrunError> {
    if session.dry_run {
        print_invocation(&invocation, session.format)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = session.relay_config();
    info!(command = %invocation.describe(), "launching under pseudo-terminal");

    let outcome = pty::run(&invocation, &config, RelayIo::stdio(config.forward_stdin)).await?;
    info!(?outcome, "child finished");

    Ok(outcome.exit_code())
}

fn print_invocation(invocation: &Invocation, format: OutputFormat) -> Result<(), PtyrunError> {
    match format {
        OutputFormat::Human => println!("{}", invocation.describe()),
        OutputFormat::Json => {
            let env: serde_json::Map<String, serde_json::Value> = invocation
                .env()
                .iter()
                .map(|(k, v)| (k.clone(), json!(v)))
                .collect();
            let value = json!({
                "program": invocation.program().to_string_lossy(),
                "args": invocation.arguments(),
                "cwd": invocation.working_dir().map(|d| d.to_string_lossy()),
                "env": env,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}
