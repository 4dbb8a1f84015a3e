//! `headless`: run the agent CLI non-interactively.

use crate::cli::args::HeadlessArgs;
use crate::error::{LaunchError, PtyrunError};
use crate::invocation::Invocation;

/// Build the agent command line from the pass-through flags and run it.
///
/// # Errors
///
/// Returns an error if the agent cannot be launched or the relay fails.
pub async fn run(args: &HeadlessArgs) -> Result<i32, PtyrunError> {
    let invocation = Invocation::new(&args.agent_bin)
        .args(args.options().to_args())
        .cwd(args.session.cwd.clone())
        .envs(args.session.env.iter().cloned());

    super::launch(invocation, &args.session)
        .await
        .inspect_err(|e| {
            if matches!(e, PtyrunError::Launch(LaunchError::NotFound { .. })) {
                eprintln!("hint: pass --agent-bin or set CLAUDE_CODE_BIN=/path/to/claude");
            }
        })
}
