//! `exec`: run an arbitrary program under a pseudo-terminal.

use crate::cli::args::ExecArgs;
use crate::error::PtyrunError;
use crate::invocation::Invocation;

/// Run the program named after `--` with the remaining arguments verbatim.
///
/// # Errors
///
/// Returns an error if the program cannot be launched or the relay fails.
pub async fn run(args: &ExecArgs) -> Result<i32, PtyrunError> {
    let (program, rest) = args
        .command
        .split_first()
        .map_or(("", &[][..]), |(p, rest)| (p.as_str(), rest));

    let invocation = Invocation::new(program)
        .args(rest.iter().cloned())
        .cwd(args.session.cwd.clone())
        .envs(args.session.env.iter().cloned());

    super::launch(invocation, &args.session).await
}
