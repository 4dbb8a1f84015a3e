//! `ptyrun`: run interactive agent CLIs headlessly under a pseudo-terminal

use clap::Parser;

use ptyrun::cli::args::Cli;
use ptyrun::cli::commands;
use ptyrun::observability::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    // Signals are handled per run: they are forwarded to the child rather
    // than terminating the wrapper outright.
    match commands::dispatch(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
