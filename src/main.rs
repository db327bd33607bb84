//! run-pty
//!
//! Runs a command inside a pseudoterminal and exits with its status.

use std::env;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use run_pty::cli::CliArgs;
use run_pty::runner;

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries only the child's output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();

    let config = match CliArgs::try_from_args(env::args_os()) {
        Ok(args) => args.into_config(),
        Err(e) => e.exit(),
    };

    match runner::run(&config) {
        Ok(termination) => ExitCode::from(termination.exit_code()),
        Err(e) => {
            tracing::error!("Fatal error: {}", e);
            ExitCode::FAILURE
        },
    }
}
