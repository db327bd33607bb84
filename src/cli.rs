//! Command line interface
//!
//! Everything after the program name is the command to run, verbatim. There
//! are no options of our own, so flag-like arguments and a leading `--` all
//! belong to the command. clap only defines the usage shown when the
//! command is missing.

use std::ffi::OsString;

use clap::Parser;

use crate::pty::WindowSize;
use crate::runner::RunConfig;

/// Run a command inside a pseudoterminal and relay its output
#[derive(Parser, Debug, Clone)]
#[command(name = "run-pty")]
#[command(about = "Run a command inside a pseudoterminal and relay its output", long_about = None)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct CliArgs {
    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl CliArgs {
    /// Parse the full argument list, including the program name
    ///
    /// Fails with a usage error only when no command follows the program name.
    pub fn try_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

        // clap would consume a leading `--` as its end-of-options marker
        match args.get(1..) {
            Some(command) if !command.is_empty() => Ok(Self {
                command: command.to_vec(),
            }),
            _ => Self::try_parse_from(args),
        }
    }

    /// Build the run configuration, sizing the PTY like the invoking terminal
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            command: self.command,
            window_size: WindowSize::detect(),
        }
    }
}
