//! One run of the wrapped command
//!
//! Spawns the child on a fresh PTY, relays its terminal output, then reaps
//! it. Only setup failures are returned as errors; anything that goes wrong
//! while relaying is absorbed so the child's own status always wins.

use std::ffi::OsString;
use std::io::{self, Write};

use tracing::{debug, info};

use crate::pty::{Child, PtyResult, WindowSize};
use crate::relay::relay;
use crate::status::Termination;

/// What to run and how to size its terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Program followed by its arguments
    pub command: Vec<OsString>,
    /// Initial size of the child's terminal
    pub window_size: WindowSize,
}

impl RunConfig {
    /// Configuration with the default window size
    pub fn new<I, S>(command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            command: command.into_iter().map(Into::into).collect(),
            window_size: WindowSize::default(),
        }
    }
}

/// Run the command, relaying its output to stdout
pub fn run(config: &RunConfig) -> PtyResult<Termination> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(config, &mut out)
}

/// Run the command, relaying its output to `out`
pub fn run_with_output<W: Write + ?Sized>(
    config: &RunConfig,
    out: &mut W,
) -> PtyResult<Termination> {
    let mut child = Child::spawn(config.command.as_slice(), config.window_size)?;
    info!(
        pid = child.pid().as_raw(),
        tty = child.tty_path(),
        cols = config.window_size.cols,
        rows = config.window_size.rows,
        "Spawned {:?}",
        config.command
    );

    let summary = relay(&mut child, out);
    debug!("Terminal closed after {} bytes", summary.bytes_read);

    let termination = child.wait()?;
    info!("Child {}", termination);

    Ok(termination)
}
