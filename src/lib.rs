//! run-pty
//!
//! Runs a command with a pseudoterminal as its controlling terminal, relays
//! everything it writes to that terminal onto stdout and reports the
//! command's exit status. Tools that only colour their output or draw
//! progress bars when attached to a terminal behave as if run interactively.
//!
//! - `pty`: PTY allocation and child spawning
//! - `relay`: streaming copy of the terminal output
//! - `status`: translation of the child's wait status into an exit code
//! - `runner`: one complete run
//! - `cli`: command line parsing

#[cfg(not(unix))]
compile_error!("run-pty requires a Unix platform");

pub mod cli;
pub mod pty;
pub mod relay;
pub mod runner;
pub mod status;
