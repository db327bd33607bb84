//! PTY (pseudoterminal) handling
//!
//! This module allocates the master/slave pair, forks the child process onto
//! the slave and exposes the master side for reading.

mod size;
mod unix;

pub use size::WindowSize;
pub use unix::{Child, Pty, EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND};

/// Error type for PTY operations
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("No command given")]
    EmptyCommand,

    #[error("Invalid argument {0:?}: contains a NUL byte")]
    InvalidArgument(String),

    #[error("Failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("Failed to grant PTY access: {0}")]
    GrantPty(#[source] nix::Error),

    #[error("Failed to unlock PTY: {0}")]
    UnlockPty(#[source] nix::Error),

    #[error("Failed to get PTY slave name: {0}")]
    PtsName(#[source] nix::Error),

    #[error("Failed to open PTY slave: {0}")]
    OpenSlave(#[source] nix::Error),

    #[error("Failed to set close-on-exec: {0}")]
    SetCloexec(#[source] nix::Error),

    #[error("Failed to configure PTY slave: {0}")]
    Termios(#[source] nix::Error),

    #[error("Failed to set window size: {0}")]
    SetWinsize(#[source] nix::Error),

    #[error("Failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("Failed to signal child: {0}")]
    Signal(#[source] nix::Error),

    #[error("Failed to wait for child: {0}")]
    Wait(#[source] nix::Error),
}

/// Result type for PTY operations
pub type PtyResult<T> = Result<T, PtyError>;
