//! Child termination status
//!
//! Maps the raw status reported by `waitpid` onto the exit code the wrapper
//! reports: a normal exit passes its code through, a signal `S` becomes
//! `128 + S` as POSIX shells report it. Signals are kept as raw numbers so
//! that real-time signals map the same way as the named ones.

use std::fmt;

use nix::sys::signal::Signal;

/// Offset added to the signal number of a child killed by a signal
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// How the child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The child called `exit` with this code
    Exited(i32),
    /// The child was killed by the signal with this number
    Signaled(i32),
}

impl Termination {
    /// Decode a raw `waitpid` status
    ///
    /// Returns `None` for stop and continue notifications.
    pub fn from_raw_status(status: libc::c_int) -> Option<Self> {
        if libc::WIFEXITED(status) {
            Some(Self::Exited(libc::WEXITSTATUS(status)))
        } else if libc::WIFSIGNALED(status) {
            Some(Self::Signaled(libc::WTERMSIG(status)))
        } else {
            None
        }
    }

    /// Exit code for the wrapper process
    pub fn exit_code(&self) -> u8 {
        match *self {
            Self::Exited(code) => (code & 0xff) as u8,
            Self::Signaled(signal) => (SIGNAL_EXIT_BASE + signal).clamp(0, 255) as u8,
        }
    }
}

impl From<Signal> for Termination {
    fn from(signal: Signal) -> Self {
        Self::Signaled(signal as i32)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exited(code) => write!(f, "exited with code {}", code),
            Self::Signaled(signal) => match Signal::try_from(signal) {
                Ok(named) => write!(f, "killed by {}", named.as_str()),
                Err(_) => write!(f, "killed by signal {}", signal),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Raw status as the kernel encodes a normal exit
    fn exited(code: i32) -> libc::c_int {
        (code & 0xff) << 8
    }

    /// Raw status as the kernel encodes a signal death
    fn signaled(signal: i32, core_dumped: bool) -> libc::c_int {
        signal | if core_dumped { 0x80 } else { 0 }
    }

    #[test]
    fn test_signal_exit_codes() {
        assert_eq!(Termination::from(Signal::SIGHUP).exit_code(), 129);
        assert_eq!(Termination::from(Signal::SIGINT).exit_code(), 130);
        assert_eq!(Termination::from(Signal::SIGKILL).exit_code(), 137);
        assert_eq!(Termination::from(Signal::SIGTERM).exit_code(), 143);

        for signal in Signal::iterator() {
            let code = Termination::from(signal).exit_code();
            assert_eq!(i32::from(code), SIGNAL_EXIT_BASE + signal as i32);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_realtime_signal_exit_codes() {
        for signal in libc::SIGRTMIN()..=libc::SIGRTMAX() {
            let termination = Termination::from_raw_status(signaled(signal, false));
            assert_eq!(termination, Some(Termination::Signaled(signal)));
            assert_eq!(i32::from(Termination::Signaled(signal).exit_code()), 128 + signal);
        }
        assert_eq!(Termination::Signaled(40).exit_code(), 168);
    }

    #[test]
    fn test_from_raw_status() {
        assert_eq!(Termination::from_raw_status(exited(7)), Some(Termination::Exited(7)));
        assert_eq!(
            Termination::from_raw_status(signaled(libc::SIGKILL, true)),
            Some(Termination::Signaled(libc::SIGKILL))
        );
        // WIFSTOPPED: low byte 0x7f, stop signal in the next byte
        assert_eq!(Termination::from_raw_status((libc::SIGSTOP << 8) | 0x7f), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Termination::Exited(7).to_string(), "exited with code 7");
        assert_eq!(
            Termination::from(Signal::SIGTERM).to_string(),
            "killed by SIGTERM"
        );
        assert_eq!(Termination::Signaled(40).to_string(), "killed by signal 40");
    }

    proptest! {
        #[test]
        fn exit_code_passes_through(code in 0i32..=255) {
            prop_assert_eq!(
                Termination::from_raw_status(exited(code)),
                Some(Termination::Exited(code))
            );
            prop_assert_eq!(i32::from(Termination::Exited(code).exit_code()), code);
        }

        #[test]
        fn exit_code_keeps_low_byte(code in any::<i32>()) {
            prop_assert_eq!(Termination::Exited(code).exit_code(), (code & 0xff) as u8);
        }
    }
}
