//! Unix PTY implementation
//!
//! Opens the master/slave pair and forks the child process onto the slave
//! using POSIX APIs.

use std::ffi::{CString, OsStr};
use std::io::{self, Read};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::os::unix::ffi::OsStrExt;

use nix::errno::Errno;
use nix::fcntl::{fcntl, open, FcntlArg, FdFlag, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::pty::{grantpt, posix_openpt, unlockpt, PtyMaster};
use nix::sys::signal::{kill, signal, SigHandler, Signal};
use nix::sys::stat::Mode;
use nix::sys::termios::{self, OutputFlags, SetArg};
use nix::sys::wait::{waitpid, WaitPidFlag};
use nix::unistd::{close, dup2, fork, setsid, ForkResult, Pid};

use super::{PtyError, PtyResult, WindowSize};
use crate::status::Termination;

/// Exit status of a child whose program could not be found
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit status of a child whose program was found but could not be executed
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// A pseudoterminal master/slave pair
pub struct Pty {
    /// The PTY master file descriptor
    master: PtyMaster,
    /// The PTY slave, handed to the child at fork
    slave: OwnedFd,
    /// Path to the slave PTY
    slave_path: String,
}

impl Pty {
    /// Open a new PTY pair with the given window size
    ///
    /// Both descriptors are close-on-exec so that no other program inherits
    /// them, and `ONLCR` is cleared on the slave so line endings pass through
    /// as the child wrote them.
    pub fn open(size: WindowSize) -> PtyResult<Self> {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;
        fcntl(master.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))
            .map_err(PtyError::SetCloexec)?;

        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        let slave_path = slave_name(&master)?;
        let slave_fd = open(
            slave_path.as_str(),
            OFlag::O_RDWR | OFlag::O_NOCTTY | OFlag::O_CLOEXEC,
            Mode::empty(),
        )
        .map_err(PtyError::OpenSlave)?;
        // SAFETY: `open` just returned this descriptor and nothing else owns it
        let slave = unsafe { OwnedFd::from_raw_fd(slave_fd) };

        let pty = Self {
            master,
            slave,
            slave_path,
        };
        pty.set_window_size(size)?;
        configure_slave(pty.slave.as_fd())?;

        Ok(pty)
    }

    /// Path to the slave PTY
    pub fn slave_path(&self) -> &str {
        &self.slave_path
    }

    /// Set the window size seen by the slave
    pub fn set_window_size(&self, size: WindowSize) -> PtyResult<()> {
        let ws = size.to_winsize();

        // SAFETY: TIOCSWINSZ only reads from `ws`
        let result = unsafe { libc::ioctl(self.master.as_raw_fd(), libc::TIOCSWINSZ as _, &ws) };

        if result < 0 {
            Err(PtyError::SetWinsize(Errno::last()))
        } else {
            Ok(())
        }
    }

    /// Current window size of the PTY
    pub fn window_size(&self) -> Option<WindowSize> {
        WindowSize::from_fd(self.master.as_fd())
    }
}

impl AsFd for Pty {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }
}

/// A child process running on the slave side of a PTY
pub struct Child {
    /// The PTY master; the parent's only remaining PTY descriptor
    master: PtyMaster,
    /// Path to the child's controlling terminal
    tty_path: String,
    /// Child process ID
    pid: Pid,
    /// How the child ended, once it has been waited for
    termination: Option<Termination>,
    /// Set once `pid` no longer refers to our child
    reaped: bool,
}

impl Child {
    /// Spawn `argv[0]` with arguments `argv[1..]` on a new PTY
    ///
    /// The program is looked up in `PATH`. If it cannot be executed the
    /// child exits with [`EXIT_NOT_FOUND`] or [`EXIT_NOT_EXECUTABLE`].
    pub fn spawn<S: AsRef<OsStr>>(argv: &[S], size: WindowSize) -> PtyResult<Self> {
        let argv = to_cstrings(argv)?;
        let argv_ptrs = argv_pointers(&argv);
        let Pty {
            master,
            slave,
            slave_path,
        } = Pty::open(size)?;

        // SAFETY: the child only makes async-signal-safe calls before exec;
        // the exec argument array is built above, before the fork
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                drop(master);
                exec_on_slave(slave, &argv_ptrs)
            },
            ForkResult::Parent { child } => {
                // From here on the child holds the only slave references, so
                // the master reports end-of-stream once they are all closed
                drop(slave);

                Ok(Self {
                    master,
                    tty_path: slave_path,
                    pid: child,
                    termination: None,
                    reaped: false,
                })
            },
        }
    }

    /// Get the child process ID
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Path of the child's controlling terminal
    pub fn tty_path(&self) -> &str {
        &self.tty_path
    }

    /// Block until the child terminates
    ///
    /// Calling this again after the child was reaped returns the same result.
    pub fn wait(&mut self) -> PtyResult<Termination> {
        if let Some(termination) = self.termination {
            return Ok(termination);
        }

        // Raw waitpid so that every signal number survives decoding,
        // including real-time signals that `Signal` cannot represent
        loop {
            let mut status: libc::c_int = 0;
            // SAFETY: waitpid only writes the status word
            let result = unsafe { libc::waitpid(self.pid.as_raw(), &mut status, 0) };

            if result < 0 {
                match Errno::last() {
                    Errno::EINTR => continue,
                    e => {
                        if e == Errno::ECHILD {
                            self.reaped = true;
                        }
                        return Err(PtyError::Wait(e));
                    },
                }
            }

            if let Some(termination) = Termination::from_raw_status(status) {
                self.reaped = true;
                self.termination = Some(termination);
                return Ok(termination);
            }
        }
    }

    /// Send a signal to the child process
    pub fn signal(&self, signal: Signal) -> PtyResult<()> {
        kill(self.pid, signal).map_err(PtyError::Signal)
    }
}

impl Read for Child {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.master.read(buf)
    }
}

impl AsFd for Child {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }
}

impl Drop for Child {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.signal(Signal::SIGHUP);
            let _ = waitpid(self.pid, Some(WaitPidFlag::WNOHANG));
        }
    }
}

/// Replace the forked child with the requested program
///
/// Runs between `fork` and `exec`, so it must not allocate, lock or log.
fn exec_on_slave(slave: OwnedFd, argv: &[*const libc::c_char]) -> ! {
    if setsid().is_err() {
        exit_child(1);
    }

    let slave_fd: RawFd = slave.into_raw_fd();

    // SAFETY: TIOCSCTTY takes an integer argument, no pointers
    if unsafe { libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0) } < 0 {
        exit_child(1);
    }

    for target in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO] {
        if dup2(slave_fd, target).is_err() {
            exit_child(1);
        }
    }
    if slave_fd > STDERR_FILENO {
        let _ = close(slave_fd);
    }

    // The Rust runtime ignores SIGPIPE and ignored signals survive exec
    // SAFETY: installs the default disposition, no handler code runs
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    // SAFETY: `argv` is null-terminated and points into CStrings owned by
    // the caller, which stay alive because exec either replaces the process
    // or returns straight into `exit_child`
    unsafe { libc::execvp(argv[0], argv.as_ptr()) };
    exit_child(exec_failure_status(Errno::last()))
}

/// Terminate the forked child without running any cleanup
fn exit_child(status: libc::c_int) -> ! {
    // SAFETY: _exit does not return and runs no handlers or destructors
    unsafe { libc::_exit(status) }
}

/// Null-terminated pointer array for `execvp`
fn argv_pointers(argv: &[CString]) -> Vec<*const libc::c_char> {
    argv.iter()
        .map(|arg| arg.as_ptr())
        .chain(std::iter::once(std::ptr::null()))
        .collect()
}

/// Exit status for a child whose `execvp` failed with `err`
fn exec_failure_status(err: Errno) -> i32 {
    match err {
        Errno::ENOENT | Errno::ENOTDIR => EXIT_NOT_FOUND,
        _ => EXIT_NOT_EXECUTABLE,
    }
}

fn to_cstrings<S: AsRef<OsStr>>(argv: &[S]) -> PtyResult<Vec<CString>> {
    if argv.is_empty() {
        return Err(PtyError::EmptyCommand);
    }

    argv.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            CString::new(arg.as_bytes())
                .map_err(|_| PtyError::InvalidArgument(arg.to_string_lossy().into_owned()))
        })
        .collect()
}

#[cfg(target_os = "linux")]
fn slave_name(master: &PtyMaster) -> PtyResult<String> {
    nix::pty::ptsname_r(master).map_err(PtyError::PtsName)
}

#[cfg(not(target_os = "linux"))]
fn slave_name(master: &PtyMaster) -> PtyResult<String> {
    // SAFETY: ptsname returns a static buffer that is copied out before any
    // other PTY is opened by this process
    unsafe { nix::pty::ptsname(master) }.map_err(PtyError::PtsName)
}

/// Leave output processing on but stop translating `\n` into `\r\n`
fn configure_slave(fd: BorrowedFd<'_>) -> PtyResult<()> {
    let mut termios = termios::tcgetattr(fd).map_err(PtyError::Termios)?;
    termios.output_flags.insert(OutputFlags::OPOST);
    termios.output_flags.remove(OutputFlags::ONLCR);
    termios::tcsetattr(fd, SetArg::TCSANOW, &termios).map_err(PtyError::Termios)
}
