//! Window size for the PTY

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd};

/// Window size in characters and pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    /// Number of rows (characters)
    pub rows: u16,
    /// Number of columns (characters)
    pub cols: u16,
    /// Width in pixels (optional, can be 0)
    pub pixel_width: u16,
    /// Height in pixels (optional, can be 0)
    pub pixel_height: u16,
}

impl WindowSize {
    /// Create a new window size
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Convert to libc winsize structure
    pub fn to_winsize(&self) -> libc::winsize {
        libc::winsize {
            ws_row: self.rows,
            ws_col: self.cols,
            ws_xpixel: self.pixel_width,
            ws_ypixel: self.pixel_height,
        }
    }

    /// Size of the terminal behind `fd`
    ///
    /// Returns `None` if `fd` is not a terminal or reports zero rows or columns.
    pub fn from_fd(fd: BorrowedFd<'_>) -> Option<Self> {
        let mut ws = Self::default().to_winsize();

        // SAFETY: TIOCGWINSZ only writes into `ws`
        let result = unsafe { libc::ioctl(fd.as_raw_fd(), libc::TIOCGWINSZ as _, &mut ws) };

        if result < 0 || ws.ws_col == 0 || ws.ws_row == 0 {
            None
        } else {
            Some(Self::from(ws))
        }
    }

    /// Size of the invoking terminal
    ///
    /// Checks stdout, stderr and stdin in that order and falls back to the
    /// default 80x24 when none of them is a terminal.
    pub fn detect() -> Self {
        let (stdout, stderr, stdin) = (io::stdout(), io::stderr(), io::stdin());
        // Bound to a local so the borrowed descriptors are released first
        let size = [stdout.as_fd(), stderr.as_fd(), stdin.as_fd()]
            .into_iter()
            .find_map(Self::from_fd)
            .unwrap_or_default();
        size
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl From<libc::winsize> for WindowSize {
    fn from(ws: libc::winsize) -> Self {
        Self {
            rows: ws.ws_row,
            cols: ws.ws_col,
            pixel_width: ws.ws_xpixel,
            pixel_height: ws.ws_ypixel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_default() {
        let size = WindowSize::default();
        assert_eq!(size.cols, 80);
        assert_eq!(size.rows, 24);
    }

    #[test]
    fn test_to_winsize() {
        let ws = WindowSize::new(132, 43).to_winsize();
        assert_eq!(ws.ws_col, 132);
        assert_eq!(ws.ws_row, 43);
        assert_eq!(WindowSize::from(ws), WindowSize::new(132, 43));
    }

    #[test]
    fn test_from_fd_regular_file() {
        let file = tempfile::tempfile().expect("Failed to create temp file");
        assert_eq!(WindowSize::from_fd(file.as_fd()), None);
    }

    #[test]
    fn test_detect_never_zero() {
        let size = WindowSize::detect();
        assert!(size.cols > 0);
        assert!(size.rows > 0);
    }
}
