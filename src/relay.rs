//! Streaming copy from the PTY master to an output sink
//!
//! Every chunk is written unmodified and flushed as soon as it is read, so
//! the sink sees the child's output in real time. Read errors end the relay
//! without being reported to the caller. Write errors stop forwarding, but
//! the reader is still drained to end-of-stream so that the child never
//! blocks on a full terminal buffer.

use std::io::{self, Read, Write};

use tracing::{debug, warn};

/// Size of a single read from the master
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Why the relay stopped reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// The reader returned end-of-file
    Eof,
    /// The terminal hung up (`EIO` once every slave descriptor is closed)
    Hangup,
    /// Reading failed for another reason
    ReadError(io::ErrorKind),
}

/// Counters describing a finished relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    /// Bytes read from the terminal
    pub bytes_read: u64,
    /// Bytes delivered to the sink
    pub bytes_written: u64,
    /// Number of successful reads
    pub chunks: u64,
    /// How reading ended
    pub end: RelayEnd,
}

/// Copy `reader` into `writer` until end-of-stream or a read error
pub fn relay<R, W>(reader: &mut R, writer: &mut W) -> RelaySummary
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut bytes_read = 0u64;
    let mut bytes_written = 0u64;
    let mut chunks = 0u64;
    let mut forwarding = true;

    let end = loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break RelayEnd::Eof,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.raw_os_error() == Some(libc::EIO) => break RelayEnd::Hangup,
            Err(e) => {
                debug!("Discarding terminal read error: {}", e);
                break RelayEnd::ReadError(e.kind());
            },
        };

        bytes_read += n as u64;
        chunks += 1;

        if !forwarding {
            continue;
        }

        match writer.write_all(&buf[..n]).and_then(|()| writer.flush()) {
            Ok(()) => bytes_written += n as u64,
            Err(e) => {
                warn!("Failed to write output, discarding the rest: {}", e);
                forwarding = false;
            },
        }
    };

    debug!(bytes_read, bytes_written, chunks, "Relay finished: {:?}", end);

    RelaySummary {
        bytes_read,
        bytes_written,
        chunks,
        end,
    }
}
