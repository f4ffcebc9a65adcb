//! Deadline-bounded reads until a marker shows up

use crate::buffer::ReadBuffer;
use crate::pattern::Marker;
use bytes::Bytes;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::time::Instant;

/// Size of a single socket read
pub const READ_CHUNK_SIZE: usize = 4096;

/// Why a marker read stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Marker `index` (into the slice passed in) was found; `end` is the
    /// offset just past it.
    Matched {
        /// Index of the marker that matched
        index: usize,
        /// Byte offset just past the marker
        end: usize,
    },
    /// The peer closed the stream.
    Eof,
    /// The deadline elapsed first.
    TimedOut,
}

/// Bytes accumulated by one marker read and the reason it stopped.
///
/// `data` holds every byte received, including anything that arrived after
/// the marker in the same chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// All bytes read, in order.
    pub data: Bytes,
    /// Why reading stopped.
    pub status: ReadStatus,
}

impl ReadOutcome {
    /// Whether a marker was seen.
    pub fn matched(&self) -> bool {
        matches!(self.status, ReadStatus::Matched { .. })
    }

    /// Whether `needle` occurs anywhere in the received bytes.
    pub fn contains(&self, needle: &[u8]) -> bool {
        !needle.is_empty() && self.data.windows(needle.len()).any(|w| w == needle)
    }

    /// Received bytes decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Bytes received after the marker, if one matched.
    pub fn trailing(&self) -> &[u8] {
        match self.status {
            ReadStatus::Matched { end, .. } => &self.data[end..],
            _ => &[],
        }
    }
}

/// Read from `stream` until `marker` appears, the stream ends, or `timeout`
/// elapses.
///
/// Only hard I/O failures are errors. A timeout or EOF is a normal outcome
/// carrying whatever was received.
///
/// # Examples
///
/// ```
/// use synoshell::{read_until, Marker, ReadStatus};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> std::io::Result<()> {
/// let mut stream = &b"DiskStation login: "[..];
/// let outcome = read_until(&mut stream, &Marker::login(), Duration::from_secs(1)).await?;
/// assert!(outcome.matched());
///
/// let mut stream = &b"no prompt here"[..];
/// let outcome = read_until(&mut stream, &Marker::login(), Duration::from_secs(1)).await?;
/// assert_eq!(outcome.status, ReadStatus::Eof);
/// assert_eq!(&outcome.data[..], b"no prompt here");
/// # Ok(())
/// # }
/// ```
pub async fn read_until<R>(
    stream: &mut R,
    marker: &Marker,
    timeout: Duration,
) -> io::Result<ReadOutcome>
where
    R: AsyncRead + Unpin + ?Sized,
{
    read_until_any(stream, std::slice::from_ref(marker), timeout).await
}

/// Like [`read_until`], but stops at whichever of `markers` occurs first in
/// the stream. Ties at the same offset go to the marker listed first.
pub async fn read_until_any<R>(
    stream: &mut R,
    markers: &[Marker],
    timeout: Duration,
) -> io::Result<ReadOutcome>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let overlap = markers.iter().map(Marker::len).max().unwrap_or(1) - 1;

    let mut buffer = ReadBuffer::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        if let Some((index, end)) = earliest_match(&buffer, markers, overlap) {
            return Ok(ReadOutcome {
                data: buffer.into_bytes(),
                status: ReadStatus::Matched { index, end },
            });
        }
        buffer.mark_scanned();

        let read = match tokio::time::timeout_at(deadline, stream.read(&mut chunk)).await {
            Ok(read) => read,
            Err(_) => {
                tracing::trace!(received = buffer.len(), "marker read timed out");
                return Ok(ReadOutcome {
                    data: buffer.into_bytes(),
                    status: ReadStatus::TimedOut,
                });
            }
        };

        match read {
            Ok(0) => {
                return Ok(ReadOutcome {
                    data: buffer.into_bytes(),
                    status: ReadStatus::Eof,
                });
            }
            Ok(n) => buffer.append(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Earliest marker occurrence in the unsearched part of `buffer`.
fn earliest_match(
    buffer: &ReadBuffer,
    markers: &[Marker],
    overlap: usize,
) -> Option<(usize, usize)> {
    let (offset, window) = buffer.search_window(overlap);

    markers
        .iter()
        .enumerate()
        .filter_map(|(index, marker)| marker.find(window).map(|m| (m.start, index, m.end)))
        .min_by_key(|&(start, index, _)| (start, index))
        .map(|(_, index, end)| (index, offset + end))
}
