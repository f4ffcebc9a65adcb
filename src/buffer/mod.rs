//! Accumulation of shell output

mod filter;

pub use filter::{clean_lines, strip_ansi, strip_telnet_commands};

use bytes::{Bytes, BytesMut};
use std::borrow::Cow;

/// Initial capacity, matching one socket read.
const DEFAULT_CAPACITY: usize = 4096;

/// Growable byte accumulator that remembers how much of it has been searched.
///
/// Nothing is ever discarded: the marker reader must hand back exactly the
/// bytes it received. The scan offset lets repeated searches look only at
/// new data plus enough overlap to catch a marker split across two reads.
#[derive(Debug, Default)]
pub struct ReadBuffer {
    buffer: BytesMut,
    scanned: usize,
}

impl ReadBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(DEFAULT_CAPACITY),
            scanned: 0,
        }
    }

    /// Append data to the buffer
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Get the buffer as bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer as text, replacing invalid UTF-8
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Get the current buffer length
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Portion that still needs searching, as `(offset, bytes)`.
    ///
    /// `overlap` already-scanned bytes are included so that a marker of
    /// length `overlap + 1` straddling the previous boundary is still found.
    pub fn search_window(&self, overlap: usize) -> (usize, &[u8]) {
        let start = self.scanned.saturating_sub(overlap);
        (start, &self.buffer[start..])
    }

    /// Record that everything currently buffered has been searched
    pub fn mark_scanned(&mut self) {
        self.scanned = self.buffer.len();
    }

    /// Hand the accumulated bytes over
    pub fn into_bytes(self) -> Bytes {
        self.buffer.freeze()
    }
}
