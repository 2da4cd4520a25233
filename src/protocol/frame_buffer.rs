//! Frame parsing and the receive buffer.
//!
//! [`parse_one`] is the pure parser: it locates the first complete frame in a
//! byte slice, skipping leading garbage and resynchronizing past corrupted
//! frames. [`FrameBuffer`] wraps a `BytesMut` and applies it repeatedly as
//! socket data arrives.
//!
//! # Example
//!
//! ```
//! use arcam_client::protocol::{encode_response, FrameBuffer};
//!
//! let mut buffer = FrameBuffer::new();
//! let bytes = encode_response(0x01, 0x0D, 0x00, &[0x32]);
//!
//! // Data arrives in chunks from the socket
//! assert!(buffer.push(&bytes[..3]).is_empty());
//! let frames = buffer.push(&bytes[3..]);
//!
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].value(), Some(0x32));
//! ```

use bytes::{Buf, Bytes, BytesMut};

use super::wire_format::{END, MIN_FRAME_SIZE, START};
use super::Frame;

/// Receive buffer ceiling; anything larger without a frame is discarded.
pub const MAX_BUFFER_SIZE: usize = 1024;

/// Parse the first complete frame in `buf`.
///
/// Returns the frame and the number of bytes to drop from the front of the
/// buffer, including any garbage skipped before the frame. Returns `None`
/// when no complete frame is available yet; nothing should be consumed then.
///
/// A start byte whose frame does not close with the end marker is treated as
/// noise and scanning resumes at the following byte.
pub fn parse_one(buf: &[u8]) -> Option<(Frame, usize)> {
    let mut offset = 0;

    loop {
        let start = offset + buf[offset..].iter().position(|&b| b == START)?;
        let candidate = &buf[start..];

        if candidate.len() < MIN_FRAME_SIZE {
            return None;
        }

        let data_len = candidate[4] as usize;
        let frame_len = MIN_FRAME_SIZE + data_len;
        if candidate.len() < frame_len {
            return None;
        }

        if candidate[frame_len - 1] != END {
            tracing::trace!(offset = start, "Corrupt frame, resynchronizing");
            offset = start + 1;
            continue;
        }

        let frame = Frame::new(
            candidate[1],
            candidate[2],
            candidate[3],
            Bytes::copy_from_slice(&candidate[5..5 + data_len]),
        );
        return Some((frame, start + frame_len));
    }
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Size above which unparseable bytes are thrown away.
    max_size: usize,
}

impl FrameBuffer {
    /// Create a new frame buffer with the default 1 KiB ceiling.
    pub fn new() -> Self {
        Self::with_max_size(MAX_BUFFER_SIZE)
    }

    /// Create a new frame buffer with a custom ceiling.
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(max_size),
            max_size,
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Partial data stays buffered for the next push. If the leftover bytes
    /// grow past the ceiling they are discarded.
    pub fn push(&mut self, data: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some((frame, consumed)) = parse_one(&self.buffer) {
            self.buffer.advance(consumed);
            frames.push(frame);
        }

        if self.buffer.len() > self.max_size {
            tracing::warn!(
                len = self.buffer.len(),
                "Receive buffer overflow, discarding"
            );
            self.buffer.clear();
        }

        frames
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
