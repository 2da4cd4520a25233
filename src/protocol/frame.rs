//! Frame struct and frame encoders.
//!
//! A [`Frame`] is what the receiver sends back: zone, command, answer code and
//! data bytes. Outbound requests are plain byte buffers built by the
//! `encode_*` functions below.
//!
//! # Example
//!
//! ```
//! use arcam_client::protocol::{encode_query, zone, command, START, END, QUERY};
//!
//! let bytes = encode_query(zone::MASTER, command::VOLUME);
//! assert_eq!(&bytes[..], &[START, 0x01, 0x0D, 0x01, QUERY, END]);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{answer, command, END, MAX_DATA_LEN, MIN_FRAME_SIZE, QUERY, START};

/// A complete inbound frame. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Zone the frame refers to.
    pub zone: u8,
    /// Command (register) identifier.
    pub command: u8,
    /// Answer code; `0x00` for status, `>= 0x82` for errors.
    pub answer: u8,
    /// Data bytes (zero-copy via `bytes::Bytes`).
    pub data: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(zone: u8, command: u8, answer: u8, data: Bytes) -> Self {
        Self {
            zone,
            command,
            answer,
            data,
        }
    }

    /// Create a frame from raw data bytes (copies data).
    pub fn from_parts(zone: u8, command: u8, answer: u8, data: &[u8]) -> Self {
        Self::new(zone, command, answer, Bytes::copy_from_slice(data))
    }

    /// Get a reference to the data bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// First data byte, which holds the value for most registers.
    #[inline]
    pub fn value(&self) -> Option<u8> {
        self.data.first().copied()
    }

    /// Check if the answer code signals an error.
    #[inline]
    pub fn is_error(&self) -> bool {
        answer::is_error(self.answer)
    }

    /// Description of the answer code, if it is an error.
    pub fn error_message(&self) -> Option<String> {
        self.is_error().then(|| answer::error_message(self.answer))
    }

    /// Size of this frame on the wire.
    #[inline]
    pub fn wire_len(&self) -> usize {
        MIN_FRAME_SIZE + self.data.len()
    }
}

/// Encode a command frame.
///
/// # Panics
///
/// Panics if `data` is longer than [`MAX_DATA_LEN`]; the length byte could
/// not describe it and the receiver would lose frame sync.
pub fn encode_command(zone: u8, command: u8, data: &[u8]) -> Bytes {
    assert!(data.len() <= MAX_DATA_LEN, "frame data exceeds 255 bytes");
    let mut buf = BytesMut::with_capacity(MIN_FRAME_SIZE - 1 + data.len());
    buf.put_u8(START);
    buf.put_u8(zone);
    buf.put_u8(command);
    buf.put_u8(data.len() as u8);
    buf.put_slice(data);
    buf.put_u8(END);
    buf.freeze()
}

/// Encode a request for the current value of a register.
pub fn encode_query(zone: u8, command: u8) -> Bytes {
    encode_command(zone, command, &[QUERY])
}

/// Encode an RC5 remote-control relay.
pub fn encode_remote_command(zone: u8, system: u8, code: u8) -> Bytes {
    encode_command(zone, command::SIMULATE_RC5, &[system, code])
}

/// Encode a frame in the receiver's reply format.
///
/// Used by mock devices and to check that parsing round-trips.
///
/// # Panics
///
/// Panics if `data` is longer than [`MAX_DATA_LEN`].
pub fn encode_response(zone: u8, command: u8, answer: u8, data: &[u8]) -> Bytes {
    assert!(data.len() <= MAX_DATA_LEN, "frame data exceeds 255 bytes");
    let mut buf = BytesMut::with_capacity(MIN_FRAME_SIZE + data.len());
    buf.put_u8(START);
    buf.put_u8(zone);
    buf.put_u8(command);
    buf.put_u8(answer);
    buf.put_u8(data.len() as u8);
    buf.put_slice(data);
    buf.put_u8(END);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::zone;

    #[test]
    fn test_encode_command() {
        let bytes = encode_command(zone::MASTER, command::VOLUME, &[0x32]);
        assert_eq!(&bytes[..], &[0x21, 0x01, 0x0D, 0x01, 0x32, 0x0D]);
    }

    #[test]
    fn test_encode_command_empty_data() {
        let bytes = encode_command(zone::ZONE_2, command::POWER, &[]);
        assert_eq!(&bytes[..], &[START, 0x02, 0x00, 0x00, END]);
    }

    #[test]
    fn test_encode_query_volume() {
        let bytes = encode_query(zone::MASTER, command::VOLUME);
        assert_eq!(&bytes[..], &[START, 0x01, 0x0D, 0x01, 0xF0, END]);
    }

    #[test]
    fn test_encode_remote_command() {
        let bytes = encode_remote_command(zone::MASTER, 0x10, 0x0D);
        assert_eq!(&bytes[..], &[START, 0x01, 0x08, 0x02, 0x10, 0x0D, END]);
    }

    #[test]
    fn test_encode_command_max_data() {
        let data = [0xAA; MAX_DATA_LEN];
        let bytes = encode_command(zone::MASTER, command::NOW_PLAYING, &data);
        assert_eq!(bytes[3], 0xFF);
        assert_eq!(bytes.len(), MAX_DATA_LEN + 5);
        assert_eq!(bytes[bytes.len() - 1], END);
    }

    #[test]
    #[should_panic(expected = "frame data exceeds 255 bytes")]
    fn test_encode_command_rejects_oversized_data() {
        encode_command(zone::MASTER, command::NOW_PLAYING, &[0u8; 256]);
    }

    #[test]
    #[should_panic(expected = "frame data exceeds 255 bytes")]
    fn test_encode_response_rejects_oversized_data() {
        encode_response(zone::MASTER, command::NOW_PLAYING, 0x00, &[0u8; 256]);
    }

    #[test]
    fn test_encode_response() {
        let bytes = encode_response(zone::MASTER, command::VOLUME, 0x00, &[0x32]);
        assert_eq!(&bytes[..], &[START, 0x01, 0x0D, 0x00, 0x01, 0x32, END]);
    }

    #[test]
    fn test_frame_accessors() {
        let frame = Frame::from_parts(zone::MASTER, command::VOLUME, 0x00, &[0x32]);
        assert_eq!(frame.value(), Some(0x32));
        assert_eq!(frame.data(), &[0x32]);
        assert!(!frame.is_error());
        assert_eq!(frame.error_message(), None);
        assert_eq!(frame.wire_len(), 7);
    }

    #[test]
    fn test_error_frame() {
        let frame = Frame::from_parts(zone::MASTER, 0x7F, answer::COMMAND_NOT_RECOGNISED, &[]);
        assert!(frame.is_error());
        assert_eq!(frame.value(), None);
        assert_eq!(
            frame.error_message().as_deref(),
            Some("command not recognised")
        );
    }
}
