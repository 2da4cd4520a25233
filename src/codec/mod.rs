//! Codec module - value encodings for frame data bytes.
//!
//! The receiver packs most settings into a single data byte. These helpers
//! convert between those bytes and caller-friendly values:
//!
//! - [`level`] - signed tone offsets, half-dB trims, 5 ms delay steps, volume
//! - [`Source`] - input source identifiers
//! - [`status`] - enumerated status reports (power, mute, audio/video format)
//!
//! # Design
//!
//! Codecs are plain functions and enums rather than trait objects. They are
//! pure and never touch the connection.
//!
//! # Example
//!
//! ```
//! use arcam_client::codec::{level, Source};
//!
//! assert_eq!(level::encode_signed(-3), 0x83);
//! assert_eq!(level::decode_signed(0x83), -3);
//! assert_eq!(Source::from_code(0x02), Some(Source::Bd));
//! ```

pub mod level;
mod source;
pub mod status;

pub use source::Source;
