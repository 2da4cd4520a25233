//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the receiver's binary protocol:
//! - Wire constants (markers, zones, commands, answer codes, RC5 codes)
//! - Frame encoders for commands, queries and RC5 relays
//! - Resynchronizing frame parser and receive buffer

mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::{encode_command, encode_query, encode_remote_command, encode_response, Frame};
pub use frame_buffer::{parse_one, FrameBuffer, MAX_BUFFER_SIZE};
pub use wire_format::{
    answer, command, rc5, zone, DEFAULT_PORT, END, MAX_DATA_LEN, MIN_FRAME_SIZE, QUERY, START,
};
