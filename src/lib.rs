//! # arcam-client
//!
//! Async client for the IP control protocol of Arcam AV receivers.
//!
//! The receiver listens on TCP port 50000 and speaks a compact binary
//! protocol: every request is a frame carrying a zone, a command register
//! and up to 255 data bytes, and the receiver answers each request with a
//! frame of its own. It also pushes frames on its own when its state
//! changes (volume knob, input switch, power button).
//!
//! ## Architecture
//!
//! - **Protocol**: frame layout, wire constants, resynchronizing parser
//! - **Codec**: value encodings for single data bytes (levels, sources, status)
//! - **Queue**: serializes commands so exactly one is on the wire at a time
//! - **Connection**: socket lifecycle, heartbeat and exponential-backoff reconnect
//!
//! ## Example
//!
//! ```ignore
//! use arcam_client::{Connection, ConnectionEvent};
//! use arcam_client::protocol::{command, zone};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let avr = Connection::builder("192.168.1.40").build()?;
//!     avr.connect().await?;
//!
//!     let power = avr.query(zone::MASTER, command::POWER).await?;
//!     println!("power: {:?}", power.value());
//!
//!     avr.send_command(zone::MASTER, command::VOLUME, &[30]).await?;
//!     avr.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod queue;
pub mod transport;

mod connection;

pub use config::ConnectionConfig;
pub use connection::{
    Connection, ConnectionBuilder, ConnectionEvent, ConnectionState, DEFAULT_EVENT_CAPACITY,
};
pub use error::{ArcamError, Result};
pub use protocol::Frame;
