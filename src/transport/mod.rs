//! Transport module - TCP connection to the receiver.
//!
//! The IP control interface is a plain TCP stream carrying the same bytes
//! the receiver accepts on its RS232 port.

mod tcp;

pub use tcp::{connect, BoxFuture, ConnectFuture};
