//! TCP connect with a bounded timeout.
//!
//! # Example
//!
//! ```ignore
//! use arcam_client::transport::connect;
//!
//! let stream = connect("192.168.1.40".into(), 50000, Duration::from_secs(10)).await?;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::error::{ArcamError, Result};

/// Boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An in-progress connect attempt.
pub type ConnectFuture = BoxFuture<'static, Result<TcpStream>>;

/// Open a TCP stream to `host:port`, failing with
/// [`ArcamError::ConnectTimeout`] if it takes longer than `timeout`.
///
/// The returned future owns its arguments so it can be stored and polled
/// alongside other work.
pub fn connect(host: String, port: u16, timeout: Duration) -> ConnectFuture {
    Box::pin(async move {
        tracing::debug!(host = %host, port, "Opening TCP connection");

        let stream = tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port)))
            .await
            .map_err(|_| ArcamError::ConnectTimeout(timeout))??;

        // Frames are a handful of bytes; don't let Nagle hold them back.
        stream.set_nodelay(true)?;
        Ok(stream)
    })
}
