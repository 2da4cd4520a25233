//! Error types for arcam-client.

use std::time::Duration;

use thiserror::Error;

/// Main error type for all receiver operations.
#[derive(Debug, Error)]
pub enum ArcamError {
    /// I/O error on the TCP socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The receiver did not accept the TCP connection in time.
    #[error("Connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// No reply arrived for a command before its timer fired.
    #[error("Command timed out after {0:?}")]
    CommandTimeout(Duration),

    /// The receiver answered with an error-coded frame.
    #[error("Device error 0x{code:02X}: {message}")]
    Device {
        /// Raw answer code from the frame.
        code: u8,
        /// Decoded description of the answer code.
        message: String,
    },

    /// The connection was closed while the request was outstanding.
    #[error("Disconnected")]
    Disconnected,

    /// The connection driver has shut down; no further requests are possible.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Invalid connection configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArcamError {
    /// Check if this error came from the command queue being drained.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, ArcamError::Disconnected | ArcamError::ConnectionClosed)
    }

    /// Check if this error is a per-command or connect timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ArcamError::CommandTimeout(_) | ArcamError::ConnectTimeout(_)
        )
    }

    /// Copy of this error, for reporting one failure to several waiters.
    pub(crate) fn duplicate(&self) -> Self {
        match self {
            ArcamError::Io(e) => ArcamError::Io(std::io::Error::new(e.kind(), e.to_string())),
            ArcamError::ConnectTimeout(d) => ArcamError::ConnectTimeout(*d),
            ArcamError::CommandTimeout(d) => ArcamError::CommandTimeout(*d),
            ArcamError::Device { code, message } => ArcamError::Device {
                code: *code,
                message: message.clone(),
            },
            ArcamError::Disconnected => ArcamError::Disconnected,
            ArcamError::ConnectionClosed => ArcamError::ConnectionClosed,
            ArcamError::Config(msg) => ArcamError::Config(msg.clone()),
        }
    }
}

/// Result type alias using ArcamError.
pub type Result<T> = std::result::Result<T, ArcamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ArcamError::Device {
            code: 0x83,
            message: "command not recognised".to_string(),
        };
        assert_eq!(err.to_string(), "Device error 0x83: command not recognised");
        assert_eq!(ArcamError::Disconnected.to_string(), "Disconnected");
    }

    #[test]
    fn test_classification() {
        assert!(ArcamError::Disconnected.is_disconnect());
        assert!(ArcamError::ConnectionClosed.is_disconnect());
        assert!(ArcamError::CommandTimeout(Duration::from_secs(5)).is_timeout());
        assert!(!ArcamError::Config("x".into()).is_timeout());
    }

    #[test]
    fn test_duplicate_keeps_io_kind() {
        let err = ArcamError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        match err.duplicate() {
            ArcamError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionRefused),
            other => panic!("unexpected {:?}", other),
        }
    }
}
