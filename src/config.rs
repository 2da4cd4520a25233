//! Connection configuration.
//!
//! Every field has a default, so a config can be built from just a host name
//! or deserialized from a partial settings document:
//!
//! ```
//! use arcam_client::ConnectionConfig;
//!
//! let config = ConnectionConfig::new("192.168.1.40");
//! assert_eq!(config.port, 50000);
//! assert!(config.validate().is_ok());
//! ```
//!
//! Durations are (de)serialized as whole milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ArcamError, Result};
use crate::protocol::DEFAULT_PORT;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time a command may wait for its reply.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Default interval between liveness queries.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Default first reconnect delay.
pub const DEFAULT_RECONNECT_BASE_DELAY: Duration = Duration::from_secs(3);

/// Default reconnect delay ceiling.
pub const DEFAULT_RECONNECT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default pause after a reply before the next command is written.
pub const DEFAULT_COMMAND_GAP: Duration = Duration::from_millis(50);

/// Settings for a single receiver connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Host name or IP address of the receiver.
    pub host: String,
    /// TCP port of the IP control interface.
    pub port: u16,
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    pub connect_timeout: Duration,
    #[serde(rename = "command_timeout_ms", with = "millis")]
    pub command_timeout: Duration,
    #[serde(rename = "heartbeat_interval_ms", with = "millis")]
    pub heartbeat_interval: Duration,
    #[serde(rename = "reconnect_base_delay_ms", with = "millis")]
    pub reconnect_base_delay: Duration,
    #[serde(rename = "reconnect_max_delay_ms", with = "millis")]
    pub reconnect_max_delay: Duration,
    /// Pause between a reply and the next write, so the receiver keeps up.
    #[serde(rename = "command_gap_ms", with = "millis")]
    pub command_gap: Duration,
}

impl ConnectionConfig {
    /// Create a config for `host` with every other field at its default.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Check the config for values the connection cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ArcamError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ArcamError::Config("port must not be 0".to_string()));
        }

        for (name, value) in [
            ("connect_timeout", self.connect_timeout),
            ("command_timeout", self.command_timeout),
            ("heartbeat_interval", self.heartbeat_interval),
            ("reconnect_base_delay", self.reconnect_base_delay),
        ] {
            if value.is_zero() {
                return Err(ArcamError::Config(format!("{} must be non-zero", name)));
            }
        }

        if self.reconnect_base_delay > self.reconnect_max_delay {
            return Err(ArcamError::Config(format!(
                "reconnect_base_delay {:?} exceeds reconnect_max_delay {:?}",
                self.reconnect_base_delay, self.reconnect_max_delay
            )));
        }

        Ok(())
    }

    /// Delay before the given reconnect attempt (1-based).
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        reconnect_delay(attempt, self.reconnect_base_delay, self.reconnect_max_delay)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            reconnect_base_delay: DEFAULT_RECONNECT_BASE_DELAY,
            reconnect_max_delay: DEFAULT_RECONNECT_MAX_DELAY,
            command_gap: DEFAULT_COMMAND_GAP,
        }
    }
}

/// Exponential backoff: `base * 2^(attempt - 1)`, capped at `max`.
pub fn reconnect_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.checked_mul(1u32 << exponent)
        .map_or(max, |delay| delay.min(max))
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::new("avr.local");
        assert_eq!(config.host, "avr.local");
        assert_eq!(config.port, 50000);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.command_timeout, Duration::from_secs(5));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.reconnect_base_delay, Duration::from_secs(3));
        assert_eq!(config.reconnect_max_delay, Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_sequence() {
        let config = ConnectionConfig::new("avr.local");
        let delays: Vec<u64> = (1..=8)
            .map(|attempt| config.reconnect_delay(attempt).as_millis() as u64)
            .collect();
        assert_eq!(
            delays,
            vec![3000, 6000, 12000, 24000, 48000, 60000, 60000, 60000]
        );
    }

    #[test]
    fn test_backoff_does_not_overflow() {
        let base = Duration::from_secs(3);
        let max = Duration::from_secs(60);
        assert_eq!(reconnect_delay(1000, base, max), max);
        assert_eq!(reconnect_delay(u32::MAX, base, max), max);
        assert_eq!(reconnect_delay(0, base, max), base);
    }

    #[test]
    fn test_validation_errors() {
        assert!(ConnectionConfig::default().validate().is_err());

        let mut config = ConnectionConfig::new("avr.local");
        config.command_timeout = Duration::ZERO;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("command_timeout"));

        let mut config = ConnectionConfig::new("avr.local");
        config.reconnect_base_delay = Duration::from_secs(120);
        assert!(config.validate().is_err());

        let mut config = ConnectionConfig::new("avr.local");
        config.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{ "host": "10.0.0.5", "command_timeout_ms": 2500, "reconnect_max_delay_ms": 30000 }"#,
        )
        .unwrap();

        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 50000);
        assert_eq!(config.command_timeout, Duration::from_millis(2500));
        assert_eq!(config.reconnect_max_delay, Duration::from_secs(30));
        assert_eq!(config.heartbeat_interval, DEFAULT_HEARTBEAT_INTERVAL);
    }

    #[test]
    fn test_serialize_uses_millis() {
        let value = serde_json::to_value(ConnectionConfig::new("avr.local")).unwrap();
        assert_eq!(value["heartbeat_interval_ms"], 30000);
        assert_eq!(value["command_gap_ms"], 50);
    }
}
