//! Connection settings for the gateway HTTP transport.
//!
//! A merchant talks to a single gateway host, so the idle pool stays small:
//! enough to overlap a debit with its status poll and a callback-driven
//! profile lookup, not a fan-out pool. The request timeout covers the
//! gateway's own processing, which includes the acquirer round trip for
//! synchronous debits and can take tens of seconds.
//!
//! Read from the `[http]` table of the gateway configuration file:
//!
//! ```toml
//! [http]
//! pool_max_idle_per_host = 4
//! timeout_secs = 60
//! http_version = "http1"
//! ```

use std::{ops::RangeInclusive, time::Duration};

use serde::Deserialize;

use crate::error::{GatewayError, Result};

/// Idle connections kept to the gateway host.
pub const DEFAULT_POOL_IDLE: usize = 10;
/// Seconds a signed request may wait for the gateway's answer.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Seconds allowed for TCP and TLS setup.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const POOL_IDLE_BOUNDS: RangeInclusive<usize> = 1..=64;
const TIMEOUT_BOUNDS: RangeInclusive<u64> = 1..=300;
const CONNECT_TIMEOUT_BOUNDS: RangeInclusive<u64> = 1..=60;

/// `[http]` settings applied when building an
/// [`HttpTransport`](super::HttpTransport).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Idle connections kept open to the gateway host.
    pub pool_max_idle_per_host: usize,
    /// Whole-request deadline in seconds, signing excluded.
    pub timeout_secs: u64,
    /// Connection setup deadline in seconds.
    pub connect_timeout_secs: u64,
    /// Protocol used against the gateway.
    pub http_version: HttpVersion,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: DEFAULT_POOL_IDLE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            http_version: HttpVersion::Auto,
        }
    }
}

impl HttpConfig {
    /// Checks the settings before a transport is built from them.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] when:
    /// - `pool_max_idle_per_host` is outside 1-64
    /// - `timeout_secs` is outside 1-300
    /// - `connect_timeout_secs` is outside 1-60 or longer than `timeout_secs`
    pub fn validate(&self) -> Result<()> {
        check_bounds("pool_max_idle_per_host", self.pool_max_idle_per_host, &POOL_IDLE_BOUNDS)?;
        check_bounds("timeout_secs", self.timeout_secs, &TIMEOUT_BOUNDS)?;
        check_bounds("connect_timeout_secs", self.connect_timeout_secs, &CONNECT_TIMEOUT_BOUNDS)?;
        if self.connect_timeout_secs > self.timeout_secs {
            return Err(GatewayError::Configuration(format!(
                "connect_timeout_secs ({}) exceeds timeout_secs ({})",
                self.connect_timeout_secs, self.timeout_secs
            )));
        }
        Ok(())
    }

    /// Request deadline handed to the HTTP client.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connection setup deadline.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn check_bounds<T>(name: &str, value: T, bounds: &RangeInclusive<T>) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if bounds.contains(&value) {
        return Ok(());
    }
    Err(GatewayError::Configuration(format!(
        "{name} must be between {} and {}, got {value}",
        bounds.start(),
        bounds.end()
    )))
}

/// Protocol used against the gateway.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HttpVersion {
    /// HTTP/1.1 only, for proxies that mangle HTTP/2.
    Http1,
    /// HTTP/2 without ALPN.
    Http2,
    /// Let TLS negotiation pick.
    #[default]
    Auto,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_validation() {
        let config = HttpConfig::default();
        assert_eq!(config.pool_max_idle_per_host, DEFAULT_POOL_IDLE);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.http_version, HttpVersion::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_http_table_keeps_defaults() {
        let config: HttpConfig = toml::from_str("timeout_secs = 60").unwrap();
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(config.pool_max_idle_per_host, DEFAULT_POOL_IDLE);

        let config: HttpConfig = toml::from_str("http_version = \"http1\"").unwrap();
        assert_eq!(config.http_version, HttpVersion::Http1);

        assert!(toml::from_str::<HttpConfig>("http_version = \"http3\"").is_err());
    }

    #[test]
    fn test_timeouts_out_of_range_are_rejected() {
        let zero = HttpConfig { timeout_secs: 0, ..HttpConfig::default() };
        assert!(matches!(zero.validate(), Err(GatewayError::Configuration(_))));

        let slow_connect = HttpConfig { connect_timeout_secs: 61, ..HttpConfig::default() };
        assert!(slow_connect.validate().is_err());

        let edge = HttpConfig { timeout_secs: 300, connect_timeout_secs: 60, ..HttpConfig::default() };
        assert!(edge.validate().is_ok());
    }

    #[test]
    fn test_pool_size_and_connect_deadline_are_checked() {
        let no_pool = HttpConfig { pool_max_idle_per_host: 0, ..HttpConfig::default() };
        let Err(GatewayError::Configuration(message)) = no_pool.validate() else {
            panic!("empty pool accepted");
        };
        assert!(message.contains("pool_max_idle_per_host"));

        let fan_out = HttpConfig { pool_max_idle_per_host: 100, ..HttpConfig::default() };
        assert!(fan_out.validate().is_err());

        let inverted = HttpConfig { timeout_secs: 5, connect_timeout_secs: 10, ..HttpConfig::default() };
        assert!(inverted.validate().is_err());
    }
}
