//! Error types for the gateway client.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type
//! is [`GatewayError`]. The variants form a closed taxonomy a caller can match
//! on to decide whether to retry, fix configuration, or give up.
//!
//! # Error Categories
//!
//! - **Exchange failures** ([`GatewayError::Transport`], [`GatewayError::Timeout`],
//!   [`GatewayError::RateLimited`], [`GatewayError::ServerError`]): produced by
//!   the outcome classifier from a single dispatch
//! - **Payload failures** ([`GatewayError::InvalidResponse`]): the exchange
//!   completed but the body matched no expected shape
//! - **Static failures** ([`GatewayError::Configuration`], [`GatewayError::Signing`],
//!   [`GatewayError::Document`]): local setup or rendering problems
//!
//! # Examples
//!
//! ```
//! use gateway_client::error::{GatewayError, Result};
//!
//! fn require_api_key(key: &str) -> Result<&str> {
//!     if key.is_empty() {
//!         return Err(GatewayError::Configuration("api key must not be empty".to_owned()));
//!     }
//!     Ok(key)
//! }
//! ```

use std::time::Duration;

use thiserror::Error;

/// Result type alias for gateway operations.
///
/// All fallible functions in this crate return this type.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by the gateway client.
///
/// The exchange variants are mutually exclusive: one dispatch produces at
/// most one of them. None of them is retried by this crate.
///
/// # Error Recovery
///
/// - **Transient** ([`Timeout`](Self::Timeout), [`RateLimited`](Self::RateLimited),
///   [`ServerError`](Self::ServerError), [`Transport`](Self::Transport)): the caller
///   may retry under its own idempotency policy, see [`GatewayError::is_transient`]
/// - **Payload** ([`InvalidResponse`](Self::InvalidResponse)): inspect the raw body
/// - **Static** ([`Configuration`](Self::Configuration), [`Signing`](Self::Signing),
///   [`Document`](Self::Document)): fix the input, never retry
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The HTTP exchange did not complete.
    ///
    /// Covers DNS, connect, TLS and body-read failures. `code` is a short
    /// machine-readable label such as `connect` or `timeout`.
    ///
    /// # Recovery
    ///
    /// Check network reachability of the gateway base URL.
    #[error("request failed: {code} {message}")]
    Transport {
        /// Transport failure label.
        code: String,
        /// Human-readable detail.
        message: String,
    },

    /// The gateway answered with a gateway-timeout status (504 or 522).
    ///
    /// This is a classification of a completed exchange, not a local deadline.
    #[error("request timed out")]
    Timeout,

    /// The gateway throttled the caller (HTTP 429).
    ///
    /// Both fields are advisory and absent when the gateway omitted the
    /// `X-RateLimit-Limit` or `Retry-After` headers.
    ///
    /// # Recovery
    ///
    /// Wait at least [`GatewayError::retry_after`] before the next attempt.
    #[error("rate limit exceeded{}", rate_limit_detail(*.limit, *.retry_after_secs))]
    RateLimited {
        /// Request quota reported by the gateway.
        limit: Option<u64>,
        /// Seconds the gateway asks the caller to wait.
        retry_after_secs: Option<u64>,
    },

    /// The gateway answered with a 5xx status other than 504 and 522.
    #[error("server error: HTTP {status} - {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or `Internal Server Error`.
        message: String,
    },

    /// The exchange succeeded but the body did not match any expected shape.
    ///
    /// The raw body is kept for diagnostics.
    #[error("invalid response received: {reason}")]
    InvalidResponse {
        /// What went wrong while decoding.
        reason: String,
        /// Raw response body.
        body: String,
    },

    /// Invalid static configuration such as an empty or unparsable base URL.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The keyed digest could not be computed.
    #[error("signature computation failed: {0}")]
    Signing(String),

    /// A request document could not be rendered.
    #[error("request document could not be rendered: {0}")]
    Document(String),
}

impl GatewayError {
    /// Builds an [`InvalidResponse`](Self::InvalidResponse) from a raw body.
    pub fn invalid_response(reason: impl Into<String>, body: &[u8]) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Returns the advisory wait before retrying a rate-limited call.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use gateway_client::GatewayError;
    ///
    /// let err = GatewayError::RateLimited { limit: Some(100), retry_after_secs: Some(30) };
    /// assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    /// assert_eq!(GatewayError::Timeout.retry_after(), None);
    /// ```
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after_secs: Some(secs), .. } => {
                Some(Duration::from_secs(*secs))
            }
            _ => None,
        }
    }

    /// Returns true for failures a caller's retry policy may consider.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout | Self::RateLimited { .. } | Self::ServerError { .. }
        )
    }
}

fn rate_limit_detail(limit: Option<u64>, retry_after_secs: Option<u64>) -> String {
    let mut detail = String::new();
    if let Some(limit) = limit {
        detail.push_str(&format!(" | Rate Limit: {limit}"));
    }
    if let Some(secs) = retry_after_secs {
        detail.push_str(&format!(" | Retry-After: {secs} seconds"));
    }
    detail
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_display() {
        let err = GatewayError::RateLimited { limit: Some(100), retry_after_secs: Some(30) };
        assert_eq!(
            err.to_string(),
            "rate limit exceeded | Rate Limit: 100 | Retry-After: 30 seconds"
        );

        let bare = GatewayError::RateLimited { limit: None, retry_after_secs: None };
        assert_eq!(bare.to_string(), "rate limit exceeded");
    }

    #[test]
    fn test_server_error_display() {
        let err = GatewayError::ServerError {
            status: 503,
            message: "Internal Server Error".to_owned(),
        };
        assert_eq!(err.to_string(), "server error: HTTP 503 - Internal Server Error");
    }

    #[test]
    fn test_invalid_response_keeps_body() {
        let err = GatewayError::invalid_response("not xml", b"<html>oops</html>");
        match err {
            GatewayError::InvalidResponse { reason, body } => {
                assert_eq!(reason, "not xml");
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_transient() {
        assert!(GatewayError::Timeout.is_transient());
        assert!(
            GatewayError::Transport { code: "connect".to_owned(), message: String::new() }
                .is_transient()
        );
        assert!(!GatewayError::Configuration("x".to_owned()).is_transient());
        assert!(!GatewayError::invalid_response("x", b"").is_transient());
    }

    #[test]
    fn test_retry_after_absent_header() {
        let err = GatewayError::RateLimited { limit: Some(10), retry_after_secs: None };
        assert_eq!(err.retry_after(), None);
    }
}
