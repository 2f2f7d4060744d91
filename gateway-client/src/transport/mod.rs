//! Transport abstraction for the request dispatcher.
//!
//! A [`Transport`] performs exactly one `POST` exchange and reports what
//! happened as a [`RawResponse`]. It never classifies: a 500 or a dropped
//! connection is data for [`crate::outcome::classify`], not an error.
//!
//! Integrators may supply their own transport (a proxying client, a test
//! double); [`HttpTransport`] is the default reqwest-backed one.
//!
//! # Examples
//!
//! ```rust,no_run
//! use gateway_client::transport::{HttpTransport, OutboundRequest, Transport};
//! use url::Url;
//!
//! # async fn example() -> gateway_client::Result<()> {
//! let transport = HttpTransport::new();
//! let url = Url::parse("https://gateway.bankart.si/status").unwrap();
//!
//! let response = transport
//!     .post(OutboundRequest { url: &url, headers: vec![], body: b"<status/>" })
//!     .await;
//! println!("Status: {}", response.status);
//! # Ok(())
//! # }
//! ```

#[allow(
    redundant_imports,
    reason = "Future needed for RPITIT despite being in Edition 2024 prelude"
)]
use std::future::Future;

use crate::signer::SignedEnvelope;

pub mod config;
pub mod http;

pub use config::{HttpConfig, HttpVersion};
pub use http::HttpTransport;

/// One outbound `POST`.
#[derive(Debug, Clone)]
pub struct OutboundRequest<'a> {
    /// Absolute target URL.
    pub url: &'a url::Url,
    /// Headers to attach, including `Date` and `Authorization`.
    pub headers: Vec<(&'static str, String)>,
    /// Request body.
    pub body: &'a [u8],
}

impl<'a> From<&'a SignedEnvelope> for OutboundRequest<'a> {
    fn from(envelope: &'a SignedEnvelope) -> Self {
        Self { url: &envelope.url, headers: envelope.headers(), body: &envelope.body }
    }
}

/// Failure of an exchange that never produced an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Short label such as `connect`, `timeout`, `request` or `body`.
    pub code: String,
    /// Human-readable detail.
    pub message: String,
}

/// What one dispatch produced.
///
/// Read-only once returned. A failed exchange has status `0` and a
/// [`TransportFailure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code, `0` when no exchange completed.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Set when the exchange did not complete.
    pub transport_error: Option<TransportFailure>,
}

impl RawResponse {
    /// Creates a response for a completed exchange.
    #[must_use]
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self { status, headers, body: body.into(), transport_error: None }
    }

    /// Creates a response for an exchange that did not complete.
    #[must_use]
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            transport_error: Some(TransportFailure { code: code.into(), message: message.into() }),
            ..Self::default()
        }
    }

    /// Looks up a header value, ignoring the case of `name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_client::transport::RawResponse;
    ///
    /// let response =
    ///     RawResponse::new(429, vec![("retry-after".to_owned(), "30".to_owned())], Vec::new());
    /// assert_eq!(response.header("Retry-After"), Some("30"));
    /// assert_eq!(response.header("X-RateLimit-Limit"), None);
    /// ```
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Performs a single `POST` exchange.
///
/// Implementations must not retry and must not inspect the response beyond
/// collecting status, headers and body.
pub trait Transport: Send + Sync {
    /// Sends `request` and reports the result.
    fn post<'a>(&'a self, request: OutboundRequest<'a>)
    -> impl Future<Output = RawResponse> + Send + 'a;

    /// Returns the protocol name for logging.
    fn protocol_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::{credential::Credential, signer::{RequestSigner, SignatureScheme}};

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = RawResponse::new(
            429,
            vec![
                ("X-RATELIMIT-LIMIT".to_owned(), "100".to_owned()),
                ("retry-after".to_owned(), "30".to_owned()),
            ],
            Vec::new(),
        );

        assert_eq!(response.header("x-ratelimit-limit"), Some("100"));
        assert_eq!(response.header("Retry-After"), Some("30"));
        assert_eq!(response.header("Date"), None);
    }

    #[test]
    fn test_failed_response_has_no_status() {
        let response = RawResponse::failed("connect", "connection refused");
        assert_eq!(response.status, 0);
        assert!(response.body.is_empty());
        assert_eq!(
            response.transport_error,
            Some(TransportFailure {
                code: "connect".to_owned(),
                message: "connection refused".to_owned()
            })
        );
    }

    #[test]
    fn test_body_text_is_lossy() {
        let response = RawResponse::new(200, vec![], vec![b'o', b'k', 0xff]);
        assert_eq!(response.body_text(), "ok\u{fffd}");
    }

    #[test]
    fn test_outbound_request_from_envelope() {
        let credential = Credential::new("key", "secret", "user", "pw");
        let url = Url::parse("https://gw.example.com/transaction").unwrap();
        let envelope = RequestSigner::new(&credential)
            .sign(
                SignatureScheme::XmlV2,
                url,
                b"<xml/>".to_vec(),
                "Tue, 01 Jan 2030 00:00:00 GMT".to_owned(),
            )
            .unwrap();

        let request = OutboundRequest::from(&envelope);
        assert_eq!(request.url.as_str(), "https://gw.example.com/transaction");
        assert_eq!(request.body, b"<xml/>");
        assert!(request.headers.iter().any(|(name, _)| *name == "Authorization"));
        assert!(request.headers.iter().any(|(name, _)| *name == "Date"));
    }
}
