//! HTTP transport implementation.
//!
//! HTTP/1.1 and HTTP/2 transport using reqwest. Any reqwest failure is folded
//! into a [`RawResponse`] carrying a [`TransportFailure`](super::TransportFailure)
//! so the outcome classifier sees every dispatch the same way.

use std::sync::LazyLock;

use reqwest::Client;
use tracing::{debug, instrument};

use super::config::{HttpConfig, HttpVersion};
use crate::{
    error::{GatewayError, Result},
    transport::{OutboundRequest, RawResponse, Transport},
};

/// Default HTTP client with connection pooling enabled.
///
/// Shared by every [`HttpTransport::new`] so connections are pooled across
/// transports.
static DEFAULT_HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    let config = HttpConfig::default();
    Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Rejects header values that would split the request.
fn header_is_safe(value: &str) -> bool {
    !value.contains(['\r', '\n', '\0'])
}

/// Maps a reqwest failure to a transport failure label.
fn failure_code(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else if error.is_body() || error.is_decode() {
        "body"
    } else {
        "request"
    }
}

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// # Examples
///
/// ```
/// use gateway_client::transport::{HttpConfig, HttpTransport, HttpVersion, Transport};
///
/// let config = HttpConfig { http_version: HttpVersion::Http1, ..HttpConfig::default() };
/// let transport = HttpTransport::with_config(&config).unwrap();
/// assert_eq!(transport.protocol_name(), "http/1.1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    http_version: HttpVersion,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport backed by the shared default client.
    ///
    /// Default configuration:
    /// - Pool max idle per host: 10
    /// - Timeout: 30 seconds
    /// - Connect timeout: 10 seconds
    /// - HTTP version: Auto
    #[must_use]
    pub fn new() -> Self {
        Self { client: DEFAULT_HTTP_CLIENT.clone(), http_version: HttpVersion::Auto }
    }

    /// Creates a transport with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the configuration is out of
    /// bounds or the HTTP client cannot be built.
    pub fn with_config(config: &HttpConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout());

        builder = match config.http_version {
            HttpVersion::Http1 => builder.http1_only(),
            HttpVersion::Http2 => builder.http2_prior_knowledge(),
            HttpVersion::Auto => builder,
        };

        let client = builder
            .build()
            .map_err(|e| GatewayError::Configuration(format!("http client: {e}")))?;

        Ok(Self { client, http_version: config.http_version })
    }

    #[instrument(skip_all, fields(url = %request.url, body_len = request.body.len()))]
    async fn execute(&self, request: OutboundRequest<'_>) -> RawResponse {
        let mut builder = self.client.post(request.url.clone());
        for (name, value) in &request.headers {
            if !header_is_safe(value) {
                return RawResponse::failed(
                    "request",
                    format!("header {name} contains control characters"),
                );
            }
            builder = builder.header(*name, value.as_str());
        }

        let response = match builder.body(request.body.to_vec()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "exchange did not complete");
                return RawResponse::failed(failure_code(&e), e.to_string());
            }
        };

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_owned()))
            .collect();

        match response.bytes().await {
            Ok(body) => RawResponse::new(status, headers, body.to_vec()),
            Err(e) => RawResponse::failed(failure_code(&e), e.to_string()),
        }
    }
}

impl Transport for HttpTransport {
    async fn post<'a>(&'a self, request: OutboundRequest<'a>) -> RawResponse {
        self.execute(request).await
    }

    fn protocol_name(&self) -> &'static str {
        match self.http_version {
            HttpVersion::Http1 => "http/1.1",
            HttpVersion::Http2 => "http/2",
            HttpVersion::Auto => "http",
        }
    }
}
