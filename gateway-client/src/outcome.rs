//! Outcome classification.
//!
//! [`classify`] turns one [`RawResponse`] into exactly one [`Outcome`]. The
//! rules are evaluated in a fixed order so the narrow, actionable conditions
//! win over the broad 5xx bucket:
//!
//! 1. transport failure → [`Outcome::TransportError`]
//! 2. 504 or 522 → [`Outcome::Timeout`]
//! 3. 429 → [`Outcome::RateLimited`]
//! 4. 500..=599 → [`Outcome::ServerError`]
//! 5. anything else → [`Outcome::Success`]
//!
//! Response content is only read to extract the 5xx error message.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::{GatewayError, Result},
    transport::RawResponse,
};

/// Message used when a 5xx body carries none.
pub const DEFAULT_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

/// Classified result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The exchange completed with a non-failure status.
    Success(RawResponse),
    /// The gateway reported a gateway timeout.
    Timeout,
    /// The gateway throttled the caller.
    RateLimited {
        /// `X-RateLimit-Limit`, if present and numeric.
        limit: Option<u64>,
        /// `Retry-After` in seconds, if present and numeric.
        retry_after_secs: Option<u64>,
    },
    /// The exchange did not complete.
    TransportError {
        /// Transport failure label.
        code: String,
        /// Human-readable detail.
        message: String,
    },
    /// The gateway failed with a 5xx status.
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from the body or the default message.
        message: String,
    },
}

impl Outcome {
    /// Returns true for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Unwraps the successful response or converts the failure into an error.
    ///
    /// # Errors
    ///
    /// Returns the [`GatewayError`] variant matching the failure.
    pub fn into_response(self) -> Result<RawResponse> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Timeout => Err(GatewayError::Timeout),
            Self::RateLimited { limit, retry_after_secs } => {
                Err(GatewayError::RateLimited { limit, retry_after_secs })
            }
            Self::TransportError { code, message } => Err(GatewayError::Transport { code, message }),
            Self::ServerError { status, message } => Err(GatewayError::ServerError { status, message }),
        }
    }
}

/// Classifies a dispatch result.
///
/// # Examples
///
/// ```
/// use gateway_client::{
///     outcome::{Outcome, classify},
///     transport::RawResponse,
/// };
///
/// let throttled = RawResponse::new(
///     429,
///     vec![
///         ("X-RateLimit-Limit".to_owned(), "100".to_owned()),
///         ("Retry-After".to_owned(), "30".to_owned()),
///     ],
///     Vec::new(),
/// );
///
/// assert_eq!(
///     classify(throttled),
///     Outcome::RateLimited { limit: Some(100), retry_after_secs: Some(30) }
/// );
/// ```
#[must_use]
pub fn classify(response: RawResponse) -> Outcome {
    if let Some(failure) = response.transport_error {
        warn!(code = %failure.code, message = %failure.message, "transport failure");
        return Outcome::TransportError { code: failure.code, message: failure.message };
    }

    let outcome = match response.status {
        504 | 522 => Outcome::Timeout,
        429 => Outcome::RateLimited {
            limit: numeric_header(&response, "X-RateLimit-Limit"),
            retry_after_secs: numeric_header(&response, "Retry-After"),
        },
        status @ 500..=599 => Outcome::ServerError {
            status,
            message: server_error_message(&response.body)
                .unwrap_or_else(|| DEFAULT_SERVER_ERROR_MESSAGE.to_owned()),
        },
        _ => return Outcome::Success(response),
    };

    debug!(status = response.status, outcome = ?outcome, "gateway returned failure status");
    outcome
}

fn numeric_header(response: &RawResponse, name: &str) -> Option<u64> {
    response.header(name).and_then(|value| value.trim().parse().ok())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_message: Option<String>,
    message: Option<String>,
}

fn server_error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed.error_message.or(parsed.message).filter(|message| !message.trim().is_empty())
}
