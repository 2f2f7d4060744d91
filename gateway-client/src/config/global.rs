//! Process-wide gateway URL override.
//!
//! Clients built with [`BaseUrl::Global`](super::BaseUrl::Global) read this
//! value on every dispatch, so switching it moves every such client between
//! sandbox and production at once.
//!
//! # Concurrency
//!
//! Reads and writes are memory-safe, but a change made while requests are in
//! flight lands at an unspecified point: a request may be signed for one URL
//! and sent after the value changed. Treat [`set_api_url`] as start-up or test
//! configuration and serialise calls to it yourself.

use std::sync::{LazyLock, PoisonError, RwLock};

use super::DEFAULT_GATEWAY_URL;
use crate::error::{GatewayError, Result};

static API_URL: LazyLock<RwLock<Option<String>>> = LazyLock::new(|| RwLock::new(None));

/// Sets the process-wide gateway URL.
///
/// # Errors
///
/// Returns [`GatewayError::Configuration`] if `url` is empty.
pub fn set_api_url(url: impl Into<String>) -> Result<()> {
    let url = url.into();
    if url.trim().is_empty() {
        return Err(GatewayError::Configuration("the gateway URL can not be empty".to_owned()));
    }
    *API_URL.write().unwrap_or_else(PoisonError::into_inner) = Some(url);
    Ok(())
}

/// Returns the process-wide gateway URL, or [`default_url`] if none is set.
#[must_use]
pub fn api_url() -> String {
    API_URL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(default_url)
}

/// Restores the default URL.
pub fn reset_api_url() {
    *API_URL.write().unwrap_or_else(PoisonError::into_inner) = None;
}

/// The URL used when no override is set.
#[must_use]
pub fn default_url() -> String {
    DEFAULT_GATEWAY_URL.to_owned()
}
