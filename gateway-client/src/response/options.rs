//! Options result documents (`<optionsResult>`).

use serde::Deserialize;

use super::{RawErrors, RawKeyValue, ResultError, flag, key_values, parse_document};
use crate::error::Result;

/// Parsed `<optionsResult>` document returned by the `options` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsResult {
    /// Whether the lookup succeeded.
    pub success: bool,
    /// Returned options in document order.
    pub options: Vec<(String, String)>,
    /// Errors in document order.
    pub errors: Vec<ResultError>,
}

#[derive(Debug, Deserialize)]
struct RawOptionsResult {
    success: Option<String>,
    #[serde(default)]
    options: RawOptions,
    #[serde(default)]
    errors: RawErrors,
}

#[derive(Debug, Default, Deserialize)]
struct RawOptions {
    #[serde(rename = "option", default)]
    option: Vec<RawKeyValue>,
}

impl OptionsResult {
    /// Parses an `<optionsResult>` document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`](crate::GatewayError::InvalidResponse)
    /// if the body is not such a document.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let raw: RawOptionsResult = parse_document(body, "optionsResult")?;
        Ok(Self {
            success: flag(raw.success.as_deref()),
            options: key_values(raw.options.option),
            errors: raw.errors.into_errors(),
        })
    }

    /// Looks up an option value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}
