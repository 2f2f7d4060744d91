//! Result normalisation.
//!
//! Each gateway endpoint answers with its own document shape. This module
//! parses them into typed results and offers a uniform
//! success/redirect/error view over the XML ones ([`PaymentResponse`]).
//!
//! | Endpoint | Root element | Type |
//! |----------|--------------|------|
//! | `transaction` | `result` | [`TransactionResult`] |
//! | `schedule` | `scheduleResult` | [`ScheduleResult`] |
//! | `status` | `statusResult` | [`StatusResult`] |
//! | `options` | `optionsResult` | [`OptionsResult`] |
//! | callback | `callback` | [`CallbackResult`] |
//! | customer profiles | JSON | [`ProfileResult`] |
//!
//! Unparsable bodies and missing required elements produce
//! [`GatewayError::InvalidResponse`] carrying the raw body.

use quick_xml::{Reader, events::Event};
use serde::{Deserialize, de::DeserializeOwned};

use crate::error::{GatewayError, Result};

pub mod callback;
pub mod options;
pub mod profile;
pub mod schedule;
pub mod status;
pub mod transaction;
pub mod view;

pub use callback::{CallbackResult, CallbackStatus};
pub use options::OptionsResult;
pub use profile::{
    DeleteProfileResponse, ErrorResult, GetProfileResponse, PaymentInstrument, ProfilePayload,
    ProfileResult, UpdateProfileResponse,
};
pub use schedule::{ScheduleResult, ScheduleStatus};
pub use status::{StatusResult, TransactionStatus};
pub use transaction::{RedirectType, ReturnType, TransactionResult};
pub use view::PaymentResponse;

/// One error reported inside a result document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultError {
    /// Gateway error message.
    pub message: Option<String>,
    /// Numeric gateway error code.
    pub code: Option<i64>,
    /// Message reported by the downstream adapter.
    pub adapter_message: Option<String>,
    /// Code reported by the downstream adapter.
    pub adapter_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawErrors {
    #[serde(rename = "error", default)]
    error: Vec<RawError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawError {
    message: Option<String>,
    code: Option<String>,
    adapter_message: Option<String>,
    adapter_code: Option<String>,
}

impl RawErrors {
    pub(crate) fn into_errors(self) -> Vec<ResultError> {
        self.error
            .into_iter()
            .map(|raw| ResultError {
                message: non_empty(raw.message),
                code: non_empty(raw.code).and_then(|code| code.trim().parse().ok()),
                adapter_message: non_empty(raw.adapter_message),
                adapter_code: non_empty(raw.adapter_code),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawKeyValue {
    #[serde(rename = "@key")]
    key: String,
    #[serde(rename = "$text", default)]
    value: String,
}

pub(crate) fn key_values(raw: Vec<RawKeyValue>) -> Vec<(String, String)> {
    raw.into_iter().map(|kv| (kv.key, kv.value)).collect()
}

/// Treats empty and whitespace-only element text as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Reads an XML boolean flag; anything but `true` or `1` is false.
pub(crate) fn flag(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("true" | "1"))
}

/// Returns the local name of the document's root element.
fn root_element(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(element) | Event::Empty(element)) => {
                return Some(String::from_utf8_lossy(element.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// Parses `body` as an XML document whose root element is `root`.
pub(crate) fn parse_document<T: DeserializeOwned>(body: &[u8], root: &str) -> Result<T> {
    let text = std::str::from_utf8(body)
        .map_err(|e| GatewayError::invalid_response(format!("body is not UTF-8: {e}"), body))?;

    match root_element(text) {
        Some(name) if name == root => {}
        Some(name) => {
            return Err(GatewayError::invalid_response(
                format!("expected <{root}> document, got <{name}>"),
                body,
            ));
        }
        None => return Err(GatewayError::invalid_response("body is not an XML document", body)),
    }

    quick_xml::de::from_str(text)
        .map_err(|e| GatewayError::invalid_response(format!("malformed <{root}>: {e}"), body))
}

/// Fails with [`GatewayError::InvalidResponse`] when a required element is absent.
pub(crate) fn required(value: Option<String>, element: &str, body: &[u8]) -> Result<String> {
    non_empty(value).ok_or_else(|| {
        GatewayError::invalid_response(format!("missing required element <{element}>"), body)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_element_skips_declaration_and_namespace() {
        let text = r#"<?xml version="1.0" encoding="utf-8"?>
            <ns:result xmlns:ns="http://gateway/Schema/V2/Result"><success>true</success></ns:result>"#;
        assert_eq!(root_element(text).as_deref(), Some("result"));
    }

    #[test]
    fn test_root_element_of_garbage() {
        assert_eq!(root_element("not xml at all"), None);
        assert_eq!(root_element(""), None);
    }

    #[test]
    fn test_flag_values() {
        assert!(flag(Some("true")));
        assert!(flag(Some(" 1 ")));
        assert!(!flag(Some("false")));
        assert!(!flag(Some("")));
        assert!(!flag(None));
    }

    #[test]
    fn test_parse_document_rejects_wrong_root() {
        #[derive(Debug, Deserialize)]
        struct Anything {}

        let err = parse_document::<Anything>(b"<statusResult/>", "result").unwrap_err();
        match err {
            GatewayError::InvalidResponse { reason, body } => {
                assert!(reason.contains("statusResult"));
                assert_eq!(body, "<statusResult/>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_errors_conversion() {
        let raw: RawErrors = quick_xml::de::from_str(
            "<errors><error><message>Invalid card</message><code>2003</code>\
             <adapterMessage>Declined</adapterMessage><adapterCode>05</adapterCode></error>\
             <error><message>Second</message><code>n/a</code></error></errors>",
        )
        .unwrap();

        let errors = raw.into_errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message.as_deref(), Some("Invalid card"));
        assert_eq!(errors[0].code, Some(2003));
        assert_eq!(errors[0].adapter_code.as_deref(), Some("05"));
        assert_eq!(errors[1].code, None);
    }
}
