//! Transaction result documents (`<result>`).

use serde::Deserialize;

use super::{RawErrors, RawKeyValue, ResultError, key_values, non_empty, parse_document, required};
use crate::error::Result;

/// How the gateway finished a transaction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// Processing finished.
    Finished,
    /// The customer must be redirected to [`TransactionResult::redirect_url`].
    Redirect,
    /// The gateway returned HTML to render.
    Html,
    /// Final status will arrive by callback.
    Pending,
    /// The transaction failed.
    Error,
    /// A value this client does not know.
    Other(String),
}

impl ReturnType {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "FINISHED" => Self::Finished,
            "REDIRECT" => Self::Redirect,
            "HTML" => Self::Html,
            "PENDING" => Self::Pending,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Finished => "FINISHED",
            Self::Redirect => "REDIRECT",
            Self::Html => "HTML",
            Self::Pending => "PENDING",
            Self::Error => "ERROR",
            Self::Other(value) => value,
        }
    }
}

/// How a redirect should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectType {
    /// Full page redirect.
    FullPage,
    /// Render inside an iframe.
    Iframe,
    /// A value this client does not know.
    Other(String),
}

impl RedirectType {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "fullpage" => Self::FullPage,
            "iframe" => Self::Iframe,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Parsed `<result>` document returned by the `transaction` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    /// Whether the gateway accepted the request.
    pub success: bool,
    /// Gateway transaction reference.
    pub reference_id: Option<String>,
    /// Gateway purchase id.
    pub purchase_id: Option<String>,
    /// Processing state.
    pub return_type: ReturnType,
    /// Redirect presentation, for [`ReturnType::Redirect`].
    pub redirect_type: Option<RedirectType>,
    /// Redirect target, for [`ReturnType::Redirect`].
    pub redirect_url: Option<String>,
    /// HTML to render, for [`ReturnType::Html`].
    pub html_content: Option<String>,
    /// Registration id created by `register` or `withRegister` requests.
    pub registration_id: Option<String>,
    /// Errors in document order.
    pub errors: Vec<ResultError>,
    /// Extra key/value pairs in document order.
    pub extra_data: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransactionResult {
    success: Option<String>,
    reference_id: Option<String>,
    purchase_id: Option<String>,
    return_type: Option<String>,
    redirect_type: Option<String>,
    redirect_url: Option<String>,
    html_content: Option<String>,
    registration_id: Option<String>,
    #[serde(default)]
    errors: RawErrors,
    #[serde(default)]
    extra_data: Vec<RawKeyValue>,
}

impl TransactionResult {
    /// Parses a `<result>` document.
    ///
    /// `success` and `returnType` are required.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`](crate::GatewayError::InvalidResponse)
    /// if the body is not such a document.
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_client::response::{ReturnType, TransactionResult};
    ///
    /// let body = br#"<result xmlns="http://gateway/Schema/V2/Result">
    ///     <success>true</success>
    ///     <referenceId>123456</referenceId>
    ///     <returnType>REDIRECT</returnType>
    ///     <redirectUrl>http://example.com</redirectUrl>
    /// </result>"#;
    ///
    /// let result = TransactionResult::parse(body).unwrap();
    /// assert_eq!(result.return_type, ReturnType::Redirect);
    /// assert_eq!(result.redirect_url.as_deref(), Some("http://example.com"));
    /// ```
    pub fn parse(body: &[u8]) -> Result<Self> {
        let raw: RawTransactionResult = parse_document(body, "result")?;
        let success = required(raw.success, "success", body)?;
        let return_type = required(raw.return_type, "returnType", body)?;

        Ok(Self {
            success: super::flag(Some(&success)),
            reference_id: non_empty(raw.reference_id),
            purchase_id: non_empty(raw.purchase_id),
            return_type: ReturnType::parse(&return_type),
            redirect_type: non_empty(raw.redirect_type).map(|v| RedirectType::parse(&v)),
            redirect_url: non_empty(raw.redirect_url),
            html_content: non_empty(raw.html_content),
            registration_id: non_empty(raw.registration_id),
            errors: raw.errors.into_errors(),
            extra_data: key_values(raw.extra_data),
        })
    }

    /// First reported error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&ResultError> {
        self.errors.first()
    }

    /// Looks up an extra data value by key.
    #[must_use]
    pub fn extra_data(&self, key: &str) -> Option<&str> {
        self.extra_data.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayError;

    const ERROR_BODY: &[u8] = br#"<?xml version="1.0" encoding="utf-8"?>
<result xmlns="http://gateway/Schema/V2/Result">
  <success>false</success>
  <referenceId>ref-1</referenceId>
  <purchaseId>20240101-abc</purchaseId>
  <returnType>ERROR</returnType>
  <errors>
    <error>
      <message>Payment declined</message>
      <code>2003</code>
      <adapterMessage>Do not honor</adapterMessage>
      <adapterCode>05</adapterCode>
    </error>
  </errors>
  <extraData key="acquirer">bankart</extraData>
  <extraData key="empty"/>
</result>"#;

    #[test]
    fn test_parse_error_result() {
        let result = TransactionResult::parse(ERROR_BODY).unwrap();

        assert!(!result.success);
        assert_eq!(result.return_type, ReturnType::Error);
        assert_eq!(result.purchase_id.as_deref(), Some("20240101-abc"));
        assert_eq!(result.first_error().and_then(|e| e.code), Some(2003));
        assert_eq!(result.extra_data("acquirer"), Some("bankart"));
        assert_eq!(result.extra_data("empty"), Some(""));
        assert_eq!(result.redirect_url, None);
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(
            TransactionResult::parse(ERROR_BODY).unwrap(),
            TransactionResult::parse(ERROR_BODY).unwrap()
        );
    }

    #[test]
    fn test_parse_finished_with_registration() {
        let body = b"<result><success>true</success><referenceId>r</referenceId>\
                     <registrationId>reg-9</registrationId><returnType>FINISHED</returnType>\
                     <redirectUrl></redirectUrl></result>";
        let result = TransactionResult::parse(body).unwrap();

        assert!(result.success);
        assert_eq!(result.return_type, ReturnType::Finished);
        assert_eq!(result.registration_id.as_deref(), Some("reg-9"));
        assert_eq!(result.redirect_url, None);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_unknown_return_type_is_kept() {
        let body = b"<result><success>true</success><returnType>LATER</returnType></result>";
        let result = TransactionResult::parse(body).unwrap();
        assert_eq!(result.return_type, ReturnType::Other("LATER".to_owned()));
        assert_eq!(result.return_type.as_str(), "LATER");
    }

    #[test]
    fn test_missing_return_type_is_invalid() {
        let body = b"<result><success>true</success></result>";
        assert!(matches!(
            TransactionResult::parse(body),
            Err(GatewayError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_html_body_is_invalid() {
        let body = b"<html><body>502 Bad Gateway</body></html>";
        match TransactionResult::parse(body) {
            Err(GatewayError::InvalidResponse { body: raw, .. }) => {
                assert!(raw.contains("502 Bad Gateway"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
