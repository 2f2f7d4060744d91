//! Callback notification documents (`<callback>`).
//!
//! Decode a callback only after [`crate::callback::verify_callback`] accepted
//! it.

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{RawErrors, RawKeyValue, ResultError, key_values, non_empty, parse_document, required};
use crate::error::{GatewayError, Result};

/// Final state announced by a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackStatus {
    /// Transaction succeeded.
    Ok,
    /// Transaction is still pending.
    Pending,
    /// Transaction failed.
    Error,
    /// A value this client does not know.
    Other(String),
}

impl CallbackStatus {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "OK" => Self::Ok,
            "PENDING" => Self::Pending,
            "ERROR" => Self::Error,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Parsed `<callback>` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResult {
    /// Announced state.
    pub result: CallbackStatus,
    /// Gateway transaction reference.
    pub reference_id: Option<String>,
    /// Merchant-assigned transaction id.
    pub transaction_id: Option<String>,
    /// Gateway purchase id.
    pub purchase_id: Option<String>,
    /// Transaction type such as `DEBIT`.
    pub transaction_type: Option<String>,
    /// Transaction amount.
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Errors in document order.
    pub errors: Vec<ResultError>,
    /// Extra key/value pairs in document order.
    pub extra_data: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCallback {
    result: Option<String>,
    reference_id: Option<String>,
    transaction_id: Option<String>,
    purchase_id: Option<String>,
    transaction_type: Option<String>,
    amount: Option<String>,
    currency: Option<String>,
    #[serde(default)]
    errors: RawErrors,
    #[serde(default)]
    extra_data: Vec<RawKeyValue>,
}

impl CallbackResult {
    /// Parses a `<callback>` document; `result` is required.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`] if the body is not such a
    /// document.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let raw: RawCallback = parse_document(body, "callback")?;
        let result = required(raw.result, "result", body)?;
        let amount = non_empty(raw.amount)
            .map(|amount| {
                amount.trim().parse::<Decimal>().map_err(|e| {
                    GatewayError::invalid_response(format!("invalid <amount>: {e}"), body)
                })
            })
            .transpose()?;

        Ok(Self {
            result: CallbackStatus::parse(&result),
            reference_id: non_empty(raw.reference_id),
            transaction_id: non_empty(raw.transaction_id),
            purchase_id: non_empty(raw.purchase_id),
            transaction_type: non_empty(raw.transaction_type),
            amount,
            currency: non_empty(raw.currency),
            errors: raw.errors.into_errors(),
            extra_data: key_values(raw.extra_data),
        })
    }

    /// First reported error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&ResultError> {
        self.errors.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ok_callback() {
        let body = br#"<?xml version="1.0" encoding="utf-8"?>
<callback xmlns="http://gateway/Schema/V2/Callback">
  <result>OK</result>
  <referenceId>b1e2c3</referenceId>
  <transactionId>order-42</transactionId>
  <purchaseId>20300101-b1e2c3</purchaseId>
  <transactionType>DEBIT</transactionType>
  <amount>12.50</amount>
  <currency>EUR</currency>
</callback>"#;

        let callback = CallbackResult::parse(body).unwrap();
        assert_eq!(callback.result, CallbackStatus::Ok);
        assert_eq!(callback.reference_id.as_deref(), Some("b1e2c3"));
        assert_eq!(callback.transaction_id.as_deref(), Some("order-42"));
        assert_eq!(callback.amount, Some(Decimal::new(1250, 2)));
    }

    #[test]
    fn test_parse_error_callback() {
        let body = b"<callback><result>ERROR</result><transactionId>t</transactionId>\
                     <errors><error><message>Expired card</message><code>2016</code></error>\
                     </errors></callback>";

        let callback = CallbackResult::parse(body).unwrap();
        assert_eq!(callback.result, CallbackStatus::Error);
        assert_eq!(
            callback.first_error().and_then(|e| e.message.as_deref()),
            Some("Expired card")
        );
    }

    #[test]
    fn test_missing_result_is_invalid() {
        let body = b"<callback><transactionId>t</transactionId></callback>";
        assert!(matches!(
            CallbackResult::parse(body),
            Err(GatewayError::InvalidResponse { .. })
        ));
    }
}
