//! Status result documents (`<statusResult>`).

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{RawErrors, ResultError, flag, non_empty, parse_document, required};
use crate::error::{GatewayError, Result};

/// Transaction state reported by the `status` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Completed successfully.
    Success,
    /// Still in progress.
    Pending,
    /// Failed.
    Error,
    /// Declined or otherwise unsuccessful.
    Failed,
    /// Waiting for the customer to finish a redirect.
    Redirect,
    /// Charged back.
    Chargeback,
    /// Chargeback reversed.
    ChargebackReversed,
    /// A value this client does not know.
    Other(String),
}

impl TransactionStatus {
    fn parse(value: &str) -> Self {
        match value.trim() {
            "SUCCESS" => Self::Success,
            "PENDING" => Self::Pending,
            "ERROR" => Self::Error,
            "FAILED" => Self::Failed,
            "REDIRECT" => Self::Redirect,
            "CHARGEBACK" => Self::Chargeback,
            "CHARGEBACK-REVERSED" => Self::ChargebackReversed,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "SUCCESS",
            Self::Pending => "PENDING",
            Self::Error => "ERROR",
            Self::Failed => "FAILED",
            Self::Redirect => "REDIRECT",
            Self::Chargeback => "CHARGEBACK",
            Self::ChargebackReversed => "CHARGEBACK-REVERSED",
            Self::Other(value) => value,
        }
    }
}

/// Parsed `<statusResult>` document returned by the `status` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    /// Whether the status lookup itself succeeded.
    pub operation_success: bool,
    /// State of the looked-up transaction.
    pub transaction_status: Option<TransactionStatus>,
    /// Gateway transaction uuid.
    pub transaction_uuid: Option<String>,
    /// Merchant-assigned transaction id.
    pub merchant_transaction_id: Option<String>,
    /// Transaction type such as `DEBIT` or `REFUND`.
    pub transaction_type: Option<String>,
    /// Transaction amount.
    pub amount: Option<Decimal>,
    /// ISO 4217 currency code.
    pub currency: Option<String>,
    /// Errors in document order.
    pub errors: Vec<ResultError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatusResult {
    operation_success: Option<String>,
    transaction_status: Option<String>,
    transaction_uuid: Option<String>,
    merchant_transaction_id: Option<String>,
    transaction_type: Option<String>,
    amount: Option<String>,
    currency: Option<String>,
    #[serde(default)]
    errors: RawErrors,
}

impl StatusResult {
    /// Parses a `<statusResult>` document; `operationSuccess` is required.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`](crate::GatewayError::InvalidResponse)
    /// if the body is not such a document or the amount is not a decimal.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let raw: RawStatusResult = parse_document(body, "statusResult")?;
        let operation_success = required(raw.operation_success, "operationSuccess", body)?;
        let amount = non_empty(raw.amount)
            .map(|amount| {
                amount.trim().parse::<Decimal>().map_err(|e| {
                    GatewayError::invalid_response(format!("invalid <amount>: {e}"), body)
                })
            })
            .transpose()?;

        Ok(Self {
            operation_success: flag(Some(&operation_success)),
            transaction_status: non_empty(raw.transaction_status)
                .map(|v| TransactionStatus::parse(&v)),
            transaction_uuid: non_empty(raw.transaction_uuid),
            merchant_transaction_id: non_empty(raw.merchant_transaction_id),
            transaction_type: non_empty(raw.transaction_type),
            amount,
            currency: non_empty(raw.currency),
            errors: raw.errors.into_errors(),
        })
    }

    /// First reported error, if any.
    #[must_use]
    pub fn first_error(&self) -> Option<&ResultError> {
        self.errors.first()
    }
}
