//! Field mapping for generic request maps.
//!
//! Integrators that collect transaction data as snake_case key/value pairs
//! (`transaction_id`, `success_url`, `customer`, ...) build a
//! [`TransactionData`] through [`build_transaction`]. Every key goes through
//! the fixed [`TransactionField`] table; unknown keys are rejected instead of
//! being silently dropped.

use rust_decimal::Decimal;

use super::{TransactionData, TransactionIndicator, transaction::UrlSlot};
use crate::error::{GatewayError, Result};

/// A recognised request map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionField {
    /// `transaction_id` → `transactionId`.
    TransactionId,
    /// `amount` → `amount`.
    Amount,
    /// `currency` → `currency`.
    Currency,
    /// `description` → `description`.
    Description,
    /// `success_url` → `successUrl`.
    SuccessUrl,
    /// `cancel_url` → `cancelUrl`.
    CancelUrl,
    /// `error_url` → `errorUrl`.
    ErrorUrl,
    /// `callback_url` → `callbackUrl`.
    CallbackUrl,
    /// `customer` → `customer` (nested map of customer fields).
    Customer,
    /// `transaction_indicator` → `transactionIndicator`.
    TransactionIndicator,
    /// `extra_data` → `extraData` (nested map).
    ExtraData,
    /// `reference_transaction_id` → `referenceTransactionId`.
    ReferenceTransactionId,
    /// `with_register` → `withRegister`.
    WithRegister,
    /// `transaction_reference` → `referenceTransactionId`.
    TransactionReference,
}

/// Every recognised field.
pub const FIELDS: &[TransactionField] = &[
    TransactionField::TransactionId,
    TransactionField::Amount,
    TransactionField::Currency,
    TransactionField::Description,
    TransactionField::SuccessUrl,
    TransactionField::CancelUrl,
    TransactionField::ErrorUrl,
    TransactionField::CallbackUrl,
    TransactionField::Customer,
    TransactionField::TransactionIndicator,
    TransactionField::ExtraData,
    TransactionField::ReferenceTransactionId,
    TransactionField::WithRegister,
    TransactionField::TransactionReference,
];

impl TransactionField {
    /// Looks a request map key up.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        FIELDS.iter().copied().find(|field| field.key() == key)
    }

    /// Request map key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TransactionId => "transaction_id",
            Self::Amount => "amount",
            Self::Currency => "currency",
            Self::Description => "description",
            Self::SuccessUrl => "success_url",
            Self::CancelUrl => "cancel_url",
            Self::ErrorUrl => "error_url",
            Self::CallbackUrl => "callback_url",
            Self::Customer => "customer",
            Self::TransactionIndicator => "transaction_indicator",
            Self::ExtraData => "extra_data",
            Self::ReferenceTransactionId => "reference_transaction_id",
            Self::WithRegister => "with_register",
            Self::TransactionReference => "transaction_reference",
        }
    }

    /// Gateway element the field is written to.
    #[must_use]
    pub const fn element(self) -> &'static str {
        match self {
            Self::TransactionId => "transactionId",
            Self::Amount => "amount",
            Self::Currency => "currency",
            Self::Description => "description",
            Self::SuccessUrl => "successUrl",
            Self::CancelUrl => "cancelUrl",
            Self::ErrorUrl => "errorUrl",
            Self::CallbackUrl => "callbackUrl",
            Self::Customer => "customer",
            Self::TransactionIndicator => "transactionIndicator",
            Self::ExtraData => "extraData",
            Self::ReferenceTransactionId | Self::TransactionReference => "referenceTransactionId",
            Self::WithRegister => "withRegister",
        }
    }
}

/// Value of a request map entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Unset; the entry is skipped.
    Null,
    /// Scalar text.
    Text(String),
    /// Boolean flag.
    Flag(bool),
    /// Nested map; unset values are skipped.
    Map(Vec<(String, Option<String>)>),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Builds transaction data from a generic request map.
///
/// # Errors
///
/// Returns [`GatewayError::Document`] for an unknown key, a value of the
/// wrong shape, an unparsable amount or indicator, or a missing
/// `transaction_id`.
///
/// # Examples
///
/// ```
/// use gateway_client::document::field_map::{FieldValue, build_transaction};
///
/// let data = build_transaction([
///     ("transaction_id", FieldValue::from("order-7")),
///     ("amount", FieldValue::from("10.00")),
///     ("currency", FieldValue::from("EUR")),
///     ("description", FieldValue::Null),
/// ])
/// .unwrap();
///
/// assert_eq!(data.transaction_id(), "order-7");
/// ```
pub fn build_transaction<K, I>(fields: I) -> Result<TransactionData>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, FieldValue)>,
{
    let mut transaction_id = None;
    let mut data = TransactionData::default();

    for (key, value) in fields {
        let key = key.as_ref();
        let field = TransactionField::from_key(key)
            .ok_or_else(|| GatewayError::Document(format!("unknown request field: {key}")))?;

        match (field, value) {
            (_, FieldValue::Null) => {}
            (TransactionField::Customer, FieldValue::Map(entries)) => {
                let customer = data.customer_mut();
                for (name, value) in entries {
                    if let Some(value) = value {
                        customer.set_field(&name, value)?;
                    }
                }
            }
            (TransactionField::ExtraData, FieldValue::Map(entries)) => {
                for (name, value) in entries {
                    if let Some(value) = value {
                        data.push_extra_data(name, value);
                    }
                }
            }
            (TransactionField::WithRegister, FieldValue::Flag(flag)) => data.set_register(flag),
            (TransactionField::WithRegister, FieldValue::Text(text)) => {
                data.set_register(matches!(text.trim(), "true" | "1"));
            }
            (field, FieldValue::Text(text)) => apply_text(&mut data, &mut transaction_id, field, text)?,
            (field, _) => {
                return Err(GatewayError::Document(format!(
                    "request field {} has the wrong shape",
                    field.key()
                )));
            }
        }
    }

    let transaction_id = transaction_id
        .ok_or_else(|| GatewayError::Document("request map lacks transaction_id".to_owned()))?;
    data.set_transaction_id(transaction_id);
    Ok(data)
}

fn apply_text(
    data: &mut TransactionData,
    transaction_id: &mut Option<String>,
    field: TransactionField,
    text: String,
) -> Result<()> {
    match field {
        TransactionField::TransactionId => *transaction_id = Some(text),
        TransactionField::Amount => {
            let amount = text.trim().parse::<Decimal>().map_err(|e| {
                GatewayError::Document(format!("amount is not a decimal: {e}"))
            })?;
            data.set_amount(amount);
        }
        TransactionField::Currency => data.set_currency(text),
        TransactionField::Description => data.set_description(text),
        TransactionField::SuccessUrl => data.set_urls(UrlSlot::Success, text),
        TransactionField::CancelUrl => data.set_urls(UrlSlot::Cancel, text),
        TransactionField::ErrorUrl => data.set_urls(UrlSlot::Error, text),
        TransactionField::CallbackUrl => data.set_urls(UrlSlot::Callback, text),
        TransactionField::TransactionIndicator => {
            data.set_indicator(TransactionIndicator::parse(&text)?);
        }
        TransactionField::ReferenceTransactionId | TransactionField::TransactionReference => {
            data.set_reference_transaction_id(text);
        }
        TransactionField::Customer | TransactionField::ExtraData | TransactionField::WithRegister => {
            return Err(GatewayError::Document(format!(
                "request field {} has the wrong shape",
                field.key()
            )));
        }
    }
    Ok(())
}
