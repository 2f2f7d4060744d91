//! Customer profile results (JSON API).
//!
//! Every profile endpoint answers with either its domain payload or an
//! [`ErrorResult`]; [`ProfileResult`] makes that choice explicit. Which one
//! applies is decided by [`ProfilePayload::normalize`]:
//!
//! 1. the body must decode to a JSON object, else `InvalidResponse`
//! 2. HTTP 200 and [`ProfilePayload::is_domain_answer`] → domain payload
//! 3. a falsy or missing `success` flag → [`ErrorResult`]
//! 4. anything else → `InvalidResponse`
//!
//! "Get profile" additionally treats the presence of `profileExists` as a
//! domain answer, so `{"success":false,"profileExists":false}` is a valid
//! negative lookup rather than an error.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    document::Customer,
    error::{GatewayError, Result},
};

/// Domain payload or gateway-reported error.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileResult<T> {
    /// The endpoint's domain payload.
    Profile(T),
    /// The gateway rejected the request.
    Error(ErrorResult),
}

impl<T> ProfileResult<T> {
    /// Returns the domain payload, if any.
    pub fn profile(self) -> Option<T> {
        match self {
            Self::Profile(payload) => Some(payload),
            Self::Error(_) => None,
        }
    }

    /// Returns true for [`ProfileResult::Error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Error payload of the JSON API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorResult {
    /// Error message.
    pub error_message: Option<String>,
    /// Numeric error code.
    #[serde(deserialize_with = "lenient_i64")]
    pub error_code: Option<i64>,
    /// Additional detail.
    pub details: Option<String>,
}

/// Stored payment instrument of a customer profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentInstrument {
    /// Token to reference the instrument in transactions.
    pub payment_token: Option<String>,
    /// Payment method such as `creditcard` or `sepa`.
    pub method: Option<String>,
    /// Masked instrument details.
    pub payment_data: Option<PaymentData>,
    /// Whether this is the profile's preferred instrument.
    #[serde(deserialize_with = "lenient_bool")]
    pub is_preferred: Option<bool>,
    /// Creation timestamp as reported by the gateway.
    pub created_at: Option<String>,
}

/// Masked instrument details; only the fields of the instrument's kind are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaymentData {
    /// Card brand.
    pub brand: Option<String>,
    /// Card holder name.
    pub card_holder: Option<String>,
    /// Card BIN.
    pub first_six_digits: Option<String>,
    /// Last four card digits.
    pub last_four_digits: Option<String>,
    /// Card expiry month.
    #[serde(deserialize_with = "lenient_string")]
    pub expiry_month: Option<String>,
    /// Card expiry year.
    #[serde(deserialize_with = "lenient_string")]
    pub expiry_year: Option<String>,
    /// IBAN of a SEPA instrument.
    pub iban: Option<String>,
    /// BIC of a SEPA instrument.
    pub bic: Option<String>,
    /// SEPA mandate id.
    pub mandate_id: Option<String>,
    /// SEPA mandate date.
    pub mandate_date: Option<String>,
    /// Wallet reference of a wallet instrument.
    pub wallet_reference_id: Option<String>,
    /// Wallet owner.
    pub wallet_owner: Option<String>,
    /// Wallet type such as `paypal`.
    pub wallet_type: Option<String>,
}

/// Payload of the "get profile" endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetProfileResponse {
    /// Whether the gateway knows the profile.
    #[serde(deserialize_with = "lenient_bool")]
    pub profile_exists: Option<bool>,
    /// Profile identifier.
    pub profile_guid: Option<String>,
    /// Merchant customer identification.
    pub customer_identification: Option<String>,
    /// Preferred payment method.
    pub preferred_method: Option<String>,
    /// Stored customer data.
    pub customer: Option<Customer>,
    /// Stored payment instruments.
    pub payment_instruments: Vec<PaymentInstrument>,
}

impl GetProfileResponse {
    /// Returns true if the gateway reported an existing profile.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.profile_exists.unwrap_or(false)
    }
}

/// Payload of the "update profile" endpoints.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProfileResponse {
    /// Profile identifier.
    pub profile_guid: Option<String>,
    /// Merchant customer identification.
    pub customer_identification: Option<String>,
    /// Customer data after the update.
    pub customer: Option<Customer>,
    /// Fields the update changed, as reported by the gateway.
    pub changed_fields: Option<Value>,
}

/// Payload of the "delete profile" endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteProfileResponse {
    /// Success flag as sent by the gateway, read with [`is_truthy`].
    #[serde(deserialize_with = "lenient_flag")]
    pub success: bool,
}

/// A JSON profile endpoint payload.
pub trait ProfilePayload: DeserializeOwned + Sized {
    /// Whether a decoded object received with HTTP 200 is a domain answer.
    ///
    /// Defaults to a truthy `success` flag.
    fn is_domain_answer(object: &Map<String, Value>) -> bool {
        object.get("success").is_some_and(is_truthy)
    }

    /// Normalises an endpoint response into a [`ProfileResult`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`] if the body is not a JSON
    /// object, does not fit the selected payload type, or reports success
    /// with a status other than 200.
    fn normalize(status: u16, body: &[u8]) -> Result<ProfileResult<Self>> {
        let object = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return Err(GatewayError::invalid_response("body is not a JSON object", body)),
            Err(e) => {
                return Err(GatewayError::invalid_response(format!("body is not JSON: {e}"), body));
            }
        };

        if status == 200 && Self::is_domain_answer(&object) {
            return serde_json::from_value(Value::Object(object))
                .map(ProfileResult::Profile)
                .map_err(|e| GatewayError::invalid_response(format!("malformed payload: {e}"), body));
        }

        if !object.get("success").is_some_and(is_truthy) {
            return serde_json::from_value(Value::Object(object))
                .map(ProfileResult::Error)
                .map_err(|e| GatewayError::invalid_response(format!("malformed error: {e}"), body));
        }

        Err(GatewayError::invalid_response(format!("successful payload with HTTP {status}"), body))
    }
}

impl ProfilePayload for GetProfileResponse {
    fn is_domain_answer(object: &Map<String, Value>) -> bool {
        object.get("success").is_some_and(is_truthy)
            || object.get("profileExists").is_some_and(|value| !value.is_null())
    }
}

impl ProfilePayload for UpdateProfileResponse {}

impl ProfilePayload for DeleteProfileResponse {}

/// Loose truthiness of a decoded JSON value.
///
/// `null`, `false`, `0`, `""`, `"0"` and `[]` are falsy; everything else,
/// including an empty object, is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !(text.is_empty() || text == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(value) => Some(is_truthy(&value)),
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_bool(deserializer)?.unwrap_or(false))
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_i64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}
