//! Inbound callback verification.
//!
//! The gateway signs callbacks exactly like the client signs XML requests:
//! `Gateway <api_key>:<digest>` over the raw body, the `Date` header and the
//! path plus query the callback was delivered to. Verification recomputes
//! that value and compares it in constant time.
//!
//! # Examples
//!
//! ```
//! use gateway_client::{
//!     callback::{CallbackMessage, verify_callback},
//!     credential::Credential,
//! };
//!
//! let credential = Credential::new("api-key", "shared-secret", "merchant", "password");
//! let message = CallbackMessage::from_headers(
//!     b"<callback/>".to_vec(),
//!     "/callback?id=42",
//!     &[("Date", "Tue, 01 Jan 2030 00:00:00 GMT"), ("Authorization", "Gateway api-key:forged")],
//! );
//!
//! assert!(!verify_callback(&credential, &message));
//! ```

use crate::{
    credential::Credential,
    error::Result,
    response::{CallbackResult, CallbackStatus, ResultError},
    signer::{
        CanonicalRequest, SignatureScheme, compute_digest, gateway_authorization,
        verify_authorization,
    },
};

/// Prefix some proxies leave in front of a forwarded authorization value.
const AUTHORIZATION_LABEL: &str = "Authorization:";

/// A received callback request, reduced to what the signature covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackMessage {
    /// Raw request body.
    pub body: Vec<u8>,
    /// Path plus query the callback was received on, with leading slash.
    pub path_and_query: String,
    /// `Date` header value.
    pub date: Option<String>,
    /// `Authorization` header value.
    pub authorization: Option<String>,
}

impl CallbackMessage {
    /// Builds a message from the received headers.
    ///
    /// The date comes from `Date`, falling back to `X-Date`; the authorization
    /// from `Authorization`, falling back to `X-Authorization`. Names match
    /// case-insensitively and empty values count as absent.
    #[must_use]
    pub fn from_headers<K, V>(body: Vec<u8>, path_and_query: impl Into<String>, headers: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let lookup = |name: &str| {
            headers
                .iter()
                .find(|(key, value)| {
                    key.as_ref().eq_ignore_ascii_case(name) && !value.as_ref().trim().is_empty()
                })
                .map(|(_, value)| value.as_ref().to_owned())
        };

        Self {
            body,
            path_and_query: path_and_query.into(),
            date: lookup("Date").or_else(|| lookup("X-Date")),
            authorization: lookup("Authorization").or_else(|| lookup("X-Authorization")),
        }
    }
}

/// Returns true if the callback carries the gateway's signature.
///
/// A missing date or authorization never verifies.
#[must_use]
pub fn verify_callback(credential: &Credential, message: &CallbackMessage) -> bool {
    let (Some(date), Some(presented)) = (&message.date, &message.authorization) else {
        tracing::warn!(path = %message.path_and_query, "callback without date or authorization");
        return false;
    };

    let canonical = CanonicalRequest {
        scheme: SignatureScheme::XmlV2,
        method: "POST",
        content_type: SignatureScheme::XmlV2.content_type(),
        date: date.as_str(),
        path_and_query: &message.path_and_query,
        body: &message.body,
    }
    .canonical_string();

    let digest = match compute_digest(credential.shared_secret().expose(), &canonical) {
        Ok(digest) => digest,
        Err(e) => {
            tracing::warn!(error = %e, "cannot compute callback digest");
            return false;
        }
    };
    let expected = gateway_authorization(credential.api_key(), &digest);

    let presented = if presented.contains(AUTHORIZATION_LABEL) {
        presented.replace(AUTHORIZATION_LABEL, "").trim().to_owned()
    } else {
        presented.clone()
    };

    let verified = verify_authorization(&expected, &presented);
    if !verified {
        tracing::warn!(path = %message.path_and_query, "callback signature mismatch");
    }
    verified
}

/// Decodes a callback body.
///
/// Decode only callbacks that passed [`verify_callback`].
///
/// # Errors
///
/// Returns [`GatewayError::InvalidResponse`](crate::GatewayError::InvalidResponse)
/// if the body is not a callback document.
pub fn read_callback(body: &[u8]) -> Result<CallbackResult> {
    CallbackResult::parse(body)
}

/// Final state reported to the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationStatus {
    /// The transaction succeeded.
    Completed,
    /// The transaction is still pending.
    Pending,
    /// The transaction failed, or the callback was not trustworthy.
    Failed,
}

/// Outcome of [`accept_notification`].
///
/// Empty when the callback failed verification or decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notification {
    data: Option<CallbackResult>,
}

impl Notification {
    /// Decoded callback, if it verified and decoded.
    #[must_use]
    pub const fn data(&self) -> Option<&CallbackResult> {
        self.data.as_ref()
    }

    /// `OK` → completed, `PENDING` → pending, anything else or no data → failed.
    #[must_use]
    pub fn status(&self) -> NotificationStatus {
        match self.data.as_ref().map(|data| &data.result) {
            Some(CallbackStatus::Ok) => NotificationStatus::Completed,
            Some(CallbackStatus::Pending) => NotificationStatus::Pending,
            _ => NotificationStatus::Failed,
        }
    }

    /// Gateway transaction reference.
    #[must_use]
    pub fn transaction_reference(&self) -> Option<&str> {
        self.data.as_ref()?.reference_id.as_deref()
    }

    /// Merchant-assigned transaction id.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.data.as_ref()?.transaction_id.as_deref()
    }

    /// Message of the first reported error.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.data.as_ref()?.first_error().and_then(|error: &ResultError| error.message.as_deref())
    }
}

/// Verifies and decodes a callback in one step.
///
/// Never fails: an unverified or undecodable callback yields an empty
/// [`Notification`] whose status is [`NotificationStatus::Failed`].
#[must_use]
pub fn accept_notification(credential: &Credential, message: &CallbackMessage) -> Notification {
    if !verify_callback(credential, message) {
        return Notification::default();
    }
    match read_callback(&message.body) {
        Ok(data) => Notification { data: Some(data) },
        Err(e) => {
            tracing::warn!(error = %e, "verified callback did not decode");
            Notification::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATE: &str = "Tue, 01 Jan 2030 00:00:00 GMT";
    const PATH: &str = "/callback?id=42";
    const BODY: &[u8] = b"<callback><result>OK</result><referenceId>ref-1</referenceId>\
                          <transactionId>order-1</transactionId></callback>";

    fn credential() -> Credential {
        Credential::new("api-key", "shared-secret", "merchant", "password")
    }

    fn sign(body: &[u8], path: &str) -> String {
        let canonical = CanonicalRequest {
            scheme: SignatureScheme::XmlV2,
            method: "POST",
            content_type: SignatureScheme::XmlV2.content_type(),
            date: DATE,
            path_and_query: path,
            body,
        }
        .canonical_string();
        gateway_authorization("api-key", &compute_digest(b"shared-secret", &canonical).unwrap())
    }

    fn message(authorization: &str) -> CallbackMessage {
        CallbackMessage::from_headers(
            BODY.to_vec(),
            PATH,
            &[("date", DATE.to_owned()), ("authorization", authorization.to_owned())],
        )
    }

    #[test]
    fn test_valid_signature_verifies() {
        assert!(verify_callback(&credential(), &message(&sign(BODY, PATH))));
    }

    #[test]
    fn test_authorization_label_is_stripped() {
        let labelled = format!("Authorization:  {} ", sign(BODY, PATH));
        assert!(verify_callback(&credential(), &message(&labelled)));
    }

    #[test]
    fn test_tampering_fails() {
        let authorization = sign(BODY, PATH);

        let mut tampered_body = message(&authorization);
        tampered_body.body.push(b' ');
        assert!(!verify_callback(&credential(), &tampered_body));

        let mut tampered_path = message(&authorization);
        tampered_path.path_and_query = "/callback?id=43".to_owned();
        assert!(!verify_callback(&credential(), &tampered_path));

        let mut tampered_date = message(&authorization);
        tampered_date.date = Some("Wed, 02 Jan 2030 00:00:00 GMT".to_owned());
        assert!(!verify_callback(&credential(), &tampered_date));
    }

    #[test]
    fn test_header_fallbacks() {
        let authorization = sign(BODY, PATH);
        let message = CallbackMessage::from_headers(
            BODY.to_vec(),
            PATH,
            &[
                ("Date", ""),
                ("X-Date", DATE),
                ("X-Authorization", authorization.as_str()),
            ],
        );
        assert_eq!(message.date.as_deref(), Some(DATE));
        assert!(verify_callback(&credential(), &message));
    }

    #[test]
    fn test_missing_headers_fail() {
        let message = CallbackMessage::from_headers(BODY.to_vec(), PATH, &[("Date", DATE)]);
        assert_eq!(message.authorization, None);
        assert!(!verify_callback(&credential(), &message));
    }

    #[test]
    fn test_accept_notification() {
        let notification = accept_notification(&credential(), &message(&sign(BODY, PATH)));
        assert_eq!(notification.status(), NotificationStatus::Completed);
        assert_eq!(notification.transaction_reference(), Some("ref-1"));
        assert_eq!(notification.transaction_id(), Some("order-1"));
        assert_eq!(notification.message(), None);

        let rejected = accept_notification(&credential(), &message("Gateway api-key:forged"));
        assert_eq!(rejected.status(), NotificationStatus::Failed);
        assert!(rejected.data().is_none());
        assert_eq!(rejected.transaction_id(), None);
    }

    #[test]
    fn test_notification_status_mapping() {
        let pending: &[u8] = b"<callback><result>PENDING</result></callback>";
        let error: &[u8] = b"<callback><result>ERROR</result><errors><error><message>Declined</message>\
                      <code>2003</code></error></errors></callback>";

        let signed = |body: &[u8]| {
            CallbackMessage::from_headers(
                body.to_vec(),
                PATH,
                &[("Date", DATE.to_owned()), ("Authorization", sign(body, PATH))],
            )
        };

        assert_eq!(
            accept_notification(&credential(), &signed(pending)).status(),
            NotificationStatus::Pending
        );
        let failed = accept_notification(&credential(), &signed(error));
        assert_eq!(failed.status(), NotificationStatus::Failed);
        assert_eq!(failed.message(), Some("Declined"));
    }

    #[test]
    fn test_verified_but_undecodable_is_empty() {
        let body: &[u8] = b"not xml";
        let message = CallbackMessage::from_headers(
            body.to_vec(),
            PATH,
            &[("Date", DATE.to_owned()), ("Authorization", sign(body, PATH))],
        );
        assert!(verify_callback(&credential(), &message));
        assert_eq!(accept_notification(&credential(), &message), Notification::default());
    }
}
