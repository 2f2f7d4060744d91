use super::XmlBuilder;
use crate::{
    credential::Credential,
    error::{GatewayError, Result},
};

/// Data of a `status` request.
///
/// The gateway reference wins when both identifiers are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRequest {
    /// Gateway transaction reference.
    pub transaction_uuid: Option<String>,
    /// Merchant-assigned transaction id.
    pub merchant_transaction_id: Option<String>,
}

impl StatusRequest {
    /// Looks a transaction up by its gateway reference.
    #[must_use]
    pub fn by_uuid(uuid: impl Into<String>) -> Self {
        Self { transaction_uuid: Some(uuid.into()), merchant_transaction_id: None }
    }

    /// Looks a transaction up by the merchant-assigned id.
    #[must_use]
    pub fn by_merchant_transaction_id(id: impl Into<String>) -> Self {
        Self { transaction_uuid: None, merchant_transaction_id: Some(id.into()) }
    }

    /// Renders the `status` document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] if neither identifier is set.
    pub fn render(&self, credential: &Credential, namespace_root: &str) -> Result<Vec<u8>> {
        let uuid = self.transaction_uuid.as_deref().filter(|v| !v.is_empty());
        let merchant_id = self.merchant_transaction_id.as_deref().filter(|v| !v.is_empty());

        let namespace = format!("{namespace_root}Status");
        let mut xml = XmlBuilder::new()?;
        xml.open("status", &[("xmlns", namespace.as_str())])?;
        xml.credentials(credential)?;
        match (uuid, merchant_id) {
            (Some(uuid), _) => xml.text("transactionUuid", uuid)?,
            (None, Some(id)) => xml.text("merchantTransactionId", id)?,
            (None, None) => {
                return Err(GatewayError::Document(
                    "status request needs a transaction uuid or merchant transaction id".to_owned(),
                ));
            }
        }
        xml.close("status")?;
        Ok(xml.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::with_hashed_password("key", "secret", "merchant", "hash")
    }

    #[test]
    fn test_uuid_preferred() {
        let request = StatusRequest {
            transaction_uuid: Some("uuid-1".to_owned()),
            merchant_transaction_id: Some("order-1".to_owned()),
        };
        let xml = String::from_utf8(request.render(&credential(), "ns/").unwrap()).unwrap();
        assert!(xml.contains("<transactionUuid>uuid-1</transactionUuid>"));
        assert!(!xml.contains("merchantTransactionId"));
    }

    #[test]
    fn test_merchant_id_fallback() {
        let request = StatusRequest {
            transaction_uuid: Some(String::new()),
            merchant_transaction_id: Some("order-1".to_owned()),
        };
        let xml = String::from_utf8(request.render(&credential(), "ns/").unwrap()).unwrap();
        assert!(xml.contains("<merchantTransactionId>order-1</merchantTransactionId>"));
    }

    #[test]
    fn test_no_identifier_rejected() {
        assert!(StatusRequest::default().render(&credential(), "ns/").is_err());
    }
}
