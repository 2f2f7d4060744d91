use super::XmlBuilder;
use crate::{
    credential::Credential,
    error::{GatewayError, Result},
};

/// Data of an `options` request: an identifier plus positional parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsRequest {
    /// Option set to look up.
    pub identifier: String,
    /// Positional arguments of the lookup.
    pub parameters: Vec<String>,
}

impl OptionsRequest {
    /// Creates a request for `identifier` with `parameters`.
    #[must_use]
    pub fn new<I, S>(identifier: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            identifier: identifier.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Renders the `options` document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] if the identifier is empty.
    pub fn render(&self, credential: &Credential, namespace_root: &str) -> Result<Vec<u8>> {
        if self.identifier.trim().is_empty() {
            return Err(GatewayError::Document("options identifier is empty".to_owned()));
        }

        let namespace = format!("{namespace_root}Options");
        let mut xml = XmlBuilder::new()?;
        xml.open("options", &[("xmlns", namespace.as_str())])?;
        xml.credentials(credential)?;
        xml.open("request", &[])?;
        xml.text("identifier", &self.identifier)?;
        if !self.parameters.is_empty() {
            xml.open("parameters", &[])?;
            for parameter in &self.parameters {
                xml.text("parameter", parameter)?;
            }
            xml.close("parameters")?;
        }
        xml.close("request")?;
        xml.close("options")?;
        Ok(xml.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_document() {
        let credential = Credential::with_hashed_password("key", "secret", "merchant", "hash");
        let request = OptionsRequest::new("countries", ["EU", "active"]);
        let xml = String::from_utf8(request.render(&credential, "ns/").unwrap()).unwrap();
        assert!(xml.contains(
            "<request><identifier>countries</identifier><parameters>\
             <parameter>EU</parameter><parameter>active</parameter></parameters></request>"
        ));
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let credential = Credential::with_hashed_password("key", "secret", "merchant", "hash");
        let request = OptionsRequest::new("", Vec::<String>::new());
        assert!(request.render(&credential, "ns/").is_err());
    }
}
