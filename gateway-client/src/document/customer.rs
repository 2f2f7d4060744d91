use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::XmlBuilder;
use crate::error::{GatewayError, Result};

/// Customer details attached to transactions and stored in profiles.
///
/// Serialises with the gateway's camelCase names and omits unset fields, so
/// the same type describes the `<customer>` element of a transaction and the
/// `customer` object of the profile API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// `M` or `F`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_state: Option<String>,
    /// ISO 3166-1 alpha-2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
}

/// Text fields in document order: (snake_case key, element name).
const TEXT_FIELDS: &[(&str, &str)] = &[
    ("identification", "identification"),
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("birth_date", "birthDate"),
    ("gender", "gender"),
    ("billing_address1", "billingAddress1"),
    ("billing_address2", "billingAddress2"),
    ("billing_city", "billingCity"),
    ("billing_postcode", "billingPostcode"),
    ("billing_state", "billingState"),
    ("billing_country", "billingCountry"),
    ("billing_phone", "billingPhone"),
    ("shipping_first_name", "shippingFirstName"),
    ("shipping_last_name", "shippingLastName"),
    ("shipping_company", "shippingCompany"),
    ("shipping_address1", "shippingAddress1"),
    ("shipping_address2", "shippingAddress2"),
    ("shipping_city", "shippingCity"),
    ("shipping_postcode", "shippingPostcode"),
    ("shipping_state", "shippingState"),
    ("shipping_country", "shippingCountry"),
    ("shipping_phone", "shippingPhone"),
    ("company", "company"),
    ("email", "email"),
    ("ip_address", "ipAddress"),
    ("national_id", "nationalId"),
];

impl Customer {
    /// Sets a field by its snake_case key, e.g. `billing_city`.
    ///
    /// `email_verified` accepts `true`/`false`/`1`/`0`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] for an unknown key or an
    /// unparsable `email_verified` value.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        if key == "email_verified" {
            self.email_verified = Some(match value.trim() {
                "true" | "1" => true,
                "false" | "0" | "" => false,
                other => {
                    return Err(GatewayError::Document(format!(
                        "customer.email_verified: not a boolean: {other}"
                    )));
                }
            });
            return Ok(());
        }

        let slot = self
            .slot(key)
            .ok_or_else(|| GatewayError::Document(format!("unknown customer field: {key}")))?;
        *slot = Some(value);
        Ok(())
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        Some(match key {
            "identification" => &mut self.identification,
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "birth_date" => &mut self.birth_date,
            "gender" => &mut self.gender,
            "billing_address1" => &mut self.billing_address1,
            "billing_address2" => &mut self.billing_address2,
            "billing_city" => &mut self.billing_city,
            "billing_postcode" => &mut self.billing_postcode,
            "billing_state" => &mut self.billing_state,
            "billing_country" => &mut self.billing_country,
            "billing_phone" => &mut self.billing_phone,
            "shipping_first_name" => &mut self.shipping_first_name,
            "shipping_last_name" => &mut self.shipping_last_name,
            "shipping_company" => &mut self.shipping_company,
            "shipping_address1" => &mut self.shipping_address1,
            "shipping_address2" => &mut self.shipping_address2,
            "shipping_city" => &mut self.shipping_city,
            "shipping_postcode" => &mut self.shipping_postcode,
            "shipping_state" => &mut self.shipping_state,
            "shipping_country" => &mut self.shipping_country,
            "shipping_phone" => &mut self.shipping_phone,
            "company" => &mut self.company,
            "email" => &mut self.email,
            "ip_address" => &mut self.ip_address,
            "national_id" => &mut self.national_id,
            _ => return None,
        })
    }

    /// Writes the `<customer>` element.
    pub(crate) fn write_xml(&self, builder: &mut XmlBuilder) -> Result<()> {
        let mut fields = self.clone();
        builder.open("customer", &[])?;
        for (key, element) in TEXT_FIELDS {
            builder.optional(element, fields.slot(key).and_then(|value| value.as_deref()))?;
        }
        if let Some(verified) = self.email_verified {
            builder.text("emailVerified", if verified { "true" } else { "false" })?;
        }
        builder.close("customer")
    }
}

/// Customer data submitted to the profile update endpoints.
///
/// ```
/// use gateway_client::document::{Customer, CustomerData};
///
/// let data = CustomerData::new(Customer {
///     first_name: Some("Ana".to_owned()),
///     ..Customer::default()
/// })
/// .with_extra_data("loyalty", "gold");
///
/// let json = serde_json::to_value(&data).unwrap();
/// assert_eq!(json["firstName"], "Ana");
/// assert_eq!(json["extraData"]["loyalty"], "gold");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerData {
    /// Customer fields.
    #[serde(flatten)]
    pub customer: Customer,
    /// Merchant-defined extra data.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_data: BTreeMap<String, String>,
}

impl CustomerData {
    /// Wraps customer fields without extra data.
    #[must_use]
    pub fn new(customer: Customer) -> Self {
        Self { customer, extra_data: BTreeMap::new() }
    }

    /// Adds an extra data entry.
    #[must_use]
    pub fn with_extra_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_data.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_field_by_snake_case_key() {
        let mut customer = Customer::default();
        customer.set_field("billing_city", "Ljubljana").unwrap();
        customer.set_field("email_verified", "1").unwrap();
        assert_eq!(customer.billing_city.as_deref(), Some("Ljubljana"));
        assert_eq!(customer.email_verified, Some(true));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let mut customer = Customer::default();
        assert!(matches!(
            customer.set_field("favourite_colour", "blue"),
            Err(GatewayError::Document(_))
        ));
        assert!(customer.set_field("email_verified", "maybe").is_err());
    }

    #[test]
    fn test_xml_only_contains_set_fields() {
        let customer = Customer {
            first_name: Some("Ana".to_owned()),
            email: Some("ana@example.com".to_owned()),
            email_verified: Some(false),
            ..Customer::default()
        };
        let mut builder = XmlBuilder::new().unwrap();
        customer.write_xml(&mut builder).unwrap();
        let xml = String::from_utf8(builder.finish()).unwrap();

        assert!(xml.contains(
            "<customer><firstName>Ana</firstName><email>ana@example.com</email>\
             <emailVerified>false</emailVerified></customer>"
        ));
    }

    #[test]
    fn test_json_omits_unset_fields() {
        let data = CustomerData::new(Customer {
            last_name: Some("Novak".to_owned()),
            ..Customer::default()
        });
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"lastName":"Novak"}"#);
    }
}
