use rust_decimal::Decimal;

use super::{Customer, TransactionMethod, XmlBuilder};
use crate::{
    credential::Credential,
    error::{GatewayError, Result},
};

/// Role of a transaction within a series of payments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransactionIndicator {
    /// A one-off payment.
    #[default]
    Single,
    /// First payment of a series; stores the instrument.
    Initial,
    /// Merchant-initiated recurring payment.
    Recurring,
    /// Customer-initiated payment with a stored instrument.
    CardOnFile,
    /// Merchant-initiated payment with a stored instrument.
    CardOnFileMerchant,
}

impl TransactionIndicator {
    /// Wire value of the indicator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Initial => "INITIAL",
            Self::Recurring => "RECURRING",
            Self::CardOnFile => "CARDONFILE",
            Self::CardOnFileMerchant => "CARDONFILE_MERCHANT",
        }
    }

    /// Parses a wire value.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] for an unknown indicator.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            "SINGLE" => Ok(Self::Single),
            "INITIAL" => Ok(Self::Initial),
            "RECURRING" => Ok(Self::Recurring),
            "CARDONFILE" => Ok(Self::CardOnFile),
            "CARDONFILE_MERCHANT" => Ok(Self::CardOnFileMerchant),
            other => Err(GatewayError::Document(format!("unknown transaction indicator: {other}"))),
        }
    }
}

/// Data of a `transaction` request.
///
/// # Examples
///
/// ```
/// use gateway_client::document::{TransactionData, TransactionIndicator};
/// use rust_decimal::Decimal;
///
/// let data = TransactionData::new("order-42")
///     .with_amount(Decimal::new(995, 2), "EUR")
///     .with_description("Charging session")
///     .with_success_url("https://shop.example/ok")
///     .with_indicator(TransactionIndicator::Initial)
///     .with_register(true);
///
/// assert_eq!(data.transaction_id(), "order-42");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionData {
    transaction_id: String,
    reference_transaction_id: Option<String>,
    amount: Option<Decimal>,
    currency: Option<String>,
    description: Option<String>,
    success_url: Option<String>,
    cancel_url: Option<String>,
    error_url: Option<String>,
    callback_url: Option<String>,
    customer: Option<Customer>,
    with_register: bool,
    transaction_indicator: Option<TransactionIndicator>,
    extra_data: Vec<(String, String)>,
}

impl TransactionData {
    /// Starts a request with the merchant-assigned transaction id.
    #[must_use]
    pub fn new(transaction_id: impl Into<String>) -> Self {
        Self { transaction_id: transaction_id.into(), ..Self::default() }
    }

    /// Merchant-assigned transaction id.
    #[must_use]
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Sets the gateway reference of the transaction this one refers to.
    #[must_use]
    pub fn with_reference_transaction_id(mut self, reference: impl Into<String>) -> Self {
        self.reference_transaction_id = Some(reference.into());
        self
    }

    /// Sets amount and ISO 4217 currency code.
    #[must_use]
    pub fn with_amount(mut self, amount: Decimal, currency: impl Into<String>) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.into());
        self
    }

    /// Sets the description shown to the customer.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the redirect target after success.
    #[must_use]
    pub fn with_success_url(mut self, url: impl Into<String>) -> Self {
        self.success_url = Some(url.into());
        self
    }

    /// Sets the redirect target after cancellation.
    #[must_use]
    pub fn with_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = Some(url.into());
        self
    }

    /// Sets the redirect target after an error.
    #[must_use]
    pub fn with_error_url(mut self, url: impl Into<String>) -> Self {
        self.error_url = Some(url.into());
        self
    }

    /// Sets the URL notified with the final result.
    #[must_use]
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Attaches customer details.
    #[must_use]
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Requests that the payment instrument is stored as well.
    #[must_use]
    pub const fn with_register(mut self, register: bool) -> Self {
        self.with_register = register;
        self
    }

    /// Sets the transaction indicator.
    #[must_use]
    pub const fn with_indicator(mut self, indicator: TransactionIndicator) -> Self {
        self.transaction_indicator = Some(indicator);
        self
    }

    /// Appends an extra data entry; order is preserved.
    #[must_use]
    pub fn with_extra_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_data.push((key.into(), value.into()));
        self
    }

    pub(crate) fn set_transaction_id(&mut self, transaction_id: String) {
        self.transaction_id = transaction_id;
    }

    pub(crate) fn customer_mut(&mut self) -> &mut Customer {
        self.customer.get_or_insert_with(Customer::default)
    }

    pub(crate) fn set_amount(&mut self, amount: Decimal) {
        self.amount = Some(amount);
    }

    pub(crate) fn set_currency(&mut self, currency: String) {
        self.currency = Some(currency);
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = Some(description);
    }

    pub(crate) fn set_urls(&mut self, slot: UrlSlot, url: String) {
        let target = match slot {
            UrlSlot::Success => &mut self.success_url,
            UrlSlot::Cancel => &mut self.cancel_url,
            UrlSlot::Error => &mut self.error_url,
            UrlSlot::Callback => &mut self.callback_url,
        };
        *target = Some(url);
    }

    pub(crate) fn set_reference_transaction_id(&mut self, reference: String) {
        self.reference_transaction_id = Some(reference);
    }

    pub(crate) fn set_register(&mut self, register: bool) {
        self.with_register = register;
    }

    pub(crate) fn set_indicator(&mut self, indicator: TransactionIndicator) {
        self.transaction_indicator = Some(indicator);
    }

    pub(crate) fn push_extra_data(&mut self, key: String, value: String) {
        self.extra_data.push((key, value));
    }

    /// Renders the `transaction` document for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] if the transaction id is empty,
    /// a follow-up method lacks a reference transaction id, or an amount is
    /// given without currency.
    pub fn render(
        &self,
        method: TransactionMethod,
        credential: &Credential,
        language: Option<&str>,
        namespace_root: &str,
    ) -> Result<Vec<u8>> {
        self.validate(method)?;

        let namespace = format!("{namespace_root}Transaction");
        let mut xml = XmlBuilder::new()?;
        xml.open("transaction", &[("xmlns", namespace.as_str())])?;
        xml.credentials(credential)?;

        xml.open(method.element(), &[])?;
        xml.text("transactionId", &self.transaction_id)?;
        for (key, value) in &self.extra_data {
            xml.keyed("extraData", key, value)?;
        }
        xml.optional("referenceTransactionId", self.reference_transaction_id.as_deref())?;
        if let Some(customer) = &self.customer {
            customer.write_xml(&mut xml)?;
        }
        if let Some(amount) = self.amount {
            xml.text("amount", &format_amount(amount))?;
        }
        xml.optional("currency", self.currency.as_deref())?;
        xml.optional("description", self.description.as_deref())?;
        xml.optional("successUrl", self.success_url.as_deref())?;
        xml.optional("cancelUrl", self.cancel_url.as_deref())?;
        xml.optional("errorUrl", self.error_url.as_deref())?;
        xml.optional("callbackUrl", self.callback_url.as_deref())?;
        if self.with_register {
            xml.text("withRegister", "true")?;
        }
        if let Some(indicator) = self.transaction_indicator {
            xml.text("transactionIndicator", indicator.as_str())?;
        }
        xml.close(method.element())?;

        xml.optional("language", language)?;
        xml.close("transaction")?;
        Ok(xml.finish())
    }

    fn validate(&self, method: TransactionMethod) -> Result<()> {
        if self.transaction_id.trim().is_empty() {
            return Err(GatewayError::Document("transaction id is empty".to_owned()));
        }
        let needs_reference = matches!(
            method,
            TransactionMethod::CompleteRegister
                | TransactionMethod::Deregister
                | TransactionMethod::CompletePreauthorize
                | TransactionMethod::Void
                | TransactionMethod::Capture
                | TransactionMethod::Refund
                | TransactionMethod::CompleteDebit
        );
        if needs_reference && self.reference_transaction_id.is_none() {
            return Err(GatewayError::Document(format!(
                "{} requires a reference transaction id",
                method.element()
            )));
        }
        if self.amount.is_some() && self.currency.is_none() {
            return Err(GatewayError::Document("amount given without currency".to_owned()));
        }
        Ok(())
    }
}

/// Redirect and notification URL of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UrlSlot {
    Success,
    Cancel,
    Error,
    Callback,
}

/// Formats an amount with exactly two fraction digits.
pub(crate) fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> Credential {
        Credential::with_hashed_password("key", "secret", "merchant", "hash")
    }

    fn render(data: &TransactionData, method: TransactionMethod) -> String {
        let bytes = data.render(method, &credential(), Some("sl"), "http://ns/").unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_debit_document() {
        let data = TransactionData::new("order-1")
            .with_amount(Decimal::new(5, 0), "EUR")
            .with_description("Fish & Chips")
            .with_callback_url("https://shop.example/cb")
            .with_extra_data("3dsecure", "MANDATORY")
            .with_indicator(TransactionIndicator::Single);

        let xml = render(&data, TransactionMethod::Debit);
        assert!(xml.contains("<transaction xmlns=\"http://ns/Transaction\">"));
        assert!(xml.contains("<username>merchant</username><password>hash</password><debit>"));
        assert!(xml.contains("<transactionId>order-1</transactionId>"));
        assert!(xml.contains("<extraData key=\"3dsecure\">MANDATORY</extraData>"));
        assert!(xml.contains("<amount>5.00</amount><currency>EUR</currency>"));
        assert!(xml.contains("<description>Fish &amp; Chips</description>"));
        assert!(xml.contains("<transactionIndicator>SINGLE</transactionIndicator></debit>"));
        assert!(xml.ends_with("<language>sl</language></transaction>"));
        assert!(!xml.contains("withRegister"));
    }

    #[test]
    fn test_register_with_customer() {
        let customer = Customer { email: Some("ana@example.com".to_owned()), ..Customer::default() };
        let data = TransactionData::new("reg-1").with_customer(customer).with_register(true);

        let xml = render(&data, TransactionMethod::Preauthorize);
        assert!(xml.contains("<preauthorize>"));
        assert!(xml.contains("<customer><email>ana@example.com</email></customer>"));
        assert!(xml.contains("<withRegister>true</withRegister>"));
    }

    #[test]
    fn test_follow_up_requires_reference() {
        let data = TransactionData::new("cap-1").with_amount(Decimal::new(100, 2), "EUR");
        let err = data.render(TransactionMethod::Capture, &credential(), None, "ns/").unwrap_err();
        assert!(matches!(err, GatewayError::Document(_)));

        let xml = render(&data.with_reference_transaction_id("ref-9"), TransactionMethod::Capture);
        assert!(xml.contains("<referenceTransactionId>ref-9</referenceTransactionId>"));
    }

    #[test]
    fn test_empty_transaction_id_rejected() {
        let data = TransactionData::new("  ");
        assert!(data.render(TransactionMethod::Debit, &credential(), None, "ns/").is_err());
    }

    #[test]
    fn test_amount_without_currency_rejected() {
        let mut data = TransactionData::new("t");
        data.set_amount(Decimal::ONE);
        assert!(data.render(TransactionMethod::Debit, &credential(), None, "ns/").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(Decimal::new(1, 0)), "1.00");
        assert_eq!(format_amount(Decimal::new(12346, 3)), "12.35");
        assert_eq!(format_amount(Decimal::new(995, 2)), "9.95");
    }

    #[test]
    fn test_indicator_round_trip() {
        for indicator in [
            TransactionIndicator::Single,
            TransactionIndicator::Initial,
            TransactionIndicator::Recurring,
            TransactionIndicator::CardOnFile,
            TransactionIndicator::CardOnFileMerchant,
        ] {
            assert_eq!(TransactionIndicator::parse(indicator.as_str()).unwrap(), indicator);
        }
        assert!(TransactionIndicator::parse("WEEKLY").is_err());
    }
}
