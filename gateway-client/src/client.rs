//! Gateway client.
//!
//! [`GatewayClient`] owns a credential, a base URL and a [`Transport`]. Every
//! operation is one exchange:
//!
//! 1. render the request document
//! 2. sign it ([`RequestSigner`])
//! 3. send it, recording an exchange trace ([`ExchangeTrace`])
//! 4. classify the response ([`classify`])
//! 5. normalise the body into a typed result
//!
//! Nothing is retried. Failures surface as [`GatewayError`] variants, and
//! [`GatewayError::is_transient`] tells a caller's own retry policy which of
//! them are worth another attempt.

use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use crate::{
    callback::{self, CallbackMessage, Notification},
    config::{BaseUrl, Endpoint, GatewayConfig},
    credential::Credential,
    document::{
        CustomerData, DEFAULT_NAMESPACE_ROOT, OptionsRequest, ScheduleAction, ScheduleData,
        StatusRequest, TransactionData, TransactionMethod,
    },
    error::{GatewayError, Result},
    outcome::classify,
    response::{
        CallbackResult, DeleteProfileResponse, GetProfileResponse, OptionsResult,
        ProfilePayload, ProfileResult, ScheduleResult, StatusResult, TransactionResult,
        UpdateProfileResponse,
    },
    signer::{RequestSigner, SignatureScheme, SignedEnvelope, http_date},
    trace::ExchangeTrace,
    transport::{HttpTransport, OutboundRequest, RawResponse, Transport},
};

/// Client for the gateway's XML and JSON APIs.
///
/// # Examples
///
/// ```rust,no_run
/// use gateway_client::{
///     GatewayClient,
///     config::{BaseUrl, SANDBOX_GATEWAY_URL},
///     credential::Credential,
///     document::TransactionData,
///     response::PaymentResponse,
/// };
/// use rust_decimal::Decimal;
///
/// # async fn example() -> gateway_client::Result<()> {
/// let credential = Credential::new("api-key", "shared-secret", "merchant", "password");
/// let client = GatewayClient::new(credential)
///     .with_base_url(BaseUrl::Fixed(SANDBOX_GATEWAY_URL.to_owned()));
///
/// let data = TransactionData::new("order-42").with_amount(Decimal::new(995, 2), "EUR");
/// let response = PaymentResponse::from(client.debit(&data).await?);
/// if response.is_redirect() {
///     println!("redirect to {:?}", response.redirect_url());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GatewayClient<T: Transport = HttpTransport> {
    credential: Credential,
    base_url: BaseUrl,
    language: Option<String>,
    namespace_root: String,
    transport: T,
}

impl GatewayClient<HttpTransport> {
    /// Creates a client for the production gateway with the default transport.
    #[must_use]
    pub fn new(credential: Credential) -> Self {
        Self::with_transport(credential, HttpTransport::new())
    }

    /// Creates a client from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the configuration is invalid.
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::with_config(&config.http)?;
        let mut client = Self::with_transport(config.credential(), transport)
            .with_base_url(config.base())
            .with_namespace_root(config.namespace_root.clone());
        client.language.clone_from(&config.language);
        Ok(client)
    }
}

impl<T: Transport> GatewayClient<T> {
    /// Creates a client for the production gateway over `transport`.
    #[must_use]
    pub fn with_transport(credential: Credential, transport: T) -> Self {
        Self {
            credential,
            base_url: BaseUrl::default(),
            language: None,
            namespace_root: DEFAULT_NAMESPACE_ROOT.to_owned(),
            transport,
        }
    }

    /// Sets where the base URL comes from.
    #[must_use]
    pub fn with_base_url(mut self, base_url: BaseUrl) -> Self {
        self.base_url = base_url;
        self
    }

    /// Sets the language sent with transaction requests.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the namespace root of rendered XML documents.
    #[must_use]
    pub fn with_namespace_root(mut self, namespace_root: impl Into<String>) -> Self {
        self.namespace_root = namespace_root.into();
        self
    }

    /// Credential used for signing.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Mutable credential, for key rotation.
    pub const fn credential_mut(&mut self) -> &mut Credential {
        &mut self.credential
    }

    /// Base URL source.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Signs `body` for `endpoint`, dated now.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] for an unusable base URL and
    /// [`GatewayError::Signing`] if the digest cannot be computed.
    pub fn sign(
        &self,
        endpoint: Endpoint,
        scheme: SignatureScheme,
        body: Vec<u8>,
    ) -> Result<SignedEnvelope> {
        let url = endpoint.resolve(&self.base_url.current(), self.credential.api_key())?;
        RequestSigner::new(&self.credential).sign(scheme, url, body, http_date(Utc::now()))
    }

    /// Sends a signed envelope once and records the exchange.
    ///
    /// Never fails: a transport failure is reported inside the returned
    /// [`RawResponse`].
    pub async fn send(&self, envelope: &SignedEnvelope) -> RawResponse {
        let trace = ExchangeTrace::for_envelope(envelope);
        let response = self.transport.post(OutboundRequest::from(envelope)).await;
        trace.finish(&response);
        response
    }

    /// Signs, sends and classifies one request.
    ///
    /// # Errors
    ///
    /// Returns the [`GatewayError`] matching a failed classification, or a
    /// signing or configuration error raised before sending.
    #[instrument(skip_all, fields(endpoint = endpoint.template(), scheme = ?scheme))]
    pub async fn dispatch(
        &self,
        endpoint: Endpoint,
        scheme: SignatureScheme,
        body: Vec<u8>,
    ) -> Result<RawResponse> {
        let envelope = self.sign(endpoint, scheme, body)?;
        let response = self.send(&envelope).await;
        classify(response).into_response()
    }

    /// Sends a `transaction` request for `method`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] if `data` does not fit `method`,
    /// any classified exchange failure, or
    /// [`GatewayError::InvalidResponse`] for a body that is not a result
    /// document.
    pub async fn send_transaction(
        &self,
        method: TransactionMethod,
        data: &TransactionData,
    ) -> Result<TransactionResult> {
        let body = data.render(
            method,
            &self.credential,
            self.language.as_deref(),
            &self.namespace_root,
        )?;
        let response = self.dispatch(Endpoint::Transaction, SignatureScheme::XmlV2, body).await?;
        TransactionResult::parse(&response.body)
    }

    /// Stores a payment instrument.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn register(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Register, data).await
    }

    /// Finishes a pending registration.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn complete_register(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::CompleteRegister, data).await
    }

    /// Removes a stored payment instrument.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn deregister(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Deregister, data).await
    }

    /// Reserves funds.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn preauthorize(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Preauthorize, data).await
    }

    /// Finishes a pending preauthorization.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn complete_preauthorize(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::CompletePreauthorize, data).await
    }

    /// Releases a preauthorization.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn void(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Void, data).await
    }

    /// Collects preauthorized funds.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn capture(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Capture, data).await
    }

    /// Returns collected funds.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn refund(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Refund, data).await
    }

    /// Charges immediately.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn debit(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Debit, data).await
    }

    /// Finishes a pending debit.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn complete_debit(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::CompleteDebit, data).await
    }

    /// Pays out to the customer.
    ///
    /// # Errors
    ///
    /// See [`send_transaction`](Self::send_transaction).
    pub async fn payout(&self, data: &TransactionData) -> Result<TransactionResult> {
        self.send_transaction(TransactionMethod::Payout, data).await
    }

    /// Sends a `schedule` request for `action`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] if `data` lacks a field `action`
    /// needs, any classified exchange failure, or
    /// [`GatewayError::InvalidResponse`].
    pub async fn send_schedule(
        &self,
        action: ScheduleAction,
        data: &ScheduleData,
    ) -> Result<ScheduleResult> {
        let body = data.render(action, &self.credential, &self.namespace_root)?;
        let response = self.dispatch(Endpoint::Schedule, SignatureScheme::XmlV2, body).await?;
        ScheduleResult::parse(&response.body)
    }

    /// Creates and starts a schedule.
    ///
    /// # Errors
    ///
    /// See [`send_schedule`](Self::send_schedule).
    pub async fn start_schedule(&self, data: &ScheduleData) -> Result<ScheduleResult> {
        self.send_schedule(ScheduleAction::Start, data).await
    }

    /// Shows a schedule.
    ///
    /// # Errors
    ///
    /// See [`send_schedule`](Self::send_schedule).
    pub async fn show_schedule(&self, data: &ScheduleData) -> Result<ScheduleResult> {
        self.send_schedule(ScheduleAction::Show, data).await
    }

    /// Pauses a schedule.
    ///
    /// # Errors
    ///
    /// See [`send_schedule`](Self::send_schedule).
    pub async fn pause_schedule(&self, data: &ScheduleData) -> Result<ScheduleResult> {
        self.send_schedule(ScheduleAction::Pause, data).await
    }

    /// Resumes a paused schedule.
    ///
    /// # Errors
    ///
    /// See [`send_schedule`](Self::send_schedule).
    pub async fn continue_schedule(&self, data: &ScheduleData) -> Result<ScheduleResult> {
        self.send_schedule(ScheduleAction::Continue, data).await
    }

    /// Cancels a schedule.
    ///
    /// # Errors
    ///
    /// See [`send_schedule`](Self::send_schedule).
    pub async fn cancel_schedule(&self, data: &ScheduleData) -> Result<ScheduleResult> {
        self.send_schedule(ScheduleAction::Cancel, data).await
    }

    /// Looks up the status of a transaction.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Document`] if no identifier is set, any
    /// classified exchange failure, or [`GatewayError::InvalidResponse`].
    pub async fn send_status_request(&self, request: &StatusRequest) -> Result<StatusResult> {
        let body = request.render(&self.credential, &self.namespace_root)?;
        let response = self.dispatch(Endpoint::Status, SignatureScheme::XmlV2, body).await?;
        StatusResult::parse(&response.body)
    }

    /// Looks up an option set.
    ///
    /// Only a transport failure is checked before the body is parsed; any
    /// HTTP status with an options document is returned as such.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the exchange did not complete,
    /// [`GatewayError::Document`] for an empty identifier and
    /// [`GatewayError::InvalidResponse`] if the body is not an options
    /// document.
    pub async fn get_options<I, S>(
        &self,
        identifier: impl Into<String>,
        parameters: I,
    ) -> Result<OptionsResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.send_options_request(&OptionsRequest::new(identifier, parameters)).await
    }

    /// Sends a prepared options request.
    ///
    /// # Errors
    ///
    /// See [`get_options`](Self::get_options).
    #[instrument(skip_all, fields(identifier = %request.identifier))]
    pub async fn send_options_request(&self, request: &OptionsRequest) -> Result<OptionsResult> {
        let body = request.render(&self.credential, &self.namespace_root)?;
        let envelope = self.sign(Endpoint::Options, SignatureScheme::XmlV2, body)?;
        let response = self.send(&envelope).await;
        if let Some(failure) = response.transport_error {
            return Err(GatewayError::Transport { code: failure.code, message: failure.message });
        }
        OptionsResult::parse(&response.body)
    }

    /// Fetches a customer profile by its profile id.
    ///
    /// # Errors
    ///
    /// Returns any classified exchange failure, or
    /// [`GatewayError::InvalidResponse`] for a body that is neither a profile
    /// nor an error payload.
    pub async fn get_profile_by_guid(
        &self,
        profile_guid: &str,
    ) -> Result<ProfileResult<GetProfileResponse>> {
        self.profile_request(Endpoint::GetProfile, &ProfileRequest::guid(profile_guid)).await
    }

    /// Fetches a customer profile by the merchant customer identification.
    ///
    /// # Errors
    ///
    /// See [`get_profile_by_guid`](Self::get_profile_by_guid).
    pub async fn get_profile_by_identification(
        &self,
        customer_identification: &str,
    ) -> Result<ProfileResult<GetProfileResponse>> {
        let request = ProfileRequest::identification(customer_identification);
        self.profile_request(Endpoint::GetProfile, &request).await
    }

    /// Updates a customer profile addressed by its profile id.
    ///
    /// # Errors
    ///
    /// See [`get_profile_by_guid`](Self::get_profile_by_guid).
    pub async fn update_profile_by_guid(
        &self,
        profile_guid: &str,
        customer_data: &CustomerData,
        preferred_instrument: Option<&str>,
    ) -> Result<ProfileResult<UpdateProfileResponse>> {
        let request = ProfileRequest {
            customer_data: Some(customer_data),
            preferred_instrument,
            ..ProfileRequest::guid(profile_guid)
        };
        self.profile_request(Endpoint::UpdateProfile, &request).await
    }

    /// Updates a customer profile addressed by the merchant customer
    /// identification.
    ///
    /// # Errors
    ///
    /// See [`get_profile_by_guid`](Self::get_profile_by_guid).
    pub async fn update_profile_by_identification(
        &self,
        customer_identification: &str,
        customer_data: &CustomerData,
        preferred_instrument: Option<&str>,
    ) -> Result<ProfileResult<UpdateProfileResponse>> {
        let request = ProfileRequest {
            customer_data: Some(customer_data),
            preferred_instrument,
            ..ProfileRequest::identification(customer_identification)
        };
        self.profile_request(Endpoint::UpdateProfile, &request).await
    }

    /// Deletes a customer profile addressed by its profile id.
    ///
    /// # Errors
    ///
    /// See [`get_profile_by_guid`](Self::get_profile_by_guid).
    pub async fn delete_profile_by_guid(
        &self,
        profile_guid: &str,
    ) -> Result<ProfileResult<DeleteProfileResponse>> {
        self.profile_request(Endpoint::DeleteProfile, &ProfileRequest::guid(profile_guid)).await
    }

    /// Deletes a customer profile addressed by the merchant customer
    /// identification.
    ///
    /// # Errors
    ///
    /// See [`get_profile_by_guid`](Self::get_profile_by_guid).
    pub async fn delete_profile_by_identification(
        &self,
        customer_identification: &str,
    ) -> Result<ProfileResult<DeleteProfileResponse>> {
        let request = ProfileRequest::identification(customer_identification);
        self.profile_request(Endpoint::DeleteProfile, &request).await
    }

    async fn profile_request<P: ProfilePayload>(
        &self,
        endpoint: Endpoint,
        request: &ProfileRequest<'_>,
    ) -> Result<ProfileResult<P>> {
        let body = serde_json::to_vec(request)
            .map_err(|e| GatewayError::Document(format!("cannot encode profile request: {e}")))?;
        let response = self.dispatch(endpoint, SignatureScheme::JsonV3, body).await?;
        P::normalize(response.status, &response.body)
    }

    /// Verifies a received callback against this client's credential.
    #[must_use]
    pub fn verify_callback(&self, message: &CallbackMessage) -> bool {
        callback::verify_callback(&self.credential, message)
    }

    /// Decodes a callback body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidResponse`] if the body is not a callback
    /// document.
    pub fn read_callback(&self, body: &[u8]) -> Result<CallbackResult> {
        callback::read_callback(body)
    }

    /// Verifies and decodes a callback.
    #[must_use]
    pub fn accept_notification(&self, message: &CallbackMessage) -> Notification {
        callback::accept_notification(&self.credential, message)
    }
}

/// JSON body of the profile endpoints.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_guid: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_identification: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_data: Option<&'a CustomerData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_instrument: Option<&'a str>,
}

impl<'a> ProfileRequest<'a> {
    fn guid(profile_guid: &'a str) -> Self {
        Self { profile_guid: Some(profile_guid), ..Self::default() }
    }

    fn identification(customer_identification: &'a str) -> Self {
        Self { customer_identification: Some(customer_identification), ..Self::default() }
    }
}
