//! Integration tests for the gateway client.
//!
//! Drives full exchanges over a recording in-memory transport: document
//! rendering, signing, classification and result normalisation.

use std::{
    future::{Future, ready},
    sync::Mutex,
};

use gateway_client::{
    GatewayClient, GatewayError,
    callback::{CallbackMessage, NotificationStatus},
    config::{BaseUrl, global},
    credential::{Credential, hash_password},
    document::{
        Customer, CustomerData, OptionsRequest, PeriodUnit, ScheduleData, StatusRequest,
        TransactionData, TransactionMethod,
    },
    response::{PaymentResponse, ProfileResult, ReturnType, ScheduleStatus, TransactionStatus},
    signer::{CanonicalRequest, SignatureScheme, compute_digest, gateway_authorization},
    transport::{OutboundRequest, RawResponse, Transport},
};
use rust_decimal::Decimal;

const BASE: &str = "https://gateway.test/";

/// What the fake transport saw.
#[derive(Debug, Clone)]
struct Recorded {
    url: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport answering every request with one canned response.
#[derive(Debug)]
struct FakeTransport {
    response: RawResponse,
    requests: Mutex<Vec<Recorded>>,
}

impl FakeTransport {
    fn new(response: RawResponse) -> Self {
        Self { response, requests: Mutex::new(Vec::new()) }
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn post<'a>(
        &'a self,
        request: OutboundRequest<'a>,
    ) -> impl Future<Output = RawResponse> + Send + 'a {
        self.requests.lock().unwrap().push(Recorded {
            url: request.url.to_string(),
            headers: request
                .headers
                .iter()
                .map(|(name, value)| ((*name).to_owned(), value.clone()))
                .collect(),
            body: request.body.to_vec(),
        });
        ready(self.response.clone())
    }
}

fn credential() -> Credential {
    Credential::new("api-key", "shared-secret", "merchant", "password")
}

fn client(response: RawResponse) -> GatewayClient<FakeTransport> {
    GatewayClient::with_transport(credential(), FakeTransport::new(response))
        .with_base_url(BaseUrl::Fixed(BASE.to_owned()))
}

fn ok(body: &str) -> RawResponse {
    RawResponse::new(200, vec![], body.as_bytes().to_vec())
}

const REDIRECT_RESULT: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<result xmlns="http://gateway/Schema/V2/Result">
    <success>true</success>
    <referenceId>123456</referenceId>
    <returnType>REDIRECT</returnType>
    <redirectUrl>http://example.com</redirectUrl>
</result>"#;

#[tokio::test]
async fn test_debit_redirect_flow() {
    let client = client(ok(REDIRECT_RESULT));
    let data = TransactionData::new("order-1")
        .with_amount(Decimal::new(995, 2), "EUR")
        .with_success_url("https://shop.example/ok");

    let result = client.debit(&data).await.expect("redirect result");
    assert!(result.success);
    assert_eq!(result.return_type, ReturnType::Redirect);

    let response = PaymentResponse::from(result);
    assert!(response.is_successful());
    assert!(response.is_redirect());
    assert_eq!(response.redirect_url(), Some("http://example.com"));
    assert_eq!(response.transaction_reference(), Some("123456"));

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.url, "https://gateway.test/transaction");
    assert_eq!(request.header("Content-Type"), Some("text/xml; charset=utf-8"));

    let body = request.body_text();
    assert!(body.contains("<debit><transactionId>order-1</transactionId>"));
    assert!(body.contains("<amount>9.95</amount><currency>EUR</currency>"));
    assert!(body.contains(&format!("<password>{}</password>", hash_password("password"))));
}

#[tokio::test]
async fn test_xml_request_signature_recomputes() {
    let client = client(ok(REDIRECT_RESULT));
    client.register(&TransactionData::new("reg-1")).await.unwrap();

    let requests = client.transport().requests();
    let request = &requests[0];
    let date = request.header("Date").expect("date header");
    assert!(date.ends_with(" GMT"));

    let canonical = CanonicalRequest {
        scheme: SignatureScheme::XmlV2,
        method: "POST",
        content_type: "text/xml; charset=utf-8",
        date,
        path_and_query: "/transaction",
        body: &request.body,
    }
    .canonical_string();
    let digest = compute_digest(b"shared-secret", &canonical).unwrap();

    let expected = gateway_authorization("api-key", &digest);
    assert_eq!(request.header("Authorization"), Some(expected.as_str()));
    assert_eq!(request.header("X-Signature"), None);
}

#[tokio::test]
async fn test_rate_limited_surfaces_headers() {
    let response = RawResponse::new(
        429,
        vec![
            ("X-RateLimit-Limit".to_owned(), "100".to_owned()),
            ("Retry-After".to_owned(), "30".to_owned()),
        ],
        Vec::new(),
    );
    let client = client(response);

    let err = client.debit(&TransactionData::new("order-2")).await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::RateLimited { limit: Some(100), retry_after_secs: Some(30) }
    ));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_failed_exchanges_are_classified() {
    let timeout = client(RawResponse::new(504, vec![], Vec::new()));
    assert!(matches!(
        timeout.send_status_request(&StatusRequest::by_uuid("u")).await,
        Err(GatewayError::Timeout)
    ));

    let server = client(RawResponse::new(503, vec![], br#"{"message":"Maintenance"}"#.to_vec()));
    match server.send_status_request(&StatusRequest::by_uuid("u")).await {
        Err(GatewayError::ServerError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Maintenance");
        }
        other => panic!("expected server error, got {other:?}"),
    }

    let dropped = client(RawResponse::failed("connect", "connection refused"));
    assert!(matches!(
        dropped.send_status_request(&StatusRequest::by_uuid("u")).await,
        Err(GatewayError::Transport { code, .. }) if code == "connect"
    ));
}

#[tokio::test]
async fn test_unparsable_body_is_invalid_response() {
    let client = client(ok("<html>maintenance</html>"));
    let err = client.debit(&TransactionData::new("order-3")).await.unwrap_err();
    match err {
        GatewayError::InvalidResponse { body, .. } => assert_eq!(body, "<html>maintenance</html>"),
        other => panic!("expected invalid response, got {other:?}"),
    }
}

#[tokio::test]
async fn test_document_errors_do_not_dispatch() {
    let client = client(ok(REDIRECT_RESULT));
    let capture = TransactionData::new("cap-1").with_amount(Decimal::ONE, "EUR");

    assert!(matches!(client.capture(&capture).await, Err(GatewayError::Document(_))));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_status_request() {
    let client = client(ok(r#"<statusResult>
        <operationSuccess>true</operationSuccess>
        <transactionStatus>SUCCESS</transactionStatus>
        <transactionUuid>uuid-1</transactionUuid>
        <merchantTransactionId>order-1</merchantTransactionId>
        <transactionType>DEBIT</transactionType>
        <amount>9.95</amount>
        <currency>EUR</currency>
    </statusResult>"#));

    let status = client
        .send_status_request(&StatusRequest::by_merchant_transaction_id("order-1"))
        .await
        .unwrap();
    assert!(status.operation_success);
    assert_eq!(status.transaction_status, Some(TransactionStatus::Success));
    assert_eq!(status.amount, Some(Decimal::new(995, 2)));

    let requests = client.transport().requests();
    let request = &requests[0];
    assert_eq!(request.url, "https://gateway.test/status");
    assert!(request.body_text().contains("<merchantTransactionId>order-1</merchantTransactionId>"));
}

#[tokio::test]
async fn test_schedule_start() {
    let client = client(ok(r"<scheduleResult>
        <operationSuccess>true</operationSuccess>
        <scheduleId>SC-1</scheduleId>
        <newStatus>ACTIVE</newStatus>
    </scheduleResult>"));

    let data = ScheduleData::start("reg-1", Decimal::new(1000, 2), "EUR", 1, PeriodUnit::Month);
    let result = client.start_schedule(&data).await.unwrap();
    assert!(result.operation_success);
    assert_eq!(result.schedule_id.as_deref(), Some("SC-1"));
    assert_eq!(result.new_status, Some(ScheduleStatus::Active));

    let requests = client.transport().requests();
    let request = &requests[0];
    assert_eq!(request.url, "https://gateway.test/schedule");
    assert!(request.body_text().contains("<startSchedule>"));
}

#[tokio::test]
async fn test_options_ignore_http_status() {
    let client = client(RawResponse::new(
        500,
        vec![],
        br#"<optionsResult><success>true</success>
            <options><option key="SI">Slovenia</option></options></optionsResult>"#
            .to_vec(),
    ));

    let options = client.get_options("countries", ["EU"]).await.unwrap();
    assert!(options.success);
    assert_eq!(options.get("SI"), Some("Slovenia"));

    let dropped = GatewayClient::with_transport(
        credential(),
        FakeTransport::new(RawResponse::failed("timeout", "deadline elapsed")),
    )
    .with_base_url(BaseUrl::Fixed(BASE.to_owned()));
    assert!(matches!(
        dropped.send_options_request(&OptionsRequest::new("countries", Vec::<String>::new())).await,
        Err(GatewayError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_profile_requests_use_json_signing() {
    let client = client(ok(r#"{"success":true,"profileExists":true,"profileGuid":"PG-1"}"#));

    let profile = client.get_profile_by_guid("PG-1").await.unwrap().profile().unwrap();
    assert!(profile.exists());
    assert_eq!(profile.profile_guid.as_deref(), Some("PG-1"));

    let requests = client.transport().requests();
    let request = &requests[0];
    assert_eq!(request.url, "https://gateway.test/api/v3/customerProfiles/api-key/getProfile");
    assert_eq!(request.header("Content-Type"), Some("application/json; charset=utf-8"));
    assert_eq!(request.body_text(), r#"{"profileGuid":"PG-1"}"#);
    assert!(request.header("Authorization").unwrap().starts_with("Basic "));

    let canonical = CanonicalRequest {
        scheme: SignatureScheme::JsonV3,
        method: "POST",
        content_type: "application/json; charset=utf-8",
        date: request.header("Date").unwrap(),
        path_and_query: "/api/v3/customerProfiles/api-key/getProfile",
        body: &request.body,
    }
    .canonical_string();
    assert_eq!(
        request.header("X-Signature"),
        Some(compute_digest(b"shared-secret", &canonical).unwrap().as_str())
    );
}

#[tokio::test]
async fn test_profile_negative_lookup_versus_error() {
    let body = r#"{"success":false,"profileExists":false}"#;

    let lookup = client(ok(body)).get_profile_by_identification("cust-1").await.unwrap();
    match lookup {
        ProfileResult::Profile(profile) => assert!(!profile.exists()),
        ProfileResult::Error(error) => panic!("expected profile, got {error:?}"),
    }

    let customer = CustomerData::new(Customer {
        email: Some("ana@example.com".to_owned()),
        ..Customer::default()
    });
    let update = client(ok(body))
        .update_profile_by_identification("cust-1", &customer, None)
        .await
        .unwrap();
    assert!(update.is_error());
}

#[tokio::test]
async fn test_profile_error_payload() {
    let client = client(RawResponse::new(
        400,
        vec![],
        br#"{"success":false,"errorMessage":"Unknown profile","errorCode":1004}"#.to_vec(),
    ));

    match client.delete_profile_by_guid("PG-404").await.unwrap() {
        ProfileResult::Error(error) => {
            assert_eq!(error.error_message.as_deref(), Some("Unknown profile"));
            assert_eq!(error.error_code, Some(1004));
        }
        ProfileResult::Profile(profile) => panic!("expected error, got {profile:?}"),
    }
}

#[tokio::test]
async fn test_profile_rejects_non_object_body() {
    let client = client(ok("[1,2,3]"));
    assert!(matches!(
        client.delete_profile_by_identification("cust-1").await,
        Err(GatewayError::InvalidResponse { .. })
    ));
}

#[tokio::test]
async fn test_global_base_url_is_read_per_dispatch() {
    let client = GatewayClient::with_transport(credential(), FakeTransport::new(ok(REDIRECT_RESULT)))
        .with_base_url(BaseUrl::Global);

    global::set_api_url("https://bankart.paymentsandbox.cloud").unwrap();
    client.send_transaction(TransactionMethod::Debit, &TransactionData::new("a")).await.unwrap();

    global::reset_api_url();
    client.send_transaction(TransactionMethod::Debit, &TransactionData::new("b")).await.unwrap();

    let urls: Vec<String> = client.transport().requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        ["https://bankart.paymentsandbox.cloud/transaction", "https://gateway.bankart.si/transaction"]
    );
}

#[test]
fn test_callback_verification_through_client() {
    let client = client(ok(""));
    let date = "Tue, 01 Jan 2030 00:00:00 GMT";
    let body = b"<callback><result>OK</result><referenceId>ref-42</referenceId></callback>".to_vec();

    let canonical = CanonicalRequest {
        scheme: SignatureScheme::XmlV2,
        method: "POST",
        content_type: "text/xml; charset=utf-8",
        date,
        path_and_query: "/callback?id=42",
        body: &body,
    }
    .canonical_string();
    let authorization =
        gateway_authorization("api-key", &compute_digest(b"shared-secret", &canonical).unwrap());

    let message = CallbackMessage::from_headers(
        body.clone(),
        "/callback?id=42",
        &[("Date", date), ("Authorization", authorization.as_str())],
    );
    assert!(client.verify_callback(&message));

    let notification = client.accept_notification(&message);
    assert_eq!(notification.status(), NotificationStatus::Completed);
    assert_eq!(notification.transaction_reference(), Some("ref-42"));

    let mut tampered = message;
    tampered.body = b"<callback><result>OK</result><referenceId>ref-43</referenceId></callback>".to_vec();
    assert!(!client.verify_callback(&tampered));
    assert_eq!(client.accept_notification(&tampered).status(), NotificationStatus::Failed);
}
