//! Callback verification example.
//!
//! Signs a callback the way the gateway does, then accepts it and shows that
//! a tampered copy is rejected. Runs offline.
//!
//! ```bash
//! cargo run --example verify_callback
//! ```

#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    reason = "examples are allowed to use println and unwrap"
)]

use chrono::Utc;
use gateway_client::{
    callback::{CallbackMessage, accept_notification, verify_callback},
    credential::Credential,
    signer::{CanonicalRequest, SignatureScheme, compute_digest, gateway_authorization, http_date},
};

fn main() {
    let credential = Credential::new("api-key", "shared-secret", "merchant", "password");

    let body = br#"<?xml version="1.0" encoding="utf-8"?>
<callback xmlns="http://gateway.bankart.si/Schema/V2/Callback">
    <result>OK</result>
    <referenceId>8c4b0b7e2f</referenceId>
    <transactionId>order-1001</transactionId>
    <transactionType>DEBIT</transactionType>
    <amount>19.99</amount>
    <currency>EUR</currency>
</callback>"#
        .to_vec();
    let path = "/gateway/callback?order=1001";
    let date = http_date(Utc::now());

    let canonical = CanonicalRequest {
        scheme: SignatureScheme::XmlV2,
        method: "POST",
        content_type: SignatureScheme::XmlV2.content_type(),
        date: &date,
        path_and_query: path,
        body: &body,
    }
    .canonical_string();
    let authorization = gateway_authorization(
        credential.api_key(),
        &compute_digest(credential.shared_secret().expose(), &canonical).unwrap(),
    );

    let message = CallbackMessage::from_headers(
        body,
        path,
        &[("Date", date.as_str()), ("Authorization", authorization.as_str())],
    );

    let notification = accept_notification(&credential, &message);
    println!("status:      {:?}", notification.status());
    println!("reference:   {:?}", notification.transaction_reference());
    println!("transaction: {:?}", notification.transaction_id());

    let mut tampered = message;
    tampered.body = tampered.body.iter().map(|b| if *b == b'9' { b'8' } else { *b }).collect();
    println!("tampered copy verifies: {}", verify_callback(&credential, &tampered));
}
