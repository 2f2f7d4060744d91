//! Basic checkout example: a debit against the sandbox gateway.
//!
//! # Running this example
//!
//! ```bash
//! export GATEWAY_API_KEY=<api key>
//! export GATEWAY_SHARED_SECRET=<shared secret>
//! export GATEWAY_USERNAME=<api user>
//! export GATEWAY_PASSWORD=<api password>
//! cargo run --example basic_checkout
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::uninlined_format_args,
    reason = "examples are allowed to use println and simple formatting"
)]

use std::env;

use gateway_client::{
    GatewayClient,
    config::{BaseUrl, SANDBOX_GATEWAY_URL},
    credential::Credential,
    document::{Customer, TransactionData},
    response::PaymentResponse,
};
use rust_decimal::Decimal;

fn env_var(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    env::var(name).map_err(|_| format!("{name} environment variable not set").into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("gateway::exchange=debug,info").init();

    println!("Gateway Client: Basic Checkout Example\n");

    println!("1. Loading credentials from environment...");
    let credential = Credential::new(
        env_var("GATEWAY_API_KEY")?,
        env_var("GATEWAY_SHARED_SECRET")?,
        env_var("GATEWAY_USERNAME")?,
        &env_var("GATEWAY_PASSWORD")?,
    );
    let client = GatewayClient::new(credential)
        .with_base_url(BaseUrl::Fixed(SANDBOX_GATEWAY_URL.to_owned()))
        .with_language("en");

    println!("2. Preparing debit...");
    let order_id = format!("example-{}", uuid::Uuid::new_v4());
    let data = TransactionData::new(&order_id)
        .with_amount(Decimal::new(1999, 2), "EUR")
        .with_description("Example order")
        .with_success_url("https://shop.example/checkout/success")
        .with_cancel_url("https://shop.example/checkout/cancel")
        .with_error_url("https://shop.example/checkout/error")
        .with_callback_url("https://shop.example/gateway/callback")
        .with_customer(Customer {
            first_name: Some("Ana".to_owned()),
            last_name: Some("Novak".to_owned()),
            email: Some("ana@example.com".to_owned()),
            billing_country: Some("SI".to_owned()),
            ..Customer::default()
        });

    println!("3. Sending debit {order_id}...");
    match client.debit(&data).await {
        Ok(result) => {
            let response = PaymentResponse::from(result);
            println!("   successful: {}", response.is_successful());
            println!("   reference:  {:?}", response.transaction_reference());
            if let Some(url) = response.redirect_url() {
                println!("   redirect the customer to {url}");
            }
            if let Some(message) = response.message() {
                println!("   gateway error {}: {message}", response.code());
            }
        }
        Err(e) if e.is_transient() => eprintln!("   gateway unavailable, try later: {e}"),
        Err(e) => eprintln!("   debit failed: {e}"),
    }

    Ok(())
}
