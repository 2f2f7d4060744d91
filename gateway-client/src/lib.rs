//! Bankart Gateway Client: Signed Requests for a Card Payment Gateway
//!
//! A Rust library for merchants integrating with a Bankart/IXOPAY-style
//! payment gateway. It renders request documents, signs them with the
//! merchant's shared secret, sends them, classifies what came back and turns
//! the body into typed results. It also verifies the signed callbacks the
//! gateway posts back.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    Merchant      │  checkout, back office, schedulers
//! └────────┬─────────┘
//!          │ TransactionData / ScheduleData / StatusRequest / profiles
//! ┌────────▼──────────────────────────────────────────────┐
//! │               GatewayClient (this crate)              │
//! │  document ─► signer ─► transport ─► outcome ─► response│
//! │                          │                            │
//! │                        trace                          │
//! └────────┬──────────────────────────────────────▲───────┘
//!          │ HTTPS, Authorization: Gateway key:digest │ signed callback
//! ┌────────▼──────────────────────────────────────┴───────┐
//! │                   Payment gateway                     │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## 1. Charge a customer
//!
//! ```rust,no_run
//! use gateway_client::{
//!     GatewayClient,
//!     credential::Credential,
//!     document::TransactionData,
//!     response::PaymentResponse,
//! };
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> gateway_client::Result<()> {
//! let credential = Credential::new("api-key", "shared-secret", "merchant", "password");
//! let client = GatewayClient::new(credential);
//!
//! let data = TransactionData::new("order-1001")
//!     .with_amount(Decimal::new(4999, 2), "EUR")
//!     .with_success_url("https://shop.example/ok")
//!     .with_callback_url("https://shop.example/callback");
//!
//! let response = PaymentResponse::from(client.debit(&data).await?);
//! if let Some(url) = response.redirect_url() {
//!     println!("send the customer to {url}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## 2. Verify a callback
//!
//! ```rust
//! use gateway_client::{callback::CallbackMessage, credential::Credential, GatewayClient};
//!
//! let client = GatewayClient::new(Credential::new("api-key", "secret", "merchant", "pw"));
//! let message = CallbackMessage::from_headers(
//!     b"<callback/>".to_vec(),
//!     "/callback",
//!     &[("Date", "Tue, 01 Jan 2030 00:00:00 GMT")],
//! );
//! assert!(!client.verify_callback(&message));
//! ```
//!
//! # Error Handling
//!
//! ```rust,no_run
//! use gateway_client::{GatewayClient, GatewayError, document::StatusRequest};
//! # async fn example(client: GatewayClient) {
//! match client.send_status_request(&StatusRequest::by_uuid("abc")).await {
//!     Ok(status) => println!("{:?}", status.transaction_status),
//!     Err(GatewayError::RateLimited { retry_after_secs, .. }) => {
//!         eprintln!("rate limited, retry after {retry_after_secs:?}s");
//!     }
//!     Err(e) if e.is_transient() => eprintln!("try again later: {e}"),
//!     Err(e) => eprintln!("request failed: {e}"),
//! }
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and wiremock"
)]

pub mod callback;
pub mod client;
pub mod config;
pub mod credential;
pub mod document;
pub mod error;
pub mod outcome;
pub mod response;
pub mod signer;
pub mod trace;
pub mod transport;

pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use credential::Credential;
pub use error::{GatewayError, Result};
