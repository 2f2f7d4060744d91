//! Structured trace records of gateway exchanges.
//!
//! Every dispatch emits one record for the outbound request and one for the
//! inbound response under the `gateway::exchange` target, correlated by a
//! request id. Summaries are logged at `info`; bodies only at `debug`, and
//! only after [`redact_body`].
//!
//! Authorization and signature headers and the shared secret are never part
//! of a record.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::{signer::SignedEnvelope, transport::RawResponse};

/// Tracing target of exchange records.
pub const EXCHANGE_TARGET: &str = "gateway::exchange";

const MASK: &str = "[REDACTED]";

/// One in-flight exchange.
///
/// # Examples
///
/// ```
/// use gateway_client::{trace::ExchangeTrace, transport::RawResponse};
///
/// let trace = ExchangeTrace::start("POST", "https://gateway.example/transaction", "text/xml", b"<x/>");
/// trace.finish(&RawResponse::new(200, vec![], b"<result/>".to_vec()));
/// ```
#[derive(Debug)]
pub struct ExchangeTrace {
    request_id: Uuid,
    started: Instant,
}

impl ExchangeTrace {
    /// Records the outbound request and starts the clock.
    #[must_use]
    pub fn start(method: &str, url: &str, content_type: &str, body: &[u8]) -> Self {
        let request_id = Uuid::new_v4();
        tracing::info!(
            target: "gateway::exchange",
            request_id = %request_id,
            method,
            url,
            content_type,
            body_len = body.len(),
            "outbound request"
        );
        tracing::debug!(
            target: "gateway::exchange",
            request_id = %request_id,
            body = %redact_body(&String::from_utf8_lossy(body)),
            "outbound body"
        );
        Self { request_id, started: Instant::now() }
    }

    /// Records the outbound request of a signed envelope.
    #[must_use]
    pub fn for_envelope(envelope: &SignedEnvelope) -> Self {
        Self::start(envelope.method, envelope.url.as_str(), envelope.content_type, &envelope.body)
    }

    /// Correlation id of the exchange.
    #[must_use]
    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Time since the request was recorded.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Records the inbound response.
    #[allow(clippy::cast_possible_truncation, reason = "exchange durations fit u64 milliseconds")]
    pub fn finish(self, response: &RawResponse) {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        match &response.transport_error {
            Some(failure) => tracing::warn!(
                target: "gateway::exchange",
                request_id = %self.request_id,
                code = %failure.code,
                message = %redact_body(&failure.message),
                duration_ms,
                "exchange failed"
            ),
            None => {
                tracing::info!(
                    target: "gateway::exchange",
                    request_id = %self.request_id,
                    status = response.status,
                    body_len = response.body.len(),
                    duration_ms,
                    "inbound response"
                );
                tracing::debug!(
                    target: "gateway::exchange",
                    request_id = %self.request_id,
                    body = %redact_body(&response.body_text()),
                    "inbound body"
                );
            }
        }
    }
}

/// Masks credentials and card numbers in a request or response body.
///
/// - the content of `<password>` elements
/// - the string value of JSON `"password"` members
/// - runs of 13 to 19 digits, optionally grouped by single spaces or dashes,
///   except the last four digits
///
/// # Examples
///
/// ```
/// use gateway_client::trace::redact_body;
///
/// let xml = "<username>shop</username><password>5baa61e4</password>";
/// assert_eq!(redact_body(xml), "<username>shop</username><password>[REDACTED]</password>");
///
/// assert_eq!(redact_body("card 4111 1111 1111 1111"), "card XXXX XXXX XXXX 1111");
/// ```
#[must_use]
pub fn redact_body(body: &str) -> String {
    let masked = mask_xml_element(body, "password");
    let masked = mask_json_member(&masked, "password");
    mask_card_numbers(&masked)
}

fn mask_xml_element(input: &str, name: &str) -> String {
    let open = format!("<{name}>");
    let close = format!("</{name}>");
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(&open) {
        let content_start = start + open.len();
        let Some(length) = rest[content_start..].find(&close) else {
            break;
        };
        output.push_str(&rest[..content_start]);
        output.push_str(MASK);
        rest = &rest[content_start + length..];
    }
    output.push_str(rest);
    output
}

fn mask_json_member(input: &str, name: &str) -> String {
    let key = format!("\"{name}\"");
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(&key) {
        let after_key = start + key.len();
        output.push_str(&rest[..after_key]);
        rest = &rest[after_key..];

        let Some(value_start) = string_value_start(rest) else {
            continue;
        };
        let Some(value_len) = string_value_len(&rest[value_start..]) else {
            break;
        };
        output.push_str(&rest[..value_start]);
        output.push_str(MASK);
        rest = &rest[value_start + value_len..];
    }
    output.push_str(rest);
    output
}

/// Offset just past the opening quote of `: "value"`.
fn string_value_start(text: &str) -> Option<usize> {
    let after_ws = text.len() - text.trim_start().len();
    let text_after = &text[after_ws..];
    let rest = text_after.strip_prefix(':')?;
    let inner_ws = rest.len() - rest.trim_start().len();
    rest[inner_ws..].starts_with('"').then_some(after_ws + 1 + inner_ws + 1)
}

/// Length of a JSON string body up to, not including, its closing quote.
fn string_value_len(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (index, ch) in text.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(index),
            _ => {}
        }
    }
    None
}

fn mask_card_numbers(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut output = String::with_capacity(input.len());
    let mut index = 0;

    while index < chars.len() {
        if !chars[index].is_ascii_digit() || (index > 0 && chars[index - 1].is_ascii_digit()) {
            output.push(chars[index]);
            index += 1;
            continue;
        }

        let end = digit_run_end(&chars, index);
        let digits = chars[index..end].iter().filter(|c| c.is_ascii_digit()).count();
        if (13..=19).contains(&digits) {
            let mut remaining = digits;
            for &ch in &chars[index..end] {
                if ch.is_ascii_digit() {
                    output.push(if remaining > 4 { 'X' } else { ch });
                    remaining -= 1;
                } else {
                    output.push(ch);
                }
            }
        } else {
            output.extend(&chars[index..end]);
        }
        index = end;
    }
    output
}

/// End of a digit run that may contain single space or dash separators.
fn digit_run_end(chars: &[char], start: usize) -> usize {
    let mut end = start;
    let mut index = start;
    while index < chars.len() {
        let ch = chars[index];
        if ch.is_ascii_digit() {
            index += 1;
            end = index;
        } else if (ch == ' ' || ch == '-')
            && chars.get(index + 1).is_some_and(char::is_ascii_digit)
            && index > start
            && chars[index - 1].is_ascii_digit()
        {
            index += 1;
        } else {
            break;
        }
    }
    end
}
