//! Canonical request signing.
//!
//! The gateway authenticates every request with a keyed digest over a
//! canonical string built from the request method, a hash of the body, the
//! content type, the `Date` header and the path plus query. The same routine
//! runs in reverse for inbound callbacks, see [`crate::callback`].
//!
//! # Canonical String
//!
//! XML API (v2):
//!
//! ```text
//! POST
//! <md5 hex of body>
//! text/xml; charset=utf-8
//! Tue, 01 Jan 2030 00:00:00 GMT
//! <empty line reserved for extra headers>
//! /transaction
//! ```
//!
//! JSON API (v3) omits the extra-header line and hashes the body with SHA-512.
//! The digest is `base64(HMAC-SHA512(shared_secret, canonical_string))`.
//!
//! # Examples
//!
//! ```
//! use gateway_client::signer::{CanonicalRequest, SignatureScheme, compute_digest};
//!
//! let request = CanonicalRequest {
//!     scheme: SignatureScheme::XmlV2,
//!     method: "POST",
//!     content_type: SignatureScheme::XmlV2.content_type(),
//!     date: "Tue, 01 Jan 2030 00:00:00 GMT",
//!     path_and_query: "/callback?id=42",
//!     body: b"<callback/>",
//! };
//!
//! let first = compute_digest(b"secret", &request.canonical_string()).unwrap();
//! let second = compute_digest(b"secret", &request.canonical_string()).unwrap();
//! assert_eq!(first, second);
//! ```

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::Md5;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use tracing::instrument;
use url::Url;

use crate::{
    credential::Credential,
    error::{GatewayError, Result},
};


type HmacSha512 = Hmac<Sha512>;

/// Content type of XML API requests and callbacks.
pub const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Content type of JSON API requests.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// `Date` header layout (IMF-fixdate, always GMT).
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Prefix of the authorization value on XML requests and callbacks.
pub const GATEWAY_AUTH_PREFIX: &str = "Gateway ";

/// Canonicalisation rules of a gateway API generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// XML API: MD5 body hash and an empty extra-header line.
    XmlV2,
    /// JSON API: SHA-512 body hash and no extra-header line.
    JsonV3,
}

impl SignatureScheme {
    /// Content type sent with this scheme.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::XmlV2 => XML_CONTENT_TYPE,
            Self::JsonV3 => JSON_CONTENT_TYPE,
        }
    }

    /// Lowercase hex hash of the body as it appears in the canonical string.
    #[must_use]
    pub fn body_hash(self, body: &[u8]) -> String {
        match self {
            Self::XmlV2 => hex::encode(Md5::digest(body)),
            Self::JsonV3 => hex::encode(Sha512::digest(body)),
        }
    }
}

/// Already-canonicalised fields covered by the digest.
///
/// Callers are responsible for supplying the exact header values that go on
/// the wire; no trimming or case folding happens here.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalRequest<'a> {
    /// API generation.
    pub scheme: SignatureScheme,
    /// Upper-case HTTP method.
    pub method: &'a str,
    /// `Content-Type` header value.
    pub content_type: &'a str,
    /// `Date` header value.
    pub date: &'a str,
    /// Request path including the query string, if any.
    pub path_and_query: &'a str,
    /// Raw request body.
    pub body: &'a [u8],
}

impl CanonicalRequest<'_> {
    /// Builds the newline-joined string the digest is computed over.
    #[must_use]
    pub fn canonical_string(&self) -> String {
        let body_hash = self.scheme.body_hash(self.body);
        match self.scheme {
            SignatureScheme::XmlV2 => [
                self.method,
                body_hash.as_str(),
                self.content_type,
                self.date,
                "",
                self.path_and_query,
            ]
            .join("\n"),
            SignatureScheme::JsonV3 => [
                self.method,
                body_hash.as_str(),
                self.content_type,
                self.date,
                self.path_and_query,
            ]
            .join("\n"),
        }
    }
}

/// Computes `base64(HMAC-SHA512(secret, canonical))`.
///
/// # Errors
///
/// Returns [`GatewayError::Signing`] if the MAC cannot be keyed.
pub fn compute_digest(secret: &[u8], canonical: &str) -> Result<String> {
    let mut mac = HmacSha512::new_from_slice(secret)
        .map_err(|e| GatewayError::Signing(format!("invalid shared secret: {e}")))?;
    mac.update(canonical.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Formats a timestamp as a `Date` header value.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use gateway_client::signer::http_date;
///
/// let at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
/// assert_eq!(http_date(at), "Tue, 01 Jan 2030 00:00:00 GMT");
/// ```
#[must_use]
pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

/// Extracts the signed target (`path` or `path?query`) from a URL.
#[must_use]
pub fn path_and_query(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_owned(),
    }
}

/// Builds the authorization value `Gateway <api_key>:<digest>`.
#[must_use]
pub fn gateway_authorization(api_key: &str, digest: &str) -> String {
    format!("{GATEWAY_AUTH_PREFIX}{api_key}:{digest}")
}

/// Compares two authorization values in constant time.
///
/// Values of different length compare unequal without inspecting content.
#[must_use]
pub fn verify_authorization(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// A fully signed outbound request.
///
/// Created per request and discarded after dispatch.
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    /// API generation the envelope was signed for.
    pub scheme: SignatureScheme,
    /// HTTP method.
    pub method: &'static str,
    /// Absolute target URL.
    pub url: Url,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// `Date` header value.
    pub date: String,
    /// Request body.
    pub body: Vec<u8>,
    /// Base64 keyed digest.
    pub digest: String,
    /// `Authorization` header value.
    ///
    /// `Gateway <api_key>:<digest>` for XML requests. JSON requests carry the
    /// digest in `X-Signature` and authenticate the account with HTTP Basic.
    pub authorization: String,
}

impl SignedEnvelope {
    /// Returns the headers to attach, in wire order.
    #[must_use]
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Date", self.date.clone()),
            ("Content-Type", self.content_type.to_owned()),
            ("Authorization", self.authorization.clone()),
        ];
        if self.scheme == SignatureScheme::JsonV3 {
            headers.push(("X-Signature", self.digest.clone()));
        }
        headers
    }
}

/// Signs outbound requests with a merchant credential.
#[derive(Debug, Clone, Copy)]
pub struct RequestSigner<'a> {
    credential: &'a Credential,
}

impl<'a> RequestSigner<'a> {
    /// Creates a signer borrowing `credential`.
    #[must_use]
    pub const fn new(credential: &'a Credential) -> Self {
        Self { credential }
    }

    /// Signs a `POST` request for `scheme`.
    ///
    /// `date` must already be formatted with [`http_date`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Signing`] if the digest cannot be computed.
    #[instrument(skip_all, fields(scheme = ?scheme, path = url.path(), body_len = body.len()))]
    pub fn sign(
        &self,
        scheme: SignatureScheme,
        url: Url,
        body: Vec<u8>,
        date: String,
    ) -> Result<SignedEnvelope> {
        let target = path_and_query(&url);
        let content_type = scheme.content_type();
        let canonical = CanonicalRequest {
            scheme,
            method: "POST",
            content_type,
            date: &date,
            path_and_query: &target,
            body: &body,
        }
        .canonical_string();

        let digest = compute_digest(self.credential.shared_secret().expose(), &canonical)?;
        let authorization = match scheme {
            SignatureScheme::XmlV2 => gateway_authorization(self.credential.api_key(), &digest),
            SignatureScheme::JsonV3 => basic_authorization(
                self.credential.username(),
                self.credential.password_hash(),
            ),
        };

        Ok(SignedEnvelope {
            scheme,
            method: "POST",
            url,
            content_type,
            date,
            body,
            digest,
            authorization,
        })
    }
}

fn basic_authorization(username: &str, password_hash: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password_hash}")))
}
