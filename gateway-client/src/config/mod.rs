//! Gateway configuration.
//!
//! [`GatewayConfig`] is loaded from TOML and converted into the pieces a
//! [`GatewayClient`](crate::GatewayClient) needs: a [`Credential`], a
//! [`BaseUrl`] and an [`HttpConfig`].
//!
//! ```toml
//! base_url = "https://gateway.bankart.si/"
//! api_key = "merchant-api-key"
//! shared_secret = "merchant-shared-secret"
//! username = "merchant"
//! password = "plaintext, hashed on load"
//! language = "sl"
//!
//! [http]
//! timeout_secs = 30
//! ```
//!
//! The base URL is normally an explicit value of each client. The
//! process-wide override in [`global`] exists for integrations that switch
//! every client between sandbox and production at once.

use std::{fmt, path::Path};

use serde::Deserialize;
use url::Url;

use crate::{
    credential::{Credential, hash_password},
    document::DEFAULT_NAMESPACE_ROOT,
    error::{GatewayError, Result},
    transport::HttpConfig,
};

pub mod global;

/// Production gateway.
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.bankart.si/";

/// Sandbox gateway.
pub const SANDBOX_GATEWAY_URL: &str = "https://bankart.paymentsandbox.cloud/";

/// Placeholder substituted with the api key in profile endpoint paths.
pub const API_KEY_PLACEHOLDER: &str = "[API_KEY]";

/// Gateway endpoint, relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// XML transaction requests.
    Transaction,
    /// XML schedule requests.
    Schedule,
    /// XML status requests.
    Status,
    /// XML options requests.
    Options,
    /// JSON profile lookup.
    GetProfile,
    /// JSON profile update.
    UpdateProfile,
    /// JSON profile deletion.
    DeleteProfile,
}

impl Endpoint {
    /// Path template; profile paths carry [`API_KEY_PLACEHOLDER`].
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Schedule => "schedule",
            Self::Status => "status",
            Self::Options => "options",
            Self::GetProfile => "api/v3/customerProfiles/[API_KEY]/getProfile",
            Self::UpdateProfile => "api/v3/customerProfiles/[API_KEY]/updateProfile",
            Self::DeleteProfile => "api/v3/customerProfiles/[API_KEY]/deleteProfile",
        }
    }

    /// Path with the api key substituted.
    #[must_use]
    pub fn path(self, api_key: &str) -> String {
        self.template().replace(API_KEY_PLACEHOLDER, api_key)
    }

    /// Resolves the endpoint against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if `base` is not a usable URL.
    pub fn resolve(self, base: &str, api_key: &str) -> Result<Url> {
        let base = parse_base_url(base)?;
        base.join(&self.path(api_key)).map_err(|e| {
            GatewayError::Configuration(format!("cannot resolve {}: {e}", self.template()))
        })
    }
}

/// Where a client takes its base URL from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrl {
    /// A URL owned by the client.
    Fixed(String),
    /// The process-wide value of [`global::api_url`], read on every dispatch.
    Global,
}

impl BaseUrl {
    /// Returns the current base URL.
    #[must_use]
    pub fn current(&self) -> String {
        match self {
            Self::Fixed(url) => url.clone(),
            Self::Global => global::api_url(),
        }
    }
}

impl Default for BaseUrl {
    fn default() -> Self {
        Self::Fixed(DEFAULT_GATEWAY_URL.to_owned())
    }
}

/// Parses a base URL, appending the trailing slash relative joins need.
///
/// # Errors
///
/// Returns [`GatewayError::Configuration`] for an empty, unparsable or
/// non-HTTP(S) URL.
pub fn parse_base_url(base: &str) -> Result<Url> {
    let trimmed = base.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::Configuration("gateway URL must not be empty".to_owned()));
    }
    let normalized =
        if trimmed.ends_with('/') { trimmed.to_owned() } else { format!("{trimmed}/") };
    let url = Url::parse(&normalized)
        .map_err(|e| GatewayError::Configuration(format!("invalid gateway URL '{trimmed}': {e}")))?;
    match url.scheme() {
        "https" | "http" => Ok(url),
        other => Err(GatewayError::Configuration(format!(
            "gateway URL must use http or https, got: {other}"
        ))),
    }
}

/// File-backed gateway configuration.
#[derive(Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Merchant api key.
    pub api_key: String,

    /// Shared secret belonging to the api key.
    pub shared_secret: String,

    /// Account username.
    pub username: String,

    /// Plaintext password; hashed when the credential is built.
    #[serde(default)]
    pub password: Option<String>,

    /// Already-hashed password.
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Language sent with transaction requests.
    #[serde(default)]
    pub language: Option<String>,

    /// Namespace root of the XML documents.
    #[serde(default = "default_namespace_root")]
    pub namespace_root: String,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("shared_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("password_hash", &self.password_hash.as_ref().map(|_| "[REDACTED]"))
            .field("language", &self.language)
            .field("namespace_root", &self.namespace_root)
            .field("http", &self.http)
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_GATEWAY_URL.to_owned()
}

fn default_namespace_root() -> String {
    DEFAULT_NAMESPACE_ROOT.to_owned()
}

impl GatewayConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the document does not parse
    /// or fails [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use gateway_client::config::GatewayConfig;
    ///
    /// let config = GatewayConfig::from_toml(
    ///     r#"
    ///     api_key = "key"
    ///     shared_secret = "secret"
    ///     username = "merchant"
    ///     password = "pass"
    /// "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.base_url, "https://gateway.bankart.si/");
    /// ```
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)
            .map_err(|e| GatewayError::Configuration(format!("invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the file cannot be read or
    /// its content is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&source)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] for an invalid base URL, an
    /// empty api key, shared secret or username, a missing or doubly
    /// specified password, or out-of-range HTTP settings.
    pub fn validate(&self) -> Result<()> {
        parse_base_url(&self.base_url)?;
        for (name, value) in [
            ("api_key", &self.api_key),
            ("shared_secret", &self.shared_secret),
            ("username", &self.username),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::Configuration(format!("{name} must not be empty")));
            }
        }
        match (&self.password, &self.password_hash) {
            (Some(_), Some(_)) => {
                return Err(GatewayError::Configuration(
                    "set either password or password_hash, not both".to_owned(),
                ));
            }
            (None, None) => {
                return Err(GatewayError::Configuration(
                    "password or password_hash is required".to_owned(),
                ));
            }
            _ => {}
        }
        self.http.validate()
    }

    /// Builds the credential, hashing a plaintext password.
    #[must_use]
    pub fn credential(&self) -> Credential {
        let hash = match (&self.password_hash, &self.password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(password)) => hash_password(password),
            (None, None) => String::new(),
        };
        Credential::with_hashed_password(
            self.api_key.clone(),
            self.shared_secret.as_bytes(),
            self.username.clone(),
            hash,
        )
    }

    /// Base URL owned by clients built from this configuration.
    #[must_use]
    pub fn base(&self) -> BaseUrl {
        BaseUrl::Fixed(self.base_url.clone())
    }
}
