//! Merchant credentials.
//!
//! A [`Credential`] bundles everything needed to authenticate with the
//! gateway: the api key and shared secret used for request signing, and the
//! account username and hashed password embedded in request documents.

use std::fmt;

use sha1::{Digest, Sha1};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Number of SHA-1 rounds applied to a plaintext password.
pub const PASSWORD_HASH_ROUNDS: usize = 10;

/// Shared signing secret, wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wraps raw secret bytes.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw secret bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Returns true if the secret has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// Merchant credential set.
///
/// Immutable in normal use; the setters exist for explicit key rotation.
///
/// # Examples
///
/// ```
/// use gateway_client::credential::{Credential, hash_password};
///
/// let credential = Credential::new("api-key", "shared-secret", "merchant", "s3cret");
/// assert_eq!(credential.password_hash(), hash_password("s3cret"));
/// ```
#[derive(Clone)]
pub struct Credential {
    api_key: String,
    shared_secret: SharedSecret,
    username: String,
    password_hash: String,
}

impl Credential {
    /// Creates a credential, hashing the plaintext `password`.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        shared_secret: impl Into<Vec<u8>>,
        username: impl Into<String>,
        password: &str,
    ) -> Self {
        Self::with_hashed_password(api_key, shared_secret, username, hash_password(password))
    }

    /// Creates a credential from a password that is already hashed.
    #[must_use]
    pub fn with_hashed_password(
        api_key: impl Into<String>,
        shared_secret: impl Into<Vec<u8>>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            shared_secret: SharedSecret::new(shared_secret),
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    /// Merchant api key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Shared signing secret.
    #[must_use]
    pub const fn shared_secret(&self) -> &SharedSecret {
        &self.shared_secret
    }

    /// Account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Hashed account password, as sent to the gateway.
    #[must_use]
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Replaces the api key.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    /// Replaces the shared secret.
    pub fn set_shared_secret(&mut self, shared_secret: impl Into<Vec<u8>>) {
        self.shared_secret = SharedSecret::new(shared_secret);
    }

    /// Replaces the username.
    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
    }

    /// Replaces the password, hashing the plaintext.
    pub fn set_password(&mut self, password: &str) {
        self.password_hash = hash_password(password);
    }

    /// Replaces the password with an already hashed value.
    pub fn set_hashed_password(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key)
            .field("shared_secret", &self.shared_secret)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Hashes a plaintext password the way the gateway expects.
///
/// Applies [`PASSWORD_HASH_ROUNDS`] rounds of SHA-1, each round hashing the
/// lowercase hex digest produced by the previous one.
///
/// # Examples
///
/// ```
/// use gateway_client::credential::hash_password;
///
/// let hash = hash_password("password");
/// assert_eq!(hash.len(), 40);
/// assert_eq!(hash, hash_password("password"));
/// ```
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut current = password.to_owned();
    for _ in 0..PASSWORD_HASH_ROUNDS {
        current = hex::encode(Sha1::digest(current.as_bytes()));
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_single_round_reference() {
        // sha1("abc")
        assert_eq!(
            hex::encode(Sha1::digest(b"abc")),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_hash_password_applies_ten_rounds() {
        let mut expected = "abc".to_owned();
        for _ in 0..10 {
            expected = hex::encode(Sha1::digest(expected.as_bytes()));
        }
        assert_eq!(hash_password("abc"), expected);
        assert_ne!(hash_password("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_hashed_password_is_not_rehashed() {
        let credential = Credential::with_hashed_password("key", "secret", "user", "deadbeef");
        assert_eq!(credential.password_hash(), "deadbeef");
    }

    #[test]
    fn test_rotation_setters() {
        let mut credential = Credential::new("key", "secret", "user", "pw");
        credential.set_api_key("key-2");
        credential.set_shared_secret("secret-2");
        credential.set_username("user-2");
        credential.set_password("pw-2");

        assert_eq!(credential.api_key(), "key-2");
        assert_eq!(credential.shared_secret().expose(), b"secret-2");
        assert_eq!(credential.username(), "user-2");
        assert_eq!(credential.password_hash(), hash_password("pw-2"));

        credential.set_hashed_password("abcd");
        assert_eq!(credential.password_hash(), "abcd");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = Credential::new("key", "top-secret", "user", "pw");
        let debug = format!("{credential:?}");
        assert!(debug.contains("key"));
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains(&hash_password("pw")));
        assert!(debug.contains("REDACTED"));
    }
}
