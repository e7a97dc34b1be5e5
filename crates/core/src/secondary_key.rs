//! Secondary (rotating) keys.
//!
//! A secondary key is the second authentication factor on every data-plane
//! request. The plaintext is handed to the caller exactly once at rotation;
//! only its SHA-256 digest is persisted.

use crate::hex;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

/// Random bytes in a secondary key (256 bits).
pub const SECONDARY_KEY_BYTES: usize = 32;

/// Plaintext secondary key, URL-safe base64 without padding.
#[derive(Clone, PartialEq, Eq)]
pub struct SecondaryKey(String);

impl SecondaryKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SECONDARY_KEY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the plaintext value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the plaintext.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Digest suitable for storage.
    pub fn digest(&self) -> SecondaryKeyDigest {
        SecondaryKeyDigest::of(&self.0)
    }
}

impl fmt::Debug for SecondaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecondaryKey").field(&"<redacted>").finish()
    }
}

/// Stored form of a secondary key (SHA-256, lowercase hex).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecondaryKeyDigest(String);

impl SecondaryKeyDigest {
    /// Digest a presented plaintext value.
    pub fn of(plaintext: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a digest loaded from storage.
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Get the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a presented plaintext against this digest without early exit.
    pub fn matches(&self, presented: &str) -> bool {
        let candidate = Self::of(presented);
        self.0.as_bytes().ct_eq(candidate.0.as_bytes()).into()
    }
}
