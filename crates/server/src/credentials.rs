//! Bearer credential verification.
//!
//! Bearer credentials are HMAC-signed JWTs carrying the caller's identity in
//! the `user_id` claim. Every failure mode collapses into `AuthError`, which
//! the API layer renders as a bare `Unauthorized`.

use coffer_core::PrincipalId;
use coffer_core::config::{AuthConfig, JwtAlgorithm};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

/// Authentication failures.
///
/// The variants exist for logs and metrics only; callers never see which one
/// occurred.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingBearer,

    #[error("invalid bearer credential: {0}")]
    InvalidBearer(#[from] jsonwebtoken::errors::Error),

    #[error("invalid principal claim: {0}")]
    InvalidPrincipal(#[from] coffer_core::Error),

    #[error("missing secondary key")]
    MissingSecondaryKey,

    #[error("secondary key rejected")]
    SecondaryKeyRejected,
}

impl AuthError {
    /// Which authentication factor failed.
    pub fn factor(&self) -> &'static str {
        match self {
            Self::MissingBearer | Self::InvalidBearer(_) | Self::InvalidPrincipal(_) => "bearer",
            Self::MissingSecondaryKey | Self::SecondaryKeyRejected => "secondary_key",
        }
    }
}

/// Claims carried by a bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal identifier.
    pub user_id: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Claims for `user_id` valid for `ttl` from now.
    pub fn new(user_id: impl Into<String>, ttl: Duration) -> Self {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            user_id: user_id.into(),
            exp: now.saturating_add(ttl),
            iat: Some(now),
            iss: None,
            aud: None,
        }
    }
}

fn algorithm(alg: JwtAlgorithm) -> Algorithm {
    match alg {
        JwtAlgorithm::Hs256 => Algorithm::HS256,
        JwtAlgorithm::Hs384 => Algorithm::HS384,
        JwtAlgorithm::Hs512 => Algorithm::HS512,
    }
}

/// Verifies bearer credentials against the configured shared secret.
pub struct CredentialVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl CredentialVerifier {
    /// Build a verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(algorithm(config.algorithm));
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let mut required = vec!["exp"];
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        if let Some(audience) = &config.audience {
            validation.set_audience(&[audience]);
            required.push("aud");
        } else {
            validation.validate_aud = false;
        }
        validation.set_required_spec_claims(&required);

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw bearer token and return the principal it names.
    pub fn verify(&self, token: &str) -> Result<PrincipalId, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(PrincipalId::new(data.claims.user_id)?)
    }
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

/// Sign `claims` with the configured secret.
///
/// Coffer does not issue credentials in production; this exists for local
/// development and tests.
pub fn issue_token(config: &AuthConfig, claims: &Claims) -> Result<String, AuthError> {
    let header = Header::new(algorithm(config.algorithm));
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    Ok(encode(&header, claims, &key)?)
}
