//! Authentication and authorization.
//!
//! Every data-plane request passes the [`RequestGate`]: the bearer credential
//! is verified first, then the secondary key is checked against the principal
//! the bearer named. Handlers receive the outcome through the
//! [`BearerPrincipal`] and [`AuthorizedPrincipal`] extractors.

use crate::credentials::{AuthError, CredentialVerifier};
use crate::error::{ApiError, ApiResult};
use crate::keys::SecondaryKeyRegistry;
use crate::state::AppState;
use axum::extract::{FromRequestParts, Request};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use coffer_core::PrincipalId;
use tracing::Instrument;
use uuid::Uuid;

/// Maximum length for trace IDs.
/// Longer trace IDs are truncated to prevent log bloat and potential log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Header carrying the secondary key.
pub const SECONDARY_KEY_HEADER: &str = "x-api-key";

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value.
    /// The value is truncated to MAX_TRACE_ID_LEN characters and non-printable characters removed.
    pub fn from_client(value: &str) -> Self {
        // Limit by character count, not bytes, to stay on UTF-8 boundaries.
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    /// Get the trace ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract bearer token from Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(v[7..].trim())
            } else {
                None
            }
        })
        .filter(|token| !token.is_empty())
}

/// Extract the secondary key header.
pub fn extract_secondary_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SECONDARY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|key| !key.is_empty())
}

/// Extract trace ID from X-Trace-Id header or generate a new one.
fn extract_or_generate_trace_id(headers: &HeaderMap) -> TraceId {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

/// Assigns a trace ID and runs the request inside a span carrying it.
pub async fn trace_middleware(mut req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let span = tracing::info_span!("request", trace_id = %trace_id);
    req.extensions_mut().insert(trace_id);
    next.run(req).instrument(span).await
}

/// Two-factor authorization pipeline.
pub struct RequestGate {
    verifier: CredentialVerifier,
    keys: SecondaryKeyRegistry,
}

impl RequestGate {
    pub fn new(verifier: CredentialVerifier, keys: SecondaryKeyRegistry) -> Self {
        Self { verifier, keys }
    }

    /// Verify the bearer credential alone.
    ///
    /// Used only by key rotation, which is how a principal obtains its
    /// secondary key in the first place.
    pub fn authenticate(&self, headers: &HeaderMap) -> ApiResult<PrincipalId> {
        let token = extract_bearer_token(headers).ok_or(AuthError::MissingBearer)?;
        Ok(self.verifier.verify(token)?)
    }

    /// Verify both factors, bearer first.
    ///
    /// The secondary key is always checked against the principal the bearer
    /// credential named.
    #[tracing::instrument(skip_all)]
    pub async fn authorize(&self, headers: &HeaderMap) -> ApiResult<PrincipalId> {
        let principal = self.authenticate(headers)?;
        let presented = extract_secondary_key(headers).ok_or(AuthError::MissingSecondaryKey)?;
        if !self.keys.validate(&principal, presented).await? {
            return Err(AuthError::SecondaryKeyRejected.into());
        }
        Ok(principal)
    }
}

/// Principal proven by the bearer credential only.
#[derive(Debug, Clone)]
pub struct BearerPrincipal(pub PrincipalId);

impl FromRequestParts<AppState> for BearerPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        state.gate.authenticate(&parts.headers).map(Self)
    }
}

/// Principal that passed both authentication factors.
#[derive(Debug, Clone)]
pub struct AuthorizedPrincipal(pub PrincipalId);

impl FromRequestParts<AppState> for AuthorizedPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> ApiResult<Self> {
        state.gate.authorize(&parts.headers).await.map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_scheme_is_case_insensitive() {
        for scheme in ["Bearer", "bearer", "BEARER", "bEaReR"] {
            let map = headers(&[("authorization", &format!("{scheme} abc.def.ghi"))]);
            assert_eq!(extract_bearer_token(&map), Some("abc.def.ghi"));
        }
    }

    #[test]
    fn test_bearer_rejects_other_schemes() {
        for value in ["Basic abc", "Bearer ", "Bearer"] {
            let map = headers(&[("authorization", value)]);
            assert_eq!(extract_bearer_token(&map), None, "{value}");
        }
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_secondary_key_header() {
        assert_eq!(
            extract_secondary_key(&headers(&[("x-api-key", "k1")])),
            Some("k1")
        );
        assert_eq!(extract_secondary_key(&headers(&[("x-api-key", "")])), None);
        assert_eq!(extract_secondary_key(&HeaderMap::new()), None);
    }

    #[test]
    fn test_trace_id_sanitized() {
        let id = TraceId::from_client("abc\ndef");
        assert_eq!(id.as_str(), "abcdef");

        let long = "x".repeat(500);
        assert_eq!(TraceId::from_client(&long).as_str().len(), MAX_TRACE_ID_LEN);

        // Nothing printable left, so a fresh id is generated.
        let id = TraceId::from_client("\u{7}\u{7}");
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }
}
