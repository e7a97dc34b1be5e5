//! Principal identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a principal identifier in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 128;

/// Identity of an authenticated caller, taken from a verified bearer credential.
///
/// The identifier doubles as the name of the caller's storage namespace, so it
/// is restricted to a single safe path component: ASCII letters, digits and
/// `-`, `_`, `.`, `@`, never `.` or `..`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Create from a string, validating format.
    pub fn new(id: impl Into<String>) -> crate::Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(crate::Error::InvalidPrincipal(
                "principal id cannot be empty".to_string(),
            ));
        }
        if id.len() > MAX_PRINCIPAL_LEN {
            return Err(crate::Error::InvalidPrincipal(format!(
                "principal id exceeds {MAX_PRINCIPAL_LEN} bytes"
            )));
        }
        if id == "." || id == ".." {
            return Err(crate::Error::InvalidPrincipal(
                "principal id cannot be a relative path component".to_string(),
            ));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '@'))
        {
            return Err(crate::Error::InvalidPrincipal(format!(
                "invalid character in principal id: {c:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Get the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PrincipalId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::new(value)
    }
}

impl From<PrincipalId> for String {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

impl fmt::Debug for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrincipalId({})", self.0)
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_principals() {
        for id in ["alice", "bob-2", "user_42", "alice@example.com", "a.b"] {
            assert_eq!(PrincipalId::new(id).unwrap().as_str(), id);
        }
    }

    #[test]
    fn test_rejects_path_components() {
        assert!(PrincipalId::new("").is_err());
        assert!(PrincipalId::new(".").is_err());
        assert!(PrincipalId::new("..").is_err());
        assert!(PrincipalId::new("alice/bob").is_err());
        assert!(PrincipalId::new("..\\evil").is_err());
        assert!(PrincipalId::new("alice bob").is_err());
        assert!(PrincipalId::new("a".repeat(MAX_PRINCIPAL_LEN + 1)).is_err());
        assert!(PrincipalId::new("a".repeat(MAX_PRINCIPAL_LEN)).is_ok());
    }

    #[test]
    fn test_serde_validates() {
        let ok: PrincipalId = serde_json::from_str("\"alice\"").unwrap();
        assert_eq!(ok.as_str(), "alice");
        assert!(serde_json::from_str::<PrincipalId>("\"../root\"").is_err());
    }
}
