//! Object identifiers.

use crate::hex;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of random bytes in an object identifier (128 bits).
pub const OBJECT_ID_RANDOM_BYTES: usize = 16;

/// Maximum length of a preserved file extension.
pub const MAX_EXTENSION_LEN: usize = 16;

const TOKEN_LEN: usize = OBJECT_ID_RANDOM_BYTES * 2;

/// Globally unique identifier for one stored object.
///
/// Rendered as 32 lowercase hex characters from a CSPRNG followed by the
/// original file's extension, if it had a usable one (`<hex>.pdf`).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh identifier carrying the extension of `original_name`.
    pub fn generate(original_name: &str) -> Self {
        let mut bytes = [0u8; OBJECT_ID_RANDOM_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let mut id = hex::encode(bytes);
        if let Some(ext) = extension_of(original_name) {
            id.push('.');
            id.push_str(ext);
        }
        Self(id)
    }

    /// Parse a client-supplied identifier, accepting only the generated shape.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let (token, ext) = match s.split_once('.') {
            Some((token, ext)) => (token, Some(ext)),
            None => (s, None),
        };

        if token.len() != TOKEN_LEN || !token.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')) {
            return Err(crate::Error::InvalidObjectId(format!(
                "expected {TOKEN_LEN} lowercase hex characters"
            )));
        }

        if let Some(ext) = ext
            && !is_valid_extension(ext)
        {
            return Err(crate::Error::InvalidObjectId("invalid extension".to_string()));
        }

        Ok(Self(s.to_string()))
    }

    /// Get the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The preserved extension, without the leading dot.
    pub fn extension(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, ext)| ext)
    }
}

/// Extract the extension of a client-supplied file name.
///
/// Only the last path segment is considered. Dotfiles such as `.bashrc` have no
/// extension, and extensions that are not short ASCII alphanumerics are dropped.
pub fn extension_of(name: &str) -> Option<&str> {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = file.rsplit_once('.')?;
    if stem.is_empty() || !is_valid_extension(ext) {
        return None;
    }
    Some(ext)
}

fn is_valid_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

impl TryFrom<String> for ObjectId {
    type Error = crate::Error;

    fn try_from(value: String) -> crate::Result<Self> {
        Self::parse(&value)
    }
}

impl From<ObjectId> for String {
    fn from(value: ObjectId) -> Self {
        value.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_preserves_extension() {
        let id = ObjectId::generate("report.pdf");
        assert!(id.as_str().ends_with(".pdf"));
        assert_eq!(id.extension(), Some("pdf"));
        assert_eq!(id.as_str().len(), TOKEN_LEN + 4);

        let id = ObjectId::generate("archive.tar.gz");
        assert_eq!(id.extension(), Some("gz"));

        let id = ObjectId::generate("README");
        assert_eq!(id.extension(), None);
        assert_eq!(id.as_str().len(), TOKEN_LEN);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG"), Some("JPG"));
        assert_eq!(extension_of("dir/file.txt"), Some("txt"));
        assert_eq!(extension_of("C:\\docs\\notes.md"), Some("md"));
        assert_eq!(extension_of(".bashrc"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("weird.p/df"), None);
        assert_eq!(extension_of("evil.x y"), None);
        assert_eq!(extension_of("long.abcdefghijklmnopq"), None);
    }

    #[test]
    fn test_parse_roundtrips_generated() {
        let id = ObjectId::generate("report.pdf");
        assert_eq!(ObjectId::parse(id.as_str()).unwrap(), id);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ObjectId::parse("").is_err());
        assert!(ObjectId::parse("not-hex").is_err());
        assert!(ObjectId::parse("../../etc/passwd").is_err());
        assert!(ObjectId::parse(&"A".repeat(TOKEN_LEN)).is_err());
        assert!(ObjectId::parse(&format!("{}.p/f", "a".repeat(TOKEN_LEN))).is_err());
        assert!(ObjectId::parse(&format!("{}.", "a".repeat(TOKEN_LEN))).is_err());
        assert!(ObjectId::parse(&format!("{}.tar.gz", "a".repeat(TOKEN_LEN))).is_err());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let id = ObjectId::generate("file.bin");
            assert!(seen.insert(id), "duplicate object id generated");
        }
    }
}
