//! Object namespace allocation.
//!
//! Storage keys and public URLs are built here and nowhere else. Both are pure
//! functions of a validated principal and a generated object identifier, so a
//! key can never name a location outside its owner's namespace.

use crate::{ObjectId, PrincipalId};

/// Identifier and storage location reserved for a new upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// Globally unique identifier, exposed to the client.
    pub object_id: ObjectId,
    /// Owner-scoped storage key, never exposed to the client.
    pub storage_key: String,
}

/// Allocate a fresh object identifier and storage key for `owner`.
pub fn allocate(owner: &PrincipalId, original_name: &str) -> crate::Result<Allocation> {
    if original_name.trim().is_empty() {
        return Err(crate::Error::InvalidName(
            "file name cannot be empty".to_string(),
        ));
    }

    let object_id = ObjectId::generate(original_name);
    let storage_key = storage_key_for(owner, &object_id);
    Ok(Allocation {
        object_id,
        storage_key,
    })
}

/// Storage key for an object: `<owner>/<object_id>`.
pub fn storage_key_for(owner: &PrincipalId, object_id: &ObjectId) -> String {
    format!("{}/{}", owner.as_str(), object_id.as_str())
}

/// Public URL for an object: `<api_prefix>/fetch/<object_id>`.
pub fn public_url(api_prefix: &str, object_id: &ObjectId) -> String {
    format!(
        "{}/fetch/{}",
        api_prefix.trim_end_matches('/'),
        object_id.as_str()
    )
}
