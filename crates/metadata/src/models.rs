//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;

/// Current secondary key of a principal. Only the digest is stored.
#[derive(Debug, Clone, FromRow)]
pub struct SecondaryKeyRow {
    pub principal_id: String,
    /// SHA-256 of the plaintext key, lowercase hex.
    pub secret_hash: String,
    pub rotated_at: OffsetDateTime,
    pub rotated_by: String,
}

/// Catalog record for one stored object.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BlobRow {
    pub object_id: String,
    pub owner: String,
    pub original_name: String,
    /// Location in the object store; never returned to clients.
    pub storage_key: String,
    pub public_url: String,
    pub size_bytes: i64,
    pub created_at: OffsetDateTime,
}
