//! Secondary key repository.

use crate::error::MetadataResult;
use crate::models::SecondaryKeyRow;
use async_trait::async_trait;

/// Repository for per-principal secondary key digests.
#[async_trait]
pub trait SecondaryKeyRepo: Send + Sync {
    /// Insert or fully replace the key for `key.principal_id`.
    async fn upsert_secondary_key(&self, key: &SecondaryKeyRow) -> MetadataResult<()>;

    /// Get the current key for a principal.
    async fn get_secondary_key(
        &self,
        principal_id: &str,
    ) -> MetadataResult<Option<SecondaryKeyRow>>;
}
