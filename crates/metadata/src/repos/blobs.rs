//! Blob catalog repository.

use crate::error::MetadataResult;
use crate::models::BlobRow;
use async_trait::async_trait;

/// Repository for blob records.
///
/// Every read is scoped to an owner; there is no lookup by object id alone.
#[async_trait]
pub trait BlobRepo: Send + Sync {
    /// Insert a blob record.
    ///
    /// Fails with `MetadataError::DuplicateObjectId` if the object id is taken.
    async fn insert_blob(&self, blob: &BlobRow) -> MetadataResult<()>;

    /// Find a blob by owner and object id.
    async fn find_blob(&self, owner: &str, object_id: &str) -> MetadataResult<Option<BlobRow>>;

    /// List an owner's blobs, oldest first (insertion order breaks ties).
    async fn list_blobs_by_owner(&self, owner: &str) -> MetadataResult<Vec<BlobRow>>;
}
