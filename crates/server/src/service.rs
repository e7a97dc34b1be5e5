//! Data-plane operations.
//!
//! Callers are expected to have passed the request gate already; every
//! operation here takes the verified owner and scopes all catalog access to it.

use crate::blobs::{BlobBody, BlobIo};
use crate::error::{ApiError, ApiResult};
use crate::keys::SecondaryKeyRegistry;
use crate::metrics;
use bytes::Bytes;
use coffer_core::{ObjectId, PrincipalId, SecondaryKey, allocate, public_url};
use coffer_metadata::{BlobRow, MetadataError, MetadataStore};
use futures::Stream;
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::instrument;

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub object_id: ObjectId,
    pub url: String,
    pub size: u64,
}

/// An object opened for reading.
pub struct FetchedObject {
    pub record: BlobRow,
    pub object_id: ObjectId,
    pub body: BlobBody,
}

/// Upload, fetch, list and key rotation for authenticated principals.
#[derive(Clone)]
pub struct ObjectService {
    blobs: BlobIo,
    metadata: Arc<dyn MetadataStore>,
    keys: SecondaryKeyRegistry,
    api_prefix: String,
}

impl ObjectService {
    pub fn new(
        blobs: BlobIo,
        metadata: Arc<dyn MetadataStore>,
        keys: SecondaryKeyRegistry,
        api_prefix: impl Into<String>,
    ) -> Self {
        Self {
            blobs,
            metadata,
            keys,
            api_prefix: api_prefix.into(),
        }
    }

    /// Issue a fresh secondary key for `owner`, replacing any previous one.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn rotate(&self, owner: &PrincipalId) -> ApiResult<SecondaryKey> {
        let key = self.keys.rotate(owner).await?;
        metrics::KEY_ROTATIONS.inc();
        Ok(key)
    }

    /// Store a new object for `owner`.
    ///
    /// Bytes are persisted before the catalog record is inserted, so a failure
    /// at any point never leaves a record without bytes.
    #[instrument(skip(self, body), fields(owner = %owner))]
    pub async fn upload<S>(
        &self,
        owner: &PrincipalId,
        original_name: &str,
        body: S,
    ) -> ApiResult<StoredObject>
    where
        S: Stream<Item = ApiResult<Bytes>> + Send,
    {
        let started = Instant::now();
        let allocation = allocate(owner, original_name)?;
        let size = self.blobs.write(&allocation.storage_key, body).await?;

        let url = public_url(&self.api_prefix, &allocation.object_id);
        let record = BlobRow {
            object_id: allocation.object_id.as_str().to_string(),
            owner: owner.as_str().to_string(),
            original_name: original_name.to_string(),
            storage_key: allocation.storage_key.clone(),
            public_url: url.clone(),
            size_bytes: i64::try_from(size)
                .map_err(|_| ApiError::Internal(format!("object size overflow: {size}")))?,
            created_at: OffsetDateTime::now_utc(),
        };

        if let Err(e) = self.metadata.insert_blob(&record).await {
            // The catalog rejected the record; the bytes would be unreachable.
            self.blobs.discard(&allocation.storage_key).await;
            if let MetadataError::DuplicateObjectId(id) = &e {
                tracing::error!(object_id = %id, "object id collision");
            }
            return Err(e.into());
        }

        metrics::UPLOADS_TOTAL.inc();
        metrics::BYTES_UPLOADED.inc_by(size);
        metrics::UPLOAD_DURATION.observe(started.elapsed().as_secs_f64());
        tracing::info!(object_id = %allocation.object_id, size, "object stored");

        Ok(StoredObject {
            object_id: allocation.object_id,
            url,
            size,
        })
    }

    /// Open one of `owner`'s objects.
    ///
    /// Malformed ids, unknown ids and other principals' ids all yield the same
    /// `NotFound`.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn fetch(&self, owner: &PrincipalId, object_id: &str) -> ApiResult<FetchedObject> {
        let object_id = ObjectId::parse(object_id)?;
        let record = self
            .metadata
            .find_blob(owner.as_str(), object_id.as_str())
            .await?
            .ok_or_else(|| ApiError::NotFound("object not found".to_string()))?;

        let body = self.blobs.read(&record.storage_key).await?;
        metrics::FETCHES_TOTAL.inc();
        Ok(FetchedObject {
            record,
            object_id,
            body,
        })
    }

    /// All of `owner`'s objects, oldest first.
    #[instrument(skip(self), fields(owner = %owner))]
    pub async fn list(&self, owner: &PrincipalId) -> ApiResult<Vec<BlobRow>> {
        Ok(self.metadata.list_blobs_by_owner(owner.as_str()).await?)
    }
}
