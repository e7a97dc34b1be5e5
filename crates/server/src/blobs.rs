//! Blob writer and reader.
//!
//! Thin layer over `ObjectStore` that turns storage faults into the API's
//! storage error kinds and records storage metrics.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use bytes::Bytes;
use coffer_storage::{ByteStream, ObjectStore, StorageError};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tracing::instrument;

/// A readable stored object.
pub struct BlobBody {
    /// Exact size of the stored bytes.
    pub size: u64,
    /// Object content.
    pub stream: ByteStream,
}

/// Persists and streams raw object bytes.
#[derive(Clone)]
pub struct BlobIo {
    storage: Arc<dyn ObjectStore>,
}

impl BlobIo {
    pub fn new(storage: Arc<dyn ObjectStore>) -> Self {
        Self { storage }
    }

    /// Persist `body` under `key` and return the exact byte count.
    ///
    /// An error from `body` is returned as-is; any storage fault becomes
    /// `StorageWrite`. Either way nothing is left under `key`.
    #[instrument(skip(self, body))]
    pub async fn write<S>(&self, key: &str, body: S) -> ApiResult<u64>
    where
        S: Stream<Item = ApiResult<Bytes>> + Send,
    {
        let mut upload = self
            .storage
            .put_stream(key)
            .await
            .map_err(|e| storage_write_fault(key, e))?;

        let mut body = std::pin::pin!(body);
        while let Some(chunk) = body.next().await {
            let written = match chunk {
                Ok(chunk) => upload
                    .write(chunk)
                    .await
                    .map_err(|e| storage_write_fault(key, e)),
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                if let Err(abort_err) = upload.abort().await {
                    tracing::warn!(key, error = %abort_err, "failed to abort upload");
                }
                return Err(e);
            }
        }

        upload.finish().await.map_err(|e| storage_write_fault(key, e))
    }

    /// Open a stored object for reading.
    ///
    /// Missing bytes are reported as `ObjectMissingOnDisk`: callers only read
    /// keys the catalog says exist.
    #[instrument(skip(self))]
    pub async fn read(&self, key: &str) -> ApiResult<BlobBody> {
        let meta = self
            .storage
            .head(key)
            .await
            .map_err(|e| storage_read_fault(key, e))?;
        let stream = self
            .storage
            .get_stream(key)
            .await
            .map_err(|e| storage_read_fault(key, e))?;
        Ok(BlobBody {
            size: meta.size,
            stream,
        })
    }

    /// Remove an object this process just wrote.
    pub async fn discard(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            metrics::record_storage_fault(e.kind());
            tracing::error!(key, error = %e, "failed to discard orphaned object");
        }
    }
}

fn storage_write_fault(key: &str, err: StorageError) -> ApiError {
    metrics::record_storage_fault(err.kind());
    tracing::error!(key, error = %err, "storage write failed");
    ApiError::StorageWrite(err.to_string())
}

fn storage_read_fault(key: &str, err: StorageError) -> ApiError {
    metrics::record_storage_fault(err.kind());
    match err {
        StorageError::NotFound(_) => {
            tracing::error!(key, "catalog record points at missing object");
            ApiError::ObjectMissingOnDisk(key.to_string())
        }
        other => {
            tracing::error!(key, error = %other, "storage read failed");
            ApiError::Storage(other)
        }
    }
}
