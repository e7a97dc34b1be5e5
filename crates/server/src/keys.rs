//! Secondary key registry.

use coffer_core::{PrincipalId, SecondaryKey, SecondaryKeyDigest};
use coffer_metadata::{MetadataResult, MetadataStore, SecondaryKeyRow};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::instrument;

/// Issues, rotates and validates per-principal secondary keys.
#[derive(Clone)]
pub struct SecondaryKeyRegistry {
    metadata: Arc<dyn MetadataStore>,
}

impl SecondaryKeyRegistry {
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self { metadata }
    }

    /// Replace the principal's key with a fresh one and return its plaintext.
    ///
    /// The previous key stops validating as soon as the upsert commits.
    #[instrument(skip(self), fields(principal = %principal))]
    pub async fn rotate(&self, principal: &PrincipalId) -> MetadataResult<SecondaryKey> {
        let key = SecondaryKey::generate();
        let row = SecondaryKeyRow {
            principal_id: principal.as_str().to_string(),
            secret_hash: key.digest().as_str().to_string(),
            rotated_at: OffsetDateTime::now_utc(),
            rotated_by: principal.as_str().to_string(),
        };
        self.metadata.upsert_secondary_key(&row).await?;
        tracing::info!("secondary key rotated");
        Ok(key)
    }

    /// Whether `presented` is the principal's current key.
    ///
    /// A principal without a key and a wrong key are indistinguishable.
    #[instrument(skip(self, presented), fields(principal = %principal))]
    pub async fn validate(&self, principal: &PrincipalId, presented: &str) -> MetadataResult<bool> {
        let Some(row) = self.metadata.get_secondary_key(principal.as_str()).await? else {
            return Ok(false);
        };
        Ok(SecondaryKeyDigest::from_stored(row.secret_hash).matches(presented))
    }
}
