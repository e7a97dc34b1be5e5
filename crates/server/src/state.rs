//! Application state shared across handlers.

use crate::auth::RequestGate;
use crate::blobs::BlobIo;
use crate::credentials::CredentialVerifier;
use crate::keys::SecondaryKeyRegistry;
use crate::service::ObjectService;
use coffer_core::config::AppConfig;
use coffer_metadata::MetadataStore;
use coffer_storage::ObjectStore;
use std::sync::Arc;

/// Application state.
///
/// Every component receives its store handles here, once, at startup.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Two-factor request gate.
    pub gate: Arc<RequestGate>,
    /// Data-plane operations.
    pub objects: ObjectService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The configuration is expected to have been validated already.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let keys = SecondaryKeyRegistry::new(metadata.clone());
        let gate = RequestGate::new(CredentialVerifier::new(&config.auth), keys.clone());
        let objects = ObjectService::new(
            BlobIo::new(storage.clone()),
            metadata.clone(),
            keys,
            config.server.normalized_api_prefix(),
        );

        Self {
            config: Arc::new(config),
            storage,
            metadata,
            gate: Arc::new(gate),
            objects,
        }
    }
}
