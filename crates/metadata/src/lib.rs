//! Metadata catalog abstraction and implementations for Coffer.
//!
//! This crate provides the two catalogs behind the data plane:
//! - Secondary keys, one live digest per principal
//! - Blob records mapping object ids to owner-scoped storage keys

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use models::{BlobRow, SecondaryKeyRow};
pub use repos::{BlobRepo, SecondaryKeyRepo};
pub use store::{MetadataStore, SqliteStore};

use coffer_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite {
            path,
            query_timeout_secs,
        } => {
            let store = SqliteStore::new(path, *query_timeout_secs).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
