//! Metadata store trait and implementations.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{BlobRepo, SecondaryKeyRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: SecondaryKeyRepo + BlobRepo + Send + Sync {
    /// Create the schema if it does not exist.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) a SQLite store and apply the schema.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers; SQLite allows only one anyway.
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(query_timeout_secs.unwrap_or(30)))
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "opened sqlite metadata store");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::*;

    #[async_trait]
    impl SecondaryKeyRepo for SqliteStore {
        async fn upsert_secondary_key(&self, key: &SecondaryKeyRow) -> MetadataResult<()> {
            sqlx::query(
                r#"
                INSERT INTO secondary_keys (principal_id, secret_hash, rotated_at, rotated_by)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(principal_id) DO UPDATE SET
                    secret_hash = excluded.secret_hash,
                    rotated_at = excluded.rotated_at,
                    rotated_by = excluded.rotated_by
                "#,
            )
            .bind(&key.principal_id)
            .bind(&key.secret_hash)
            .bind(key.rotated_at)
            .bind(&key.rotated_by)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_secondary_key(
            &self,
            principal_id: &str,
        ) -> MetadataResult<Option<SecondaryKeyRow>> {
            let row = sqlx::query_as::<_, SecondaryKeyRow>(
                "SELECT principal_id, secret_hash, rotated_at, rotated_by \
                 FROM secondary_keys WHERE principal_id = ?",
            )
            .bind(principal_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl BlobRepo for SqliteStore {
        async fn insert_blob(&self, blob: &BlobRow) -> MetadataResult<()> {
            if blob.size_bytes < 0 {
                return Err(MetadataError::Constraint(format!(
                    "negative size for object {}",
                    blob.object_id
                )));
            }

            let result = sqlx::query(
                r#"
                INSERT INTO blobs (
                    object_id, owner, original_name, storage_key,
                    public_url, size_bytes, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&blob.object_id)
            .bind(&blob.owner)
            .bind(&blob.original_name)
            .bind(&blob.storage_key)
            .bind(&blob.public_url)
            .bind(blob.size_bytes)
            .bind(blob.created_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    Err(MetadataError::DuplicateObjectId(blob.object_id.clone()))
                }
                Err(e) => Err(e.into()),
            }
        }

        async fn find_blob(&self, owner: &str, object_id: &str) -> MetadataResult<Option<BlobRow>> {
            let row = sqlx::query_as::<_, BlobRow>(
                r#"
                SELECT object_id, owner, original_name, storage_key,
                       public_url, size_bytes, created_at
                FROM blobs
                WHERE owner = ? AND object_id = ?
                "#,
            )
            .bind(owner)
            .bind(object_id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_blobs_by_owner(&self, owner: &str) -> MetadataResult<Vec<BlobRow>> {
            let rows = sqlx::query_as::<_, BlobRow>(
                r#"
                SELECT object_id, owner, original_name, storage_key,
                       public_url, size_bytes, created_at
                FROM blobs
                WHERE owner = ?
                ORDER BY created_at ASC, seq ASC
                "#,
            )
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
-- One live secondary key per principal; rotation replaces the row.
CREATE TABLE IF NOT EXISTS secondary_keys (
    principal_id TEXT PRIMARY KEY,
    secret_hash TEXT NOT NULL,
    rotated_at TEXT NOT NULL,
    rotated_by TEXT NOT NULL
);

-- Blob catalog
CREATE TABLE IF NOT EXISTS blobs (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    object_id TEXT NOT NULL UNIQUE,
    owner TEXT NOT NULL,
    original_name TEXT NOT NULL,
    storage_key TEXT NOT NULL,
    public_url TEXT NOT NULL,
    size_bytes INTEGER NOT NULL CHECK (size_bytes >= 0),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_blobs_owner_created ON blobs(owner, created_at);
"#;
