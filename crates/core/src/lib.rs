//! Core domain types and shared logic for the Coffer blob store.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Principal identifiers extracted from verified credentials
//! - Object identifiers and the owner-scoped namespace allocator
//! - Secondary (rotating) keys and their stored digests
//! - Configuration shared by the server and its backends

pub mod config;
pub mod error;
mod hex;
pub mod namespace;
pub mod object_id;
pub mod principal;
pub mod secondary_key;

pub use error::{Error, Result};
pub use namespace::{Allocation, allocate, public_url, storage_key_for};
pub use object_id::ObjectId;
pub use principal::PrincipalId;
pub use secondary_key::{SecondaryKey, SecondaryKeyDigest};

/// Default route prefix for the data-plane API.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Default maximum upload size: 1 GiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;
