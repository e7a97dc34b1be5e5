//! HTTP API server for the Coffer object store.
//!
//! This crate provides the data plane:
//! - Bearer credential verification and secondary key rotation
//! - Two-factor request gate
//! - Object upload, fetch and listing scoped to the caller
//! - Health and Prometheus endpoints

pub mod auth;
pub mod blobs;
pub mod credentials;
pub mod error;
pub mod handlers;
pub mod keys;
pub mod metrics;
pub mod routes;
pub mod service;
pub mod state;

pub use auth::{RequestGate, TraceId};
pub use credentials::{Claims, CredentialVerifier, issue_token};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
