//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("invalid file name: {0}")]
    InvalidName(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
