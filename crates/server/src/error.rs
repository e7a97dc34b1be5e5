//! API error types.

use crate::credentials::AuthError;
use crate::metrics;
use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coffer_metadata::MetadataError;
use coffer_storage::StorageError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Some authentication factor failed. Deliberately carries no detail.
    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("duplicate object id: {0}")]
    DuplicateObjectId(String),

    #[error("storage write failed: {0}")]
    StorageWrite(String),

    #[error("stored object missing: {0}")]
    ObjectMissingOnDisk(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[source] MetadataError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::DuplicateObjectId(_) => "duplicate_object_id",
            Self::StorageWrite(_) => "storage_write_error",
            Self::ObjectMissingOnDisk(_) => "object_missing_on_disk",
            Self::Internal(_) => "internal_error",
            Self::Storage(_) => "storage_error",
            Self::Metadata(_) => "metadata_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::DuplicateObjectId(_)
            | Self::StorageWrite(_)
            | Self::ObjectMissingOnDisk(_)
            | Self::Internal(_)
            | Self::Storage(_)
            | Self::Metadata(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        metrics::record_auth_failure(err.factor());
        tracing::debug!(factor = err.factor(), reason = %err, "request rejected");
        Self::Unauthorized
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::DuplicateObjectId(id) => Self::DuplicateObjectId(id),
            other => Self::Metadata(other),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<coffer_core::Error> for ApiError {
    fn from(err: coffer_core::Error) -> Self {
        match err {
            coffer_core::Error::InvalidName(msg) => Self::BadRequest(msg),
            // Malformed ids cannot name a stored object.
            coffer_core::Error::InvalidObjectId(_) => {
                Self::NotFound("object not found".to_string())
            }
            coffer_core::Error::InvalidPrincipal(_) => Self::Unauthorized,
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(err: MultipartRejection) -> Self {
        Self::BadRequest(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        }
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_opaque() {
        for err in [
            AuthError::MissingBearer,
            AuthError::MissingSecondaryKey,
            AuthError::SecondaryKeyRejected,
        ] {
            let api: ApiError = err.into();
            assert!(matches!(api, ApiError::Unauthorized));
            assert_eq!(api.to_string(), "unauthorized");
            assert_eq!(api.status_code(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_metadata_error_mapping() {
        let api: ApiError = MetadataError::DuplicateObjectId("abc".to_string()).into();
        assert_eq!(api.code(), "duplicate_object_id");
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let api: ApiError = MetadataError::Constraint("bad".to_string()).into();
        assert_eq!(api.code(), "metadata_error");
    }

    #[test]
    fn test_core_error_mapping() {
        let api: ApiError = coffer_core::Error::InvalidName("empty".to_string()).into();
        assert_eq!(api.status_code(), StatusCode::BAD_REQUEST);

        let api: ApiError = coffer_core::Error::InvalidObjectId("bad".to_string()).into();
        assert_eq!(api.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_storage_faults_are_distinct() {
        assert_eq!(
            ApiError::ObjectMissingOnDisk("k".to_string()).code(),
            "object_missing_on_disk"
        );
        assert_eq!(
            ApiError::StorageWrite("io".to_string()).code(),
            "storage_write_error"
        );
    }
}
