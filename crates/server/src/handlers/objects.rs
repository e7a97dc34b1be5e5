//! Object upload, fetch and listing endpoints.

use crate::auth::AuthorizedPrincipal;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Response for a stored upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

/// One entry of an object listing.
#[derive(Debug, Serialize)]
pub struct ObjectEntry {
    pub original_name: String,
    pub url: String,
    pub size_bytes: i64,
    pub uploaded_at: String,
}

/// Response for an object listing.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub files: Vec<ObjectEntry>,
}

/// POST /upload - Store the multipart `file` field.
pub async fn upload_object(
    State(state): State<AppState>,
    AuthorizedPrincipal(owner): AuthorizedPrincipal,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        if original_name.trim().is_empty() {
            return Err(ApiError::BadRequest("no selected file".to_string()));
        }

        let body = field.map_err(ApiError::from);
        let stored = state.objects.upload(&owner, &original_name, body).await?;
        return Ok(Json(UploadResponse {
            message: "File uploaded successfully",
            file_url: stored.url,
        }));
    }

    Err(ApiError::BadRequest("no file part".to_string()))
}

/// GET /fetch/{object_id} - Stream one of the caller's objects.
pub async fn fetch_object(
    State(state): State<AppState>,
    AuthorizedPrincipal(owner): AuthorizedPrincipal,
    Path(object_id): Path<String>,
) -> ApiResult<Response> {
    let fetched = state.objects.fetch(&owner, &object_id).await?;
    let content_type = content_type_for(fetched.object_id.extension());
    let key = fetched.record.storage_key;

    let body_stream = fetched.body.stream.map(move |result| {
        result.map_err(|e| {
            tracing::error!(key = %key, error = %e, "object streaming failed mid-transfer");
            std::io::Error::other(e.to_string())
        })
    });

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type),
            (CONTENT_LENGTH, &fetched.body.size.to_string()),
            (X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Body::from_stream(body_stream),
    )
        .into_response())
}

/// GET /list - List the caller's objects.
pub async fn list_objects(
    State(state): State<AppState>,
    AuthorizedPrincipal(owner): AuthorizedPrincipal,
) -> ApiResult<Json<ListResponse>> {
    let files = state
        .objects
        .list(&owner)
        .await?
        .into_iter()
        .map(|row| {
            let uploaded_at = row
                .created_at
                .format(&Rfc3339)
                .map_err(|e| ApiError::Internal(format!("failed to format created_at: {e}")))?;
            Ok(ObjectEntry {
                original_name: row.original_name,
                url: row.public_url,
                size_bytes: row.size_bytes,
                uploaded_at,
            })
        })
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(ListResponse { files }))
}

/// Guess a content type from a preserved extension.
pub fn content_type_for(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return "application/octet-stream";
    };
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "log" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        // Never render active content inline from user uploads.
        "html" | "htm" | "js" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Some("pdf")), "application/pdf");
        assert_eq!(content_type_for(Some("PNG")), "image/png");
        assert_eq!(content_type_for(Some("html")), "text/plain; charset=utf-8");
        assert_eq!(content_type_for(Some("weird")), "application/octet-stream");
        assert_eq!(content_type_for(None), "application/octet-stream");
    }
}
