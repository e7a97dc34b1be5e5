//! Secondary key endpoints.

use crate::auth::BearerPrincipal;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

/// Response for a key rotation.
#[derive(Debug, Serialize)]
pub struct RollKeyResponse {
    pub message: &'static str,
    /// The new key. It is not retrievable again.
    #[serde(rename = "newApiKey")]
    pub new_api_key: String,
}

/// POST /roll-api-key - Issue a new secondary key for the caller.
///
/// Authenticated by the bearer credential alone.
pub async fn roll_api_key(
    State(state): State<AppState>,
    BearerPrincipal(principal): BearerPrincipal,
) -> ApiResult<Json<RollKeyResponse>> {
    let key = state.objects.rotate(&principal).await?;
    Ok(Json(RollKeyResponse {
        message: "API key rolled successfully",
        new_api_key: key.into_string(),
    }))
}
