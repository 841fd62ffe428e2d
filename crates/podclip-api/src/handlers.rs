//! Request handlers.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use podclip_models::{ClipRequest, MomentOutcome};
use podclip_pipeline::process_request;

use crate::auth::AuthToken;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response of `POST /process_video`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessVideoResponse {
    /// Per-moment outcomes, in clip order
    pub clips: Vec<MomentOutcome>,
}

/// Process a source video into published clips.
pub async fn process_video(
    State(state): State<AppState>,
    _auth: AuthToken,
    Json(request): Json<ClipRequest>,
) -> ApiResult<Json<ProcessVideoResponse>> {
    request.validate().map_err(ApiError::bad_request)?;

    info!(s3_key = %request.s3_key, "Accepted clip request");
    let clips = process_request(&state.pipeline, &request.s3_key).await?;

    Ok(Json(ProcessVideoResponse { clips }))
}

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Readiness probe.
pub async fn ready() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ready" }))
}
