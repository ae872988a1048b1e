//! Handler for `POST /analyze-video`.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use vigil_core::result::ClassificationResult;
use vigil_core::video_url::validate_video_url;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Request body for `POST /analyze-video`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Publicly reachable `http(s)` URL of the video.
    pub video_url: String,
    /// Free-form location reported by the caller; only logged.
    #[serde(default)]
    pub location: Option<String>,
}

/// POST /analyze-video
///
/// Download the video, classify it and return the label, its confidence and
/// a narrative. The analysis runs on its own task, so it completes and cleans
/// up its scratch file even if the caller disconnects or the request deadline
/// expires first.
pub async fn analyze_video(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> AppResult<Json<ClassificationResult>> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    validate_video_url(&request.video_url)?;

    let video_url = request.video_url.trim().to_string();
    tracing::info!(
        video_url = %video_url,
        location = request.location.as_deref().unwrap_or("unknown"),
        "Analysis requested"
    );

    let pipeline = state.pipeline.clone();
    let result = tokio::spawn(async move { pipeline.run(&video_url).await })
        .await
        .map_err(|e| AppError::InternalError(format!("analysis task failed: {e}")))??;

    Ok(Json(result))
}
