use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vigil_core::error::CoreError;
use vigil_pipeline::error::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`PipelineError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `vigil_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failed analysis.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Config(msg) => return internal_error_response(msg),
            },

            // --- Pipeline failures ---
            AppError::Pipeline(err) => match err {
                PipelineError::Download(e) => (
                    StatusCode::BAD_REQUEST,
                    "DOWNLOAD_FAILED",
                    format!("Failed to download video: {e}"),
                ),
                PipelineError::Extraction(e) => (
                    StatusCode::BAD_REQUEST,
                    "EXTRACTION_FAILED",
                    format!("Failed to extract frames: {e}"),
                ),
                PipelineError::ModelUnavailable(reason) => {
                    tracing::error!(reason = %reason, "Analysis requested without a loaded model");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MODEL_UNAVAILABLE",
                        "The classification model is not available".to_string(),
                    )
                }
                PipelineError::Inference(e) => {
                    tracing::error!(error = %e, "Inference failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INFERENCE_FAILED",
                        "Model inference failed".to_string(),
                    )
                }
                PipelineError::Internal(msg) => return internal_error_response(msg),
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => return internal_error_response(msg),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Log an unexpected fault under a fresh incident id and return a sanitized
/// 500 carrying only that id.
fn internal_error_response(detail: &str) -> Response {
    let incident_id = uuid::Uuid::new_v4();
    tracing::error!(%incident_id, error = %detail, "Internal error");

    let body = json!({
        "error": "An internal error occurred",
        "code": "INTERNAL_ERROR",
        "incident_id": incident_id,
    });

    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
}
