use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Mount the video analysis route.
pub fn router() -> Router<AppState> {
    Router::new().route("/analyze-video", post(handlers::analysis::analyze_video))
}
