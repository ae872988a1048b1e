use std::sync::Arc;

use vigil_pipeline::Pipeline;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The analysis pipeline, including the loaded model.
    pub pipeline: Arc<Pipeline>,
}
