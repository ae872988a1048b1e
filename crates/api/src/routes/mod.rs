//! Route tree.
//!
//! ```text
//! GET  /health           service and model status
//! POST /analyze-video    classify a video by URL
//! ```

pub mod analysis;
pub mod health;
