#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::routing::get as get_route;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use vigil_core::ffmpeg::FfmpegError;
use vigil_core::frame::RawFrame;
use vigil_core::narrative::NarrativeTable;
use vigil_pipeline::engine::{InferenceEngine, StubClassifier};
use vigil_pipeline::error::ExtractionError;
use vigil_pipeline::sampler::{FrameSource, VideoInfo};
use vigil_pipeline::{Pipeline, PipelineConfig};

use vigil_api::config::ServerConfig;
use vigil_api::router::build_app_router;
use vigil_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults and small frames.
pub fn test_config(scratch: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        narratives_path: None,
        log_json: false,
        pipeline: PipelineConfig {
            frame_count: 4,
            frame_size: 2,
            scratch_dir: scratch.to_path_buf(),
            ..PipelineConfig::default()
        },
    }
}

/// Build the full application router around the given engine.
///
/// Frames are synthesized instead of decoded, so any downloadable body counts
/// as a video with `total_frames` frames.
pub fn build_test_app(config: &ServerConfig, engine: InferenceEngine, total_frames: u64) -> Router {
    let pipeline = Pipeline::new(&config.pipeline, engine, Arc::new(NarrativeTable::builtin()))
        .with_frame_source(Arc::new(SyntheticSource { total_frames }), &config.pipeline);

    let state = AppState {
        pipeline: Arc::new(pipeline),
    };
    build_app_router(state, config)
}

/// App with the deterministic stub classifier loaded.
pub fn build_stub_app(config: &ServerConfig, total_frames: u64) -> Router {
    build_test_app(
        config,
        InferenceEngine::with_classifier(Arc::new(StubClassifier)),
        total_frames,
    )
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Start a local HTTP server serving `/clip.mp4` and a 404 at `/missing.mp4`.
pub async fn spawn_video_server() -> String {
    let app = Router::new()
        .route("/clip.mp4", get_route(|| async { &b"fake video bytes"[..] }))
        .route(
            "/missing.mp4",
            get_route(|| async { (StatusCode::NOT_FOUND, "not found") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Frame source producing mid-grey frames for any file.
pub struct SyntheticSource {
    pub total_frames: u64,
}

#[async_trait]
impl FrameSource for SyntheticSource {
    async fn probe(&self, _path: &Path) -> Result<VideoInfo, ExtractionError> {
        Ok(VideoInfo {
            total_frames: self.total_frames,
            framerate: 25.0,
        })
    }

    async fn read_frame(
        &self,
        _path: &Path,
        _info: &VideoInfo,
        index: u64,
        width: u32,
        height: u32,
    ) -> Result<RawFrame, FfmpegError> {
        Ok(RawFrame {
            index,
            width,
            height,
            pixels: vec![128; RawFrame::expected_len(width, height)],
        })
    }
}
