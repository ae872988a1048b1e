#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use vigil_core::ffmpeg::FfmpegError;
use vigil_core::frame::{FrameBatch, RawFrame};
use vigil_core::probability::ProbabilityVector;
use vigil_pipeline::engine::Classifier;
use vigil_pipeline::error::{ExtractionError, InferenceError};
use vigil_pipeline::sampler::{FrameSource, VideoInfo};

/// Bytes served at `/clip.mp4`.
pub const CLIP_BYTES: &[u8] = b"\x00\x00\x00\x18ftypmp42 fake video payload";

/// Start a local HTTP server with fixture routes and return its base URL.
///
/// Routes:
/// - `/clip.mp4`: 200 with [`CLIP_BYTES`]
/// - `/empty.mp4`: 200 with an empty body
/// - `/missing.mp4`: 404
/// - `/large.mp4`: 200 with 64 KiB
pub async fn spawn_video_server() -> String {
    let app = Router::new()
        .route("/clip.mp4", get(|| async { CLIP_BYTES }))
        .route("/empty.mp4", get(|| async { "" }))
        .route(
            "/missing.mp4",
            get(|| async { (StatusCode::NOT_FOUND, "not found") }),
        )
        .route("/large.mp4", get(|| async { vec![7u8; 64 * 1024] }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}

/// Number of entries in a directory, or zero when it does not exist.
pub fn file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Frame source that ignores the file and synthesizes uniform frames.
pub struct SyntheticSource {
    pub total_frames: u64,
}

#[async_trait]
impl FrameSource for SyntheticSource {
    async fn probe(&self, path: &Path) -> Result<VideoInfo, ExtractionError> {
        assert!(path.exists(), "scratch file must exist while sampling");
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

/// Classifier returning fixed probabilities and counting its calls.
pub struct CountingClassifier {
    pub probabilities: [f32; 4],
    pub calls: AtomicUsize,
    pub expected_frames: usize,
}

impl CountingClassifier {
    pub fn new(probabilities: [f32; 4], expected_frames: usize) -> Self {
        Self {
            probabilities,
            calls: AtomicUsize::new(0),
            expected_frames,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for CountingClassifier {
    fn name(&self) -> &str {
        "counting"
    }

    fn classify(&self, batch: &FrameBatch) -> Result<ProbabilityVector, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(batch.len(), self.expected_frames);
        ProbabilityVector::from_probabilities(&self.probabilities)
            .map_err(|e| InferenceError::InvalidOutput(e.to_string()))
    }
}

/// Classifier that always panics, simulating a crashed inference worker.
pub struct PanickingClassifier;

impl Classifier for PanickingClassifier {
    fn name(&self) -> &str {
        "panicking"
    }

    fn classify(&self, _batch: &FrameBatch) -> Result<ProbabilityVector, InferenceError> {
        panic!("inference worker crashed");
    }
}
