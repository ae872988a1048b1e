//! Error taxonomy of the pipeline.
//!
//! Each stage raises only its own kind; [`PipelineError`] wraps them without
//! reinterpretation. None of them is retried.

use std::time::Duration;

use vigil_core::error::CoreError;
use vigil_core::ffmpeg::FfmpegError;

/// Fetching the source video failed.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request could not be sent or the body could not be read.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("download timed out after {0:?}")]
    Timeout(Duration),

    /// The remote server returned a non-2xx status code.
    #[error("remote server returned HTTP {0}")]
    HttpStatus(u16),

    #[error("remote server returned no data")]
    Empty,

    #[error("video exceeds the {limit}-byte download limit")]
    TooLarge { limit: u64 },

    #[error("failed to write scratch file: {0}")]
    Io(#[from] std::io::Error),
}

/// The downloaded file could not be turned into frames.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("cannot open video: {0}")]
    Open(#[source] FfmpegError),

    #[error("file contains no video stream")]
    NoVideoStream,

    #[error("video reports zero frames")]
    NoFrames,

    #[error("no frame could be decoded from {attempted} sampled positions")]
    NothingDecoded { attempted: usize },

    #[error("frame {index} has {actual} bytes, expected {expected}")]
    MalformedFrame {
        index: u64,
        expected: usize,
        actual: usize,
    },

    /// The configured batch shape is unusable (e.g. zero frames or pixels).
    #[error("cannot build frame batch: {0}")]
    Batch(#[source] CoreError),
}

/// Running the classifier failed.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("failed to load model: {0}")]
    Load(String),

    #[error("model execution failed: {0}")]
    Execution(String),

    #[error("model output is invalid: {0}")]
    InvalidOutput(String),
}

/// Terminal failure of one analysis request.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("frame extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),

    /// A fault outside the taxonomy, e.g. a panicked worker task.
    #[error("internal error: {0}")]
    Internal(String),
}
