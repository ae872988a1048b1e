//! FFmpeg/FFprobe command utilities for frame sampling.
//!
//! `ffprobe` supplies container metadata (frame count, frame rate); `ffmpeg`
//! decodes single frames as packed `bgr24` scaled to the sampling resolution.

use std::path::Path;
use std::process::Stdio;

use serde::Deserialize;

use crate::frame::RawFrame;

/// Error type for FFmpeg/FFprobe operations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("video file not found: {0}")]
    VideoNotFound(String),

    #[error("decoded frame has {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
}

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

/// A single stream from ffprobe output.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub index: i32,
    pub codec_type: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// e.g. "30/1" or "24000/1001"
    pub r_frame_rate: Option<String>,
    pub duration: Option<String>,
    pub nb_frames: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
    pub format_name: Option<String>,
}

/// How to position the decoder on a target frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSeek {
    /// Seek by presentation time in seconds (fast, used when the frame rate is known).
    Timestamp(f64),
    /// Decode from the start and select the n-th frame.
    FrameNumber(u64),
}

impl FrameSeek {
    /// Seek strategy for frame `index` given the stream frame rate.
    ///
    /// Timestamps point half a frame before the target, so the millisecond
    /// rounding of the `-ss` argument never lands past frame `index`.
    pub fn for_index(index: u64, framerate: f64) -> Self {
        if framerate > 0.0 {
            FrameSeek::Timestamp(((index as f64 - 0.5) / framerate).max(0.0))
        } else {
            FrameSeek::FrameNumber(index)
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run `ffprobe` on a video file and return the parsed JSON output.
pub async fn probe_video(path: &Path) -> Result<FfprobeOutput, FfmpegError> {
    if !path.exists() {
        return Err(FfmpegError::VideoNotFound(
            path.to_string_lossy().to_string(),
        ));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| FfmpegError::ParseError(format!("{e}: {stdout}")))
}

/// Decode one frame as packed `bgr24`, scaled to `width x height`.
///
/// Fails with [`FfmpegError::FrameSize`] when ffmpeg produced no frame (e.g.
/// the seek landed past the end of the stream) or a truncated one.
pub async fn extract_raw_frame(
    video_path: &Path,
    seek: FrameSeek,
    index: u64,
    width: u32,
    height: u32,
) -> Result<RawFrame, FfmpegError> {
    if !video_path.exists() {
        return Err(FfmpegError::VideoNotFound(
            video_path.to_string_lossy().to_string(),
        ));
    }

    let scale = format!("scale={width}:{height}");
    let mut cmd = tokio::process::Command::new("ffmpeg");
    cmd.args(["-v", "error", "-nostdin"]);

    match seek {
        FrameSeek::Timestamp(secs) => {
            cmd.args(["-ss", &seek_arg(secs), "-i"])
                .arg(video_path)
                .args(["-vf", &scale]);
        }
        FrameSeek::FrameNumber(n) => {
            cmd.arg("-i")
                .arg(video_path)
                .args(["-vf", &format!("select=eq(n\\,{n}),{scale}"), "-vsync", "0"]);
        }
    }

    let output = cmd
        .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "bgr24", "pipe:1"])
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let frame = RawFrame {
        index,
        width,
        height,
        pixels: output.stdout,
    };
    if !frame.is_well_formed() {
        return Err(FfmpegError::FrameSize {
            expected: RawFrame::expected_len(width, height),
            actual: frame.pixels.len(),
        });
    }
    Ok(frame)
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

/// Find the first video stream in the ffprobe output.
/// `-ss` argument for a seek to `secs`.
fn seek_arg(secs: f64) -> String {
    format!("{secs:.3}")
}

fn first_video_stream(probe: &FfprobeOutput) -> Option<&FfprobeStream> {
    probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
}

/// Whether the probe found any video stream at all.
pub fn has_video_stream(probe: &FfprobeOutput) -> bool {
    first_video_stream(probe).is_some()
}

/// Parse the video duration in seconds from ffprobe output.
pub fn parse_duration(probe: &FfprobeOutput) -> f64 {
    // Try format-level duration first.
    if let Some(secs) = probe.format.duration.as_deref().and_then(parse_f64) {
        return secs;
    }
    first_video_stream(probe)
        .and_then(|s| s.duration.as_deref())
        .and_then(parse_f64)
        .unwrap_or(0.0)
}

/// Parse the video framerate from ffprobe output.
///
/// The `r_frame_rate` field is a fraction like `"30/1"` or `"24000/1001"`.
pub fn parse_framerate(probe: &FfprobeOutput) -> f64 {
    first_video_stream(probe)
        .and_then(|s| s.r_frame_rate.as_deref())
        .map(parse_fraction)
        .unwrap_or(0.0)
}

/// Count total frames from ffprobe output.
///
/// Prefers the stream's `nb_frames`; otherwise estimates from duration and
/// frame rate. Returns 0 when neither is available.
pub fn parse_total_frames(probe: &FfprobeOutput) -> u64 {
    if let Some(n) = first_video_stream(probe)
        .and_then(|s| s.nb_frames.as_deref())
        .and_then(|nb| nb.parse::<u64>().ok())
    {
        if n > 0 {
            return n;
        }
    }
    let duration = parse_duration(probe);
    let fps = parse_framerate(probe);
    if duration > 0.0 && fps > 0.0 {
        return (duration * fps).round() as u64;
    }
    0
}

fn parse_f64(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a fraction string like `"30/1"` into a float.
fn parse_fraction(s: &str) -> f64 {
    if let Some((num, den)) = s.split_once('/') {
        let num = num.parse::<f64>().unwrap_or(0.0);
        let den = den.parse::<f64>().unwrap_or(1.0);
        if den > 0.0 {
            return num / den;
        }
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(0.0)
}
