//! Evenly-strided frame sampling.
//!
//! For a video with `T` frames and a target of `N` frames the sampler reads
//! indices `0, s, 2s, ...` with stride `s = max(1, T / N)`, stopping after `N`
//! frames or at the end of the video. Indices that cannot be decoded are
//! skipped rather than retried.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use vigil_core::ffmpeg::{self, FfmpegError, FrameSeek};
use vigil_core::frame::RawFrame;

use crate::error::ExtractionError;

/// Stream properties needed to plan sampling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub total_frames: u64,
    /// Frames per second, or `0.0` when unknown.
    pub framerate: f64,
}

/// Source of decoded frames for a local video file.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Open the file and report its frame count.
    async fn probe(&self, path: &Path) -> Result<VideoInfo, ExtractionError>;

    /// Decode the frame at `index`, scaled to `width x height`.
    async fn read_frame(
        &self,
        path: &Path,
        info: &VideoInfo,
        index: u64,
        width: u32,
        height: u32,
    ) -> Result<RawFrame, FfmpegError>;
}

/// [`FrameSource`] backed by the `ffprobe` and `ffmpeg` binaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegFrameSource;

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn probe(&self, path: &Path) -> Result<VideoInfo, ExtractionError> {
        let probe = ffmpeg::probe_video(path)
            .await
            .map_err(ExtractionError::Open)?;
        if !ffmpeg::has_video_stream(&probe) {
            return Err(ExtractionError::NoVideoStream);
        }
        Ok(VideoInfo {
            total_frames: ffmpeg::parse_total_frames(&probe),
            framerate: ffmpeg::parse_framerate(&probe),
        })
    }

    async fn read_frame(
        &self,
        path: &Path,
        info: &VideoInfo,
        index: u64,
        width: u32,
        height: u32,
    ) -> Result<RawFrame, FfmpegError> {
        let seek = FrameSeek::for_index(index, info.framerate);
        ffmpeg::extract_raw_frame(path, seek, index, width, height).await
    }
}

/// Distance between sampled indices.
pub fn sample_stride(total_frames: u64, frame_count: usize) -> u64 {
    (total_frames / frame_count.max(1) as u64).max(1)
}

/// Picks up to `N` evenly spaced frames from a video.
pub struct FrameSampler {
    source: Arc<dyn FrameSource>,
    frame_count: usize,
    frame_size: u32,
}

impl FrameSampler {
    pub fn new(source: Arc<dyn FrameSource>, frame_count: usize, frame_size: u32) -> Self {
        Self {
            source,
            frame_count,
            frame_size,
        }
    }

    /// Sample frames from `path`.
    ///
    /// Returns between 1 and `N` frames in ascending index order. Fewer than
    /// `N` is normal for short videos or when some indices fail to decode.
    pub async fn sample(&self, path: &Path) -> Result<Vec<RawFrame>, ExtractionError> {
        let info = self.source.probe(path).await?;
        if info.total_frames == 0 {
            return Err(ExtractionError::NoFrames);
        }

        let stride = sample_stride(info.total_frames, self.frame_count);
        tracing::debug!(
            path = %path.display(),
            total_frames = info.total_frames,
            stride,
            "Sampling frames"
        );

        let mut frames = Vec::with_capacity(self.frame_count);
        let mut attempted = 0usize;
        for index in (0..info.total_frames).step_by(stride as usize) {
            if frames.len() == self.frame_count {
                break;
            }
            attempted += 1;
            match self
                .source
                .read_frame(path, &info, index, self.frame_size, self.frame_size)
                .await
            {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Skipping unreadable frame");
                }
            }
        }

        if frames.is_empty() {
            return Err(ExtractionError::NothingDecoded { attempted });
        }
        Ok(frames)
    }
}
