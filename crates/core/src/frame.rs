//! Raw decoded frames and the fixed-shape batch handed to the classifier.

use std::str::FromStr;

use crate::error::CoreError;

/// Colour channels per pixel.
pub const CHANNELS: usize = 3;

/// Channel order of a packed 8-bit frame or of the model's input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

impl FromStr for ChannelOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rgb" => Ok(ChannelOrder::Rgb),
            "bgr" => Ok(ChannelOrder::Bgr),
            other => Err(CoreError::Validation(format!(
                "Unknown channel order: '{other}'. Expected rgb or bgr"
            ))),
        }
    }
}

/// A single decoded frame, already scaled to the sampling resolution.
///
/// Pixels are packed and interleaved (`HxWx3`) in the decoder's native BGR
/// order.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Index of the frame in the source video.
    pub index: u64,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RawFrame {
    /// Byte length of a packed BGR frame of the given size.
    pub fn expected_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    /// Whether the pixel buffer matches the declared dimensions.
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() == Self::expected_len(self.width, self.height)
    }
}

/// An ordered, fixed-length sequence of normalized channel-first frames.
///
/// Stored contiguously as `N x C x H x W` `f32` values. The length is fixed at
/// construction and is never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBatch {
    frame_count: usize,
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl FrameBatch {
    /// Wrap contiguous frame data, checking it matches the declared shape.
    pub fn new(
        frame_count: usize,
        height: usize,
        width: usize,
        data: Vec<f32>,
    ) -> Result<Self, CoreError> {
        if frame_count == 0 || height == 0 || width == 0 {
            return Err(CoreError::Validation(format!(
                "Frame batch dimensions must be non-zero, got {frame_count}x{height}x{width}"
            )));
        }
        let expected = frame_count * CHANNELS * height * width;
        if data.len() != expected {
            return Err(CoreError::Validation(format!(
                "Frame batch holds {} values, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            frame_count,
            height,
            width,
            data,
        })
    }

    /// Number of frames in the batch.
    pub fn len(&self) -> usize {
        self.frame_count
    }

    /// Always `false`; kept for the `len`/`is_empty` convention.
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Values in a single frame (`C x H x W`).
    pub fn frame_len(&self) -> usize {
        CHANNELS * self.height * self.width
    }

    /// The `i`-th frame as a channel-first slice.
    pub fn frame(&self, i: usize) -> Option<&[f32]> {
        self.frames().nth(i)
    }

    /// Iterate over frames in order.
    pub fn frames(&self) -> std::slice::Chunks<'_, f32> {
        self.data.chunks(self.frame_len())
    }

    /// Model input shape: `[1, N, C, H, W]`.
    pub fn tensor_shape(&self) -> [usize; 5] {
        [1, self.frame_count, CHANNELS, self.height, self.width]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}
