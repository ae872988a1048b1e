//! Conversion of raw BGR frames into the classifier's input batch.

use vigil_core::frame::{ChannelOrder, FrameBatch, RawFrame, CHANNELS};

use crate::config::Normalization;
use crate::error::ExtractionError;

/// Builds fixed-length, normalized, channel-first batches.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    frame_count: usize,
    frame_size: u32,
    channel_order: ChannelOrder,
    normalization: Normalization,
}

impl Preprocessor {
    pub fn new(
        frame_count: usize,
        frame_size: u32,
        channel_order: ChannelOrder,
        normalization: Normalization,
    ) -> Self {
        Self {
            frame_count,
            frame_size,
            channel_order,
            normalization,
        }
    }

    /// Turn sampled frames into a batch of exactly `N` frames.
    ///
    /// Extra frames are dropped from the end; missing ones are appended as
    /// all-zero frames. Frames that do not match the configured resolution
    /// are rejected.
    pub fn process(&self, frames: &[RawFrame]) -> Result<FrameBatch, ExtractionError> {
        let side = self.frame_size as usize;
        let plane = side * side;
        let frame_len = CHANNELS * plane;

        let mut data = vec![0.0f32; self.frame_count * frame_len];

        for (frame, out) in frames
            .iter()
            .take(self.frame_count)
            .zip(data.chunks_mut(frame_len))
        {
            self.check_shape(frame)?;
            self.write_frame(frame, out, plane);
        }

        let padded = self.frame_count.saturating_sub(frames.len());
        if padded > 0 {
            tracing::debug!(sampled = frames.len(), padded, "Padding frame batch");
        }

        FrameBatch::new(self.frame_count, side, side, data)
            .map_err(ExtractionError::Batch)
    }

    fn check_shape(&self, frame: &RawFrame) -> Result<(), ExtractionError> {
        let expected = RawFrame::expected_len(self.frame_size, self.frame_size);
        if frame.width != self.frame_size
            || frame.height != self.frame_size
            || frame.pixels.len() != expected
        {
            return Err(ExtractionError::MalformedFrame {
                index: frame.index,
                expected,
                actual: frame.pixels.len(),
            });
        }
        Ok(())
    }

    /// Write one interleaved BGR frame into `out` as `C x H x W`.
    fn write_frame(&self, frame: &RawFrame, out: &mut [f32], plane: usize) {
        // Source channel feeding each output channel.
        let source_channel: [usize; CHANNELS] = match self.channel_order {
            ChannelOrder::Rgb => [2, 1, 0],
            ChannelOrder::Bgr => [0, 1, 2],
        };
        let Normalization { mean, std } = self.normalization;

        for (c, &src) in source_channel.iter().enumerate() {
            let dst = &mut out[c * plane..(c + 1) * plane];
            for (value, pixel) in dst.iter_mut().zip(frame.pixels.chunks_exact(CHANNELS)) {
                *value = (f32::from(pixel[src]) / 255.0 - mean[c]) / std[c];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn frame(index: u64, size: u32, bgr: [u8; 3]) -> RawFrame {
        let pixels = bgr
            .iter()
            .copied()
            .cycle()
            .take(RawFrame::expected_len(size, size))
            .collect();
        RawFrame {
            index,
            width: size,
            height: size,
            pixels,
        }
    }

    fn preprocessor(n: usize, size: u32) -> Preprocessor {
        Preprocessor::new(n, size, ChannelOrder::Rgb, Normalization::default())
    }

    #[test]
    fn short_input_is_padded_with_zero_frames() {
        let frames: Vec<RawFrame> = (0..5).map(|i| frame(i, 4, [255, 255, 255])).collect();
        let batch = preprocessor(16, 4).process(&frames).unwrap();

        assert_eq!(batch.len(), 16);
        assert_eq!(batch.tensor_shape(), [1, 16, 3, 4, 4]);
        for (i, f) in batch.frames().enumerate() {
            let expected = if i < 5 { 1.0 } else { 0.0 };
            assert!(f.iter().all(|v| *v == expected), "frame {i}");
        }
    }

    #[test]
    fn long_input_is_truncated() {
        let frames: Vec<RawFrame> = (0..20).map(|i| frame(i, 2, [i as u8, 0, 0])).collect();
        let batch = preprocessor(16, 2).process(&frames).unwrap();

        assert_eq!(batch.len(), 16);
        // Blue is the last RGB plane; frame 15 keeps its value.
        let last = batch.frame(15).unwrap();
        assert_eq!(last[2 * 4], 15.0 / 255.0);
    }

    #[test]
    fn batch_length_always_equals_target() {
        for n in [1usize, 2, 7, 16, 32] {
            for sampled in [0usize, 1, n, n + 3] {
                let frames: Vec<RawFrame> =
                    (0..sampled as u64).map(|i| frame(i, 2, [1, 2, 3])).collect();
                let batch = preprocessor(n, 2).process(&frames).unwrap();
                assert_eq!(batch.len(), n, "n={n} sampled={sampled}");
            }
        }
    }

    #[test]
    fn converts_bgr_to_rgb_channel_first() {
        let frames = vec![frame(0, 2, [10, 20, 30])];
        let batch = preprocessor(1, 2).process(&frames).unwrap();
        let f = batch.frame(0).unwrap();

        assert!(f[0..4].iter().all(|v| *v == 30.0 / 255.0));
        assert!(f[4..8].iter().all(|v| *v == 20.0 / 255.0));
        assert!(f[8..12].iter().all(|v| *v == 10.0 / 255.0));
    }

    #[test]
    fn keeps_bgr_when_configured() {
        let pre = Preprocessor::new(1, 2, ChannelOrder::Bgr, Normalization::default());
        let batch = pre.process(&[frame(0, 2, [10, 20, 30])]).unwrap();
        let f = batch.frame(0).unwrap();
        assert_eq!(f[0], 10.0 / 255.0);
        assert_eq!(f[8], 30.0 / 255.0);
    }

    #[test]
    fn applies_per_channel_normalization() {
        let norm = Normalization::new([0.5, 0.5, 0.5], [0.5, 0.25, 0.5]).unwrap();
        let pre = Preprocessor::new(1, 1, ChannelOrder::Rgb, norm);
        let batch = pre.process(&[frame(0, 1, [0, 255, 255])]).unwrap();

        assert_eq!(batch.data(), [1.0f32, 2.0, -1.0].as_slice());
    }

    #[test]
    fn rejects_wrong_resolution() {
        let frames = vec![frame(3, 8, [0, 0, 0])];
        let err = preprocessor(4, 4).process(&frames).unwrap_err();
        assert_matches!(err, ExtractionError::MalformedFrame { index: 3, .. });
    }

    #[test]
    fn rejects_truncated_pixels() {
        let mut bad = frame(1, 2, [0, 0, 0]);
        bad.pixels.truncate(5);
        let err = preprocessor(4, 2).process(&[bad]).unwrap_err();
        assert_matches!(
            err,
            ExtractionError::MalformedFrame {
                expected: 12,
                actual: 5,
                ..
            }
        );
    }
}
