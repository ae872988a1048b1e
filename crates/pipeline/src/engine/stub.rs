//! Deterministic stand-in classifier for integration testing.

use vigil_core::frame::FrameBatch;
use vigil_core::labels::LABEL_COUNT;
use vigil_core::probability::ProbabilityVector;

use super::{interpret_scores, Classifier};
use crate::config::ModelOutput;
use crate::error::InferenceError;

/// Scores each label by the mean value of one quarter of the batch.
///
/// Label `i` gets the mean of frames `[i*N/4, (i+1)*N/4)`, scaled to a logit;
/// a batch shorter than the label count scores the whole batch for every
/// label. Only selected when configured explicitly.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubClassifier;

/// Spread applied to segment means before softmax.
const LOGIT_SCALE: f32 = 4.0;

impl Classifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn classify(&self, batch: &FrameBatch) -> Result<ProbabilityVector, InferenceError> {
        let n = batch.len();
        let logits: Vec<f32> = (0..LABEL_COUNT)
            .map(|label| {
                let (start, end) = if n >= LABEL_COUNT {
                    (label * n / LABEL_COUNT, (label + 1) * n / LABEL_COUNT)
                } else {
                    (0, n)
                };
                let segment = &batch.data()[start * batch.frame_len()..end * batch.frame_len()];
                let mean = segment.iter().sum::<f32>() / segment.len().max(1) as f32;
                mean * LOGIT_SCALE
            })
            .collect();

        interpret_scores(&logits, ModelOutput::Logits)
    }
}
