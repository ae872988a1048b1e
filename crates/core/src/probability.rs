//! Per-label probability distributions produced by the classifier.

use crate::error::CoreError;
use crate::labels::{CrimeType, LABEL_COUNT};

/// Allowed deviation of the probability sum from 1.
pub const SUM_TOLERANCE: f32 = 1e-3;

/// One probability per label, in [`CrimeType::ALL`] order.
///
/// Every value is finite and non-negative and the values sum to 1 within
/// [`SUM_TOLERANCE`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector {
    values: [f32; LABEL_COUNT],
}

impl ProbabilityVector {
    /// Accept scores that are already a probability distribution.
    pub fn from_probabilities(scores: &[f32]) -> Result<Self, CoreError> {
        let values = to_label_array(scores)?;
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(CoreError::Validation(format!(
                "Probability {bad} is not a finite non-negative value"
            )));
        }
        let sum: f32 = values.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(CoreError::Validation(format!(
                "Probabilities sum to {sum}, expected 1"
            )));
        }
        Ok(Self { values })
    }

    /// Turn raw logits into a distribution with a numerically stable softmax.
    pub fn from_logits(logits: &[f32]) -> Result<Self, CoreError> {
        let logits = to_label_array(logits)?;
        if logits.iter().any(|v| !v.is_finite()) {
            return Err(CoreError::Validation(
                "Logits contain non-finite values".to_string(),
            ));
        }

        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mut values = logits.map(|v| (v - max).exp());
        let sum: f32 = values.iter().sum();
        for v in &mut values {
            *v /= sum;
        }
        Ok(Self { values })
    }

    /// Probability of a single label.
    pub fn get(&self, label: CrimeType) -> f32 {
        self.values[label.index()]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Most probable label and its probability.
    ///
    /// Ties resolve to the lowest label index.
    pub fn top(&self) -> (CrimeType, f32) {
        let mut best = 0;
        for (i, v) in self.values.iter().enumerate().skip(1) {
            if *v > self.values[best] {
                best = i;
            }
        }
        (CrimeType::ALL[best], self.values[best])
    }
}

fn to_label_array(scores: &[f32]) -> Result<[f32; LABEL_COUNT], CoreError> {
    scores.try_into().map_err(|_| {
        CoreError::Validation(format!(
            "Expected {LABEL_COUNT} scores, got {}",
            scores.len()
        ))
    })
}
