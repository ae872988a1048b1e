use serde::Serialize;

use crate::labels::CrimeType;

/// Outcome of classifying a single video.
///
/// Serializes to the `{crime_type, confidence, description}` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    crime_type: CrimeType,
    confidence: f32,
    description: String,
}

impl ClassificationResult {
    /// Build a result. `confidence` is clamped into `[0, 1]`.
    pub fn new(crime_type: CrimeType, confidence: f32, description: impl Into<String>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            crime_type,
            confidence,
            description: description.into(),
        }
    }

    pub fn crime_type(&self) -> CrimeType {
        self.crime_type
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}
