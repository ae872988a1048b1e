use std::sync::Arc;

use vigil_core::narrative::NarrativeTable;
use vigil_core::probability::ProbabilityVector;
use vigil_core::result::ClassificationResult;

/// Picks the winning label and attaches its narrative.
#[derive(Debug, Clone)]
pub struct ResultComposer {
    narratives: Arc<NarrativeTable>,
}

impl ResultComposer {
    pub fn new(narratives: Arc<NarrativeTable>) -> Self {
        Self { narratives }
    }

    /// Build the response for a distribution. Performs no I/O.
    pub fn compose(&self, probabilities: &ProbabilityVector) -> ClassificationResult {
        let (crime_type, confidence) = probabilities.top();
        ClassificationResult::new(crime_type, confidence, self.narratives.describe(crime_type))
    }
}
