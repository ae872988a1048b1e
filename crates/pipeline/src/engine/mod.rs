//! Sequence classifier and its load-once lifecycle.
//!
//! The model is loaded exactly once at startup. A load failure leaves the
//! engine in the unavailable state and every prediction fails with
//! [`PipelineError::ModelUnavailable`]; no other classifier is substituted.

pub mod onnx;
pub mod stub;

use std::sync::Arc;

use vigil_core::frame::FrameBatch;
use vigil_core::probability::ProbabilityVector;

use crate::config::{ModelBackend, ModelConfig, ModelOutput};
use crate::error::{InferenceError, PipelineError};

pub use onnx::OnnxClassifier;
pub use stub::StubClassifier;

// ---------------------------------------------------------------------------
// Classifier seam
// ---------------------------------------------------------------------------

/// A model mapping one frame batch to a distribution over the label set.
///
/// Implementations must be deterministic for a fixed input and safe to call
/// from several threads at once.
pub trait Classifier: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn classify(&self, batch: &FrameBatch) -> Result<ProbabilityVector, InferenceError>;
}

/// Turn raw model scores into a validated distribution.
pub(crate) fn interpret_scores(
    scores: &[f32],
    output: ModelOutput,
) -> Result<ProbabilityVector, InferenceError> {
    let result = match output {
        ModelOutput::Logits => ProbabilityVector::from_logits(scores),
        ModelOutput::Probabilities => ProbabilityVector::from_probabilities(scores),
    };
    result.map_err(|e| InferenceError::InvalidOutput(e.to_string()))
}

// ---------------------------------------------------------------------------
// Model handle
// ---------------------------------------------------------------------------

/// Loaded-or-not state of the classifier, fixed after startup.
#[derive(Clone)]
pub enum ModelHandle {
    Loaded(Arc<dyn Classifier>),
    Unavailable { reason: String },
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelHandle::Loaded(c) => f.debug_tuple("Loaded").field(&c.name()).finish(),
            ModelHandle::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// InferenceEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct InferenceEngine {
    handle: ModelHandle,
}

impl InferenceEngine {
    /// Load the configured backend.
    ///
    /// Never fails: a missing or unloadable model is logged at `error` and
    /// yields an engine that reports itself unavailable.
    pub fn load(config: &ModelConfig) -> Self {
        let handle = match config.backend {
            ModelBackend::Onnx => match OnnxClassifier::load(&config.path, config.output) {
                Ok(classifier) => {
                    tracing::info!(path = %config.path.display(), "ONNX model loaded");
                    ModelHandle::Loaded(Arc::new(classifier))
                }
                Err(e) => {
                    tracing::error!(
                        path = %config.path.display(),
                        error = %e,
                        "Model failed to load; predictions are disabled"
                    );
                    ModelHandle::Unavailable {
                        reason: e.to_string(),
                    }
                }
            },
            ModelBackend::Stub => {
                tracing::warn!("Using the stub classifier; results are not real predictions");
                ModelHandle::Loaded(Arc::new(StubClassifier))
            }
        };
        Self { handle }
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            handle: ModelHandle::Loaded(classifier),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            handle: ModelHandle::Unavailable {
                reason: reason.into(),
            },
        }
    }

    pub fn handle(&self) -> &ModelHandle {
        &self.handle
    }

    pub fn is_model_loaded(&self) -> bool {
        matches!(self.handle, ModelHandle::Loaded(_))
    }

    /// Classify one batch.
    ///
    /// Blocking; call from a blocking-pool thread.
    pub fn predict(&self, batch: &FrameBatch) -> Result<ProbabilityVector, PipelineError> {
        match &self.handle {
            ModelHandle::Loaded(classifier) => Ok(classifier.classify(batch)?),
            ModelHandle::Unavailable { reason } => {
                Err(PipelineError::ModelUnavailable(reason.clone()))
            }
        }
    }
}
