//! ONNX Runtime backend.

use std::path::Path;
use std::sync::{Mutex, OnceLock};

use ndarray::ArrayViewD;
use ort::{inputs, session::Session, value::TensorRef};
use vigil_core::frame::FrameBatch;
use vigil_core::probability::ProbabilityVector;

use super::{interpret_scores, Classifier};
use crate::config::ModelOutput;
use crate::error::InferenceError;

static ORT_INIT: OnceLock<()> = OnceLock::new();

fn ensure_ort_init() {
    ORT_INIT.get_or_init(|| {
        let _ = ort::init().commit();
    });
}

/// Sequence classifier running an ONNX graph.
///
/// The first graph input receives the `[1, N, C, H, W]` batch; the first
/// output is read as `f32` label scores. `Session::run` needs exclusive
/// access, so calls are serialized behind a mutex.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    output: ModelOutput,
}

impl OnnxClassifier {
    pub fn load(path: &Path, output: ModelOutput) -> Result<Self, InferenceError> {
        if !path.is_file() {
            return Err(InferenceError::Load(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        ensure_ort_init();
        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| InferenceError::Load(e.to_string()))?;

        let input_name = session
            .inputs()
            .first()
            .map(|input| input.name().to_string())
            .ok_or_else(|| InferenceError::Load("model declares no inputs".to_string()))?;
        let output_name = session
            .outputs()
            .first()
            .map(|output| output.name().to_string())
            .ok_or_else(|| InferenceError::Load("model declares no outputs".to_string()))?;

        tracing::debug!(input = %input_name, output = %output_name, "ONNX session ready");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn name(&self) -> &str {
        "onnx"
    }

    fn classify(&self, batch: &FrameBatch) -> Result<ProbabilityVector, InferenceError> {
        let view = ArrayViewD::from_shape(batch.tensor_shape().to_vec(), batch.data())
            .map_err(|e| InferenceError::Execution(format!("failed to shape input: {e}")))?;
        let tensor = TensorRef::from_array_view(view)
            .map_err(|e| InferenceError::Execution(format!("failed to create tensor ref: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Execution("session lock poisoned".to_string()))?;
        let outputs = session
            .run(inputs![self.input_name.as_str() => tensor])
            .map_err(|e| InferenceError::Execution(e.to_string()))?;

        let scores = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()
            .map_err(|e| {
                InferenceError::InvalidOutput(format!(
                    "output '{}' is not f32: {e}",
                    self.output_name
                ))
            })?;
        let scores: Vec<f32> = scores.iter().copied().collect();

        interpret_scores(&scores, self.output)
    }
}
