use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vigil_core::error::CoreError;
use vigil_core::frame::{ChannelOrder, CHANNELS};

/// Which classifier implementation backs the inference engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelBackend {
    /// ONNX Runtime session over `ModelConfig::path`.
    #[default]
    Onnx,
    /// Deterministic content-derived classifier for integration testing.
    Stub,
}

impl FromStr for ModelBackend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onnx" => Ok(ModelBackend::Onnx),
            "stub" => Ok(ModelBackend::Stub),
            other => Err(CoreError::Config(format!(
                "Unknown model backend: '{other}'. Expected onnx or stub"
            ))),
        }
    }
}

/// How the model's raw output scores are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelOutput {
    /// Unnormalized scores; softmax is applied.
    #[default]
    Logits,
    /// Already a probability distribution; validated as-is.
    Probabilities,
}

impl FromStr for ModelOutput {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logits" => Ok(ModelOutput::Logits),
            "probabilities" => Ok(ModelOutput::Probabilities),
            other => Err(CoreError::Config(format!(
                "Unknown model output kind: '{other}'. Expected logits or probabilities"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub backend: ModelBackend,
    pub path: PathBuf,
    pub output: ModelOutput,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Onnx,
            path: PathBuf::from("models/incident_classifier.onnx"),
            output: ModelOutput::Logits,
        }
    }
}

/// Per-channel `(x - mean) / std` applied after scaling pixels to `[0, 1]`.
///
/// Channels are in the model's input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    pub mean: [f32; CHANNELS],
    pub std: [f32; CHANNELS],
}

impl Normalization {
    pub fn new(mean: [f32; CHANNELS], std: [f32; CHANNELS]) -> Result<Self, CoreError> {
        if std.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(CoreError::Config(format!(
                "Normalization std must be finite and non-zero, got {std:?}"
            )));
        }
        if mean.iter().any(|m| !m.is_finite()) {
            return Err(CoreError::Config(format!(
                "Normalization mean must be finite, got {mean:?}"
            )));
        }
        Ok(Self { mean, std })
    }
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            mean: [0.0; CHANNELS],
            std: [1.0; CHANNELS],
        }
    }
}

/// Parse a comma-separated channel triple such as `"0.45,0.45,0.45"`.
pub fn parse_channel_triple(s: &str) -> Result<[f32; CHANNELS], CoreError> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|e| CoreError::Config(format!("Invalid channel value '{part}': {e}")))
        })
        .collect::<Result<Vec<f32>, CoreError>>()?;

    values.try_into().map_err(|v: Vec<f32>| {
        CoreError::Config(format!(
            "Expected {CHANNELS} comma-separated values, got {}",
            v.len()
        ))
    })
}

/// Settings for every pipeline stage.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Frames per batch (`N`).
    pub frame_count: usize,
    /// Square side length frames are scaled to.
    pub frame_size: u32,
    /// Channel order the model expects.
    pub channel_order: ChannelOrder,
    pub normalization: Normalization,
    /// Directory holding one scratch file per in-flight request.
    pub scratch_dir: PathBuf,
    pub download_timeout: Duration,
    /// Reject downloads larger than this many bytes.
    pub max_download_bytes: Option<u64>,
    pub model: ModelConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_count: 16,
            frame_size: 112,
            channel_order: ChannelOrder::Rgb,
            normalization: Normalization::default(),
            scratch_dir: std::env::temp_dir().join("vigil-scratch"),
            download_timeout: Duration::from_secs(30),
            max_download_bytes: None,
            model: ModelConfig::default(),
        }
    }
}
