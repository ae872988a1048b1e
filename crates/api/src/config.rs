use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use vigil_pipeline::config::{parse_channel_triple, ModelConfig, Normalization, PipelineConfig};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Overall request deadline in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// JSON file overriding built-in narratives (default: unset).
    pub narratives_path: Option<PathBuf>,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
    /// Settings for every pipeline stage.
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                           |
    /// |-------------------------|-----------------------------------|
    /// | `HOST`                  | `0.0.0.0`                         |
    /// | `PORT`                  | `8000`                            |
    /// | `REQUEST_TIMEOUT_SECS`  | `120`                             |
    /// | `LOG_FORMAT`            | `text` (`text` \| `json`)         |
    /// | `MODEL_BACKEND`         | `onnx` (`onnx` \| `stub`)         |
    /// | `MODEL_PATH`            | `models/incident_classifier.onnx` |
    /// | `MODEL_OUTPUT`          | `logits`                          |
    /// | `NARRATIVES_PATH`       | unset                             |
    /// | `FRAME_COUNT`           | `16`                              |
    /// | `FRAME_SIZE`            | `112`                             |
    /// | `CHANNEL_ORDER`         | `rgb`                             |
    /// | `NORMALIZE_MEAN`        | `0,0,0`                           |
    /// | `NORMALIZE_STD`         | `1,1,1`                           |
    /// | `SCRATCH_DIR`           | `<temp>/vigil-scratch`            |
    /// | `DOWNLOAD_TIMEOUT_SECS` | `30`                              |
    /// | `MAX_DOWNLOAD_BYTES`    | unset                             |
    ///
    /// Panics with a message naming the variable when a value is invalid.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "120".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let log_json = match var("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => panic!("LOG_FORMAT must be text or json, got '{other}'"),
        };

        let narratives_path = var("NARRATIVES_PATH").map(PathBuf::from);

        let defaults = PipelineConfig::default();

        let model = ModelConfig {
            backend: parse_or(&var, "MODEL_BACKEND", defaults.model.backend),
            path: var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model.path),
            output: parse_or(&var, "MODEL_OUTPUT", defaults.model.output),
        };

        let frame_count: usize = parse_or(&var, "FRAME_COUNT", defaults.frame_count);
        assert!(frame_count > 0, "FRAME_COUNT must be at least 1");
        let frame_size: u32 = parse_or(&var, "FRAME_SIZE", defaults.frame_size);
        assert!(frame_size > 0, "FRAME_SIZE must be at least 1");

        let mean = var("NORMALIZE_MEAN")
            .map(|v| parse_channel_triple(&v).expect("NORMALIZE_MEAN must be three numbers"))
            .unwrap_or(defaults.normalization.mean);
        let std = var("NORMALIZE_STD")
            .map(|v| parse_channel_triple(&v).expect("NORMALIZE_STD must be three numbers"))
            .unwrap_or(defaults.normalization.std);
        let normalization = Normalization::new(mean, std)
            .unwrap_or_else(|e| panic!("Invalid NORMALIZE_MEAN/NORMALIZE_STD: {e}"));

        let download_timeout_secs: u64 = parse_or(
            &var,
            "DOWNLOAD_TIMEOUT_SECS",
            defaults.download_timeout.as_secs(),
        );

        let max_download_bytes = var("MAX_DOWNLOAD_BYTES").map(|v| {
            v.trim()
                .parse::<u64>()
                .expect("MAX_DOWNLOAD_BYTES must be a valid u64")
        });

        let pipeline = PipelineConfig {
            frame_count,
            frame_size,
            channel_order: parse_or(&var, "CHANNEL_ORDER", defaults.channel_order),
            normalization,
            scratch_dir: var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            download_timeout: Duration::from_secs(download_timeout_secs),
            max_download_bytes,
            model,
        };

        Self {
            host,
            port,
            request_timeout_secs,
            narratives_path,
            log_json,
            pipeline,
        }
    }
}

/// Parse `name` when set, falling back to `default`.
///
/// Panics naming the variable when the value does not parse.
fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} is invalid ('{raw}'): {e}")),
        None => default,
    }
}
