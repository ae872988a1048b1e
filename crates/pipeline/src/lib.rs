//! Incident video classification pipeline.
//!
//! Stages, in data-flow order:
//!
//! ```text
//! VideoFetcher   URL            -> scratch file (VideoAsset)
//! FrameSampler   scratch file   -> Vec<RawFrame>
//! Preprocessor   Vec<RawFrame>  -> FrameBatch (exactly N frames)
//! InferenceEngine FrameBatch    -> ProbabilityVector
//! ResultComposer ProbabilityVector -> ClassificationResult
//! ```
//!
//! [`Pipeline`] runs them in order and removes the scratch file on every exit
//! path.

pub mod composer;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod preprocess;
pub mod sampler;
pub mod scratch;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use pipeline::Pipeline;
