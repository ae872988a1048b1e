//! End-to-end analysis of one video URL.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;
use vigil_core::narrative::NarrativeTable;
use vigil_core::probability::ProbabilityVector;
use vigil_core::result::ClassificationResult;
use vigil_core::video_url::video_extension_from_url;

use crate::composer::ResultComposer;
use crate::config::PipelineConfig;
use crate::engine::InferenceEngine;
use crate::error::PipelineError;
use crate::fetcher::VideoFetcher;
use crate::preprocess::Preprocessor;
use crate::sampler::{FfmpegFrameSource, FrameSampler, FrameSource};
use crate::scratch::{ScratchDir, VideoAsset};

/// Runs fetch, sample, preprocess, infer and compose for each request.
///
/// Shared by all requests; the only state carried between requests is the
/// scratch sequence counter and the read-only model and narratives.
pub struct Pipeline {
    scratch: ScratchDir,
    fetcher: VideoFetcher,
    sampler: FrameSampler,
    preprocessor: Preprocessor,
    engine: InferenceEngine,
    composer: ResultComposer,
}

impl Pipeline {
    /// Assemble a pipeline decoding with ffmpeg.
    pub fn new(
        config: &PipelineConfig,
        engine: InferenceEngine,
        narratives: Arc<NarrativeTable>,
    ) -> Self {
        let scratch = ScratchDir::new(&config.scratch_dir);
        if let Err(e) = std::fs::create_dir_all(scratch.root()) {
            tracing::warn!(
                path = %scratch.root().display(),
                error = %e,
                "Failed to create scratch directory"
            );
        }

        Self {
            scratch,
            fetcher: VideoFetcher::new(config.download_timeout, config.max_download_bytes),
            sampler: FrameSampler::new(
                Arc::new(FfmpegFrameSource),
                config.frame_count,
                config.frame_size,
            ),
            preprocessor: Preprocessor::new(
                config.frame_count,
                config.frame_size,
                config.channel_order,
                config.normalization,
            ),
            engine,
            composer: ResultComposer::new(narratives),
        }
    }

    /// Load the configured model and assemble the pipeline.
    pub fn from_config(config: &PipelineConfig, narratives: Arc<NarrativeTable>) -> Self {
        let engine = InferenceEngine::load(&config.model);
        Self::new(config, engine, narratives)
    }

    /// Replace the frame decoder, keeping the sampling parameters.
    pub fn with_frame_source(
        mut self,
        source: Arc<dyn FrameSource>,
        config: &PipelineConfig,
    ) -> Self {
        self.sampler = FrameSampler::new(source, config.frame_count, config.frame_size);
        self
    }

    pub fn is_model_loaded(&self) -> bool {
        self.engine.is_model_loaded()
    }

    /// Classify the video at `url`.
    ///
    /// The downloaded file is removed before this returns, whatever the
    /// outcome.
    pub async fn run(&self, url: &str) -> Result<ClassificationResult, PipelineError> {
        let (seq, dest) = self.scratch.allocate(video_extension_from_url(url));
        let span = tracing::info_span!("analysis", seq, url);

        async move {
            let started = Instant::now();
            tracing::info!("Analysis started");

            let outcome = match self.fetcher.fetch(url, &dest).await {
                Ok(asset) => {
                    let outcome = self.analyze(&asset).await;
                    asset.release().await;
                    outcome
                }
                Err(e) => Err(e.into()),
            };

            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &outcome {
                Ok(result) => tracing::info!(
                    crime_type = %result.crime_type(),
                    confidence = result.confidence(),
                    elapsed_ms,
                    "Analysis completed"
                ),
                Err(e) => tracing::warn!(error = %e, elapsed_ms, "Analysis failed"),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn analyze(&self, asset: &VideoAsset) -> Result<ClassificationResult, PipelineError> {
        let frames = self.sampler.sample(asset.local_path()).await?;
        tracing::debug!(sampled = frames.len(), size_bytes = asset.size_bytes(), "Frames sampled");

        let preprocessor = self.preprocessor.clone();
        let engine = self.engine.clone();
        let probabilities = tokio::task::spawn_blocking(
            move || -> Result<ProbabilityVector, PipelineError> {
                let batch = preprocessor.process(&frames)?;
                engine.predict(&batch)
            },
        )
        .await
        .map_err(|e| PipelineError::Internal(format!("inference task failed: {e}")))??;

        Ok(self.composer.compose(&probabilities))
    }
}
