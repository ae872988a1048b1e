mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use vigil_core::labels::CrimeType;
use vigil_core::narrative::NarrativeTable;
use vigil_pipeline::engine::InferenceEngine;
use vigil_pipeline::error::{DownloadError, ExtractionError, PipelineError};
use vigil_pipeline::{Pipeline, PipelineConfig};

use common::{CountingClassifier, PanickingClassifier, SyntheticSource};

fn test_config(scratch: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        frame_count: 8,
        frame_size: 4,
        scratch_dir: scratch.to_path_buf(),
        ..PipelineConfig::default()
    }
}

fn pipeline(config: &PipelineConfig, engine: InferenceEngine, total_frames: u64) -> Pipeline {
    Pipeline::new(config, engine, Arc::new(NarrativeTable::builtin()))
        .with_frame_source(Arc::new(SyntheticSource { total_frames }), config)
}

// ---------------------------------------------------------------------------
// Test: happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn classifies_and_removes_scratch_file() {
    let base = common::spawn_video_server().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let classifier = Arc::new(CountingClassifier::new([0.05, 0.05, 0.1, 0.8], 8));
    let pipeline = pipeline(&config, InferenceEngine::with_classifier(classifier.clone()), 100);

    let result = pipeline.run(&format!("{base}/clip.mp4")).await.unwrap();

    assert_eq!(result.crime_type(), CrimeType::Arrest);
    assert!((result.confidence() - 0.8).abs() < 1e-6);
    assert_eq!(
        result.description(),
        NarrativeTable::builtin().describe(CrimeType::Arrest)
    );
    assert_eq!(classifier.calls(), 1);
    assert_eq!(common::file_count(tmp.path()), 0);
}

#[tokio::test]
async fn short_video_is_padded_before_inference() {
    let base = common::spawn_video_server().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    // CountingClassifier asserts the batch holds exactly 8 frames.
    let classifier = Arc::new(CountingClassifier::new([0.7, 0.1, 0.1, 0.1], 8));
    let pipeline = pipeline(&config, InferenceEngine::with_classifier(classifier.clone()), 3);

    let result = pipeline.run(&format!("{base}/clip.mp4")).await.unwrap();
    assert_eq!(result.crime_type(), CrimeType::Abuse);
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn concurrent_requests_for_same_url_do_not_collide() {
    let base = common::spawn_video_server().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let classifier = Arc::new(CountingClassifier::new([0.1, 0.6, 0.2, 0.1], 8));
    let pipeline = Arc::new(pipeline(
        &config,
        InferenceEngine::with_classifier(classifier.clone()),
        40,
    ));
    let url = format!("{base}/clip.mp4");

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pipeline = pipeline.clone();
            let url = url.clone();
            tokio::spawn(async move { pipeline.run(&url).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.crime_type(), CrimeType::Assault);
    }
    assert_eq!(classifier.calls(), 4);
    assert_eq!(common::file_count(tmp.path()), 0);
}

// ---------------------------------------------------------------------------
// Test: failure paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn zero_frame_video_never_reaches_the_model() {
    let base = common::spawn_video_server().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let classifier = Arc::new(CountingClassifier::new([0.25; 4], 8));
    let pipeline = pipeline(&config, InferenceEngine::with_classifier(classifier.clone()), 0);

    let err = pipeline.run(&format!("{base}/clip.mp4")).await.unwrap_err();

    assert_matches!(err, PipelineError::Extraction(ExtractionError::NoFrames));
    assert_eq!(classifier.calls(), 0);
    assert_eq!(common::file_count(tmp.path()), 0);
}

#[tokio::test]
async fn download_failure_short_circuits() {
    let base = common::spawn_video_server().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let classifier = Arc::new(CountingClassifier::new([0.25; 4], 8));
    let pipeline = pipeline(&config, InferenceEngine::with_classifier(classifier.clone()), 10);

    let err = pipeline
        .run(&format!("{base}/missing.mp4"))
        .await
        .unwrap_err();

    assert_matches!(err, PipelineError::Download(DownloadError::HttpStatus(404)));
    assert_eq!(classifier.calls(), 0);
    assert_eq!(common::file_count(tmp.path()), 0);
}

#[tokio::test]
async fn unavailable_model_fails_and_cleans_up() {
    let base = common::spawn_video_server().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let pipeline = pipeline(&config, InferenceEngine::unavailable("no model"), 10);
    assert!(!pipeline.is_model_loaded());

    let err = pipeline.run(&format!("{base}/clip.mp4")).await.unwrap_err();

    assert_matches!(err, PipelineError::ModelUnavailable(_));
    assert_eq!(common::file_count(tmp.path()), 0);
}

#[tokio::test]
async fn panicking_model_is_internal_error() {
    let base = common::spawn_video_server().await;
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());

    let pipeline = pipeline(
        &config,
        InferenceEngine::with_classifier(Arc::new(PanickingClassifier)),
        10,
    );

    let err = pipeline.run(&format!("{base}/clip.mp4")).await.unwrap_err();

    assert_matches!(err, PipelineError::Internal(_));
    assert_eq!(common::file_count(tmp.path()), 0);
}
