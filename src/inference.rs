//! One-shot inference straight from an artifact on disk.

use std::path::Path;

use crate::ml::artifact::{ArtifactError, load_artifact};
use crate::ml::pipeline::{FittedPipeline, PipelineError};

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Load the fitted pipeline stored at `path`.
pub fn load_model(path: &Path) -> Result<FittedPipeline, ArtifactError> {
    Ok(load_artifact(path)?.pipeline)
}

/// Load the artifact and predict a single sample.
pub fn predict(path: &Path, sample: &[f64]) -> Result<usize, InferenceError> {
    let model = load_model(path)?;
    Ok(model.predict_one(sample)?)
}
