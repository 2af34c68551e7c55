//! Persisted form of a fitted pipeline.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;
use crate::data::BuiltinDataset;

use super::metrics::utc_timestamp;
use super::pipeline::FittedPipeline;

/// Current on-disk artifact format.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Model file not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid artifact at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Unsupported artifact format_version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("Artifact at {path} failed validation: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error("Failed to prepare artifact directory: {0}")]
    Dir(#[from] app_dirs::AppDirError),
}

/// Fitted pipeline plus the metadata needed to trust it at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineArtifact {
    pub format_version: u32,
    pub created_at: String,
    pub dataset: BuiltinDataset,
    pub pipeline: FittedPipeline,
}

impl PipelineArtifact {
    pub fn new(dataset: BuiltinDataset, pipeline: FittedPipeline) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            created_at: utc_timestamp(),
            dataset,
            pipeline,
        }
    }
}

/// Write the artifact as JSON, replacing any previous file atomically.
pub fn save_artifact(artifact: &PipelineArtifact, path: &Path) -> Result<(), ArtifactError> {
    app_dirs::ensure_parent(path)?;
    let bytes = serde_json::to_vec(artifact)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |source| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

/// Load an artifact after checking that the file exists.
pub fn load_artifact(path: &Path) -> Result<PipelineArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(absolute(path)));
    }
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: PipelineArtifact =
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if artifact.format_version != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: artifact.format_version,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    artifact
        .pipeline
        .validate()
        .map_err(|reason| ArtifactError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
    Ok(artifact)
}

/// Hex blake3 digest of the artifact file.
pub fn artifact_digest(path: &Path) -> Result<String, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
