//! Local file-based experiment tracker.
//!
//! Each run lives in `<root>/<experiment>/<run_id>/` with `params.json`,
//! `metrics.json`, `meta.json` and an `artifacts/` folder.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_dirs;
use crate::ml::metrics::utc_timestamp;

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Failed to prepare run directory: {0}")]
    Dir(#[from] app_dirs::AppDirError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to copy artifact {path}: {source}")]
    Copy {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Artifact path has no file name: {0}")]
    NoFileName(PathBuf),
    #[error("Failed to serialize run data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Final state recorded in `meta.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Finished,
    Failed,
}

/// Contents of `meta.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunMeta {
    pub run_id: Uuid,
    pub experiment: String,
    pub started_at: String,
    pub finished_at: String,
    pub status: RunStatus,
    pub artifacts: Vec<String>,
}

/// Tracker rooted at a directory, grouping runs by experiment name.
#[derive(Debug, Clone)]
pub struct Tracker {
    root: PathBuf,
    experiment: String,
}

impl Tracker {
    pub fn new(root: impl Into<PathBuf>, experiment: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            experiment: experiment.into(),
        }
    }

    /// Create a new run directory and return a handle for logging into it.
    pub fn start_run(&self) -> Result<Run, TrackingError> {
        let id = Uuid::new_v4();
        let dir = self.root.join(&self.experiment).join(id.to_string());
        app_dirs::ensure_dir(&dir.join("artifacts"))?;
        tracing::info!("Started tracking run {id} in {}", dir.display());
        Ok(Run {
            id,
            experiment: self.experiment.clone(),
            dir,
            started_at: utc_timestamp(),
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
            artifacts: Vec::new(),
        })
    }
}

/// An open tracking run. Nothing but artifacts is written until [`Run::finish`].
#[derive(Debug)]
pub struct Run {
    id: Uuid,
    experiment: String,
    dir: PathBuf,
    started_at: String,
    params: BTreeMap<String, serde_json::Value>,
    metrics: BTreeMap<String, f64>,
    artifacts: Vec<String>,
}

impl Run {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn log_param(&mut self, key: &str, value: impl Into<serde_json::Value>) {
        self.params.insert(key.to_string(), value.into());
    }

    pub fn log_metric(&mut self, key: &str, value: f64) {
        self.metrics.insert(key.to_string(), value);
    }

    /// Copy a file into the run's `artifacts/` folder.
    pub fn log_artifact(&mut self, path: &Path) -> Result<PathBuf, TrackingError> {
        let name = path
            .file_name()
            .ok_or_else(|| TrackingError::NoFileName(path.to_path_buf()))?;
        let target = self.dir.join("artifacts").join(name);
        std::fs::copy(path, &target).map_err(|source| TrackingError::Copy {
            path: path.to_path_buf(),
            source,
        })?;
        self.artifacts.push(name.to_string_lossy().into_owned());
        Ok(target)
    }

    /// Write params, metrics and meta files and close the run.
    pub fn finish(self, status: RunStatus) -> Result<RunMeta, TrackingError> {
        write_json(&self.dir.join("params.json"), &self.params)?;
        write_json(&self.dir.join("metrics.json"), &self.metrics)?;
        let meta = RunMeta {
            run_id: self.id,
            experiment: self.experiment,
            started_at: self.started_at,
            finished_at: utc_timestamp(),
            status,
            artifacts: self.artifacts,
        };
        write_json(&self.dir.join("meta.json"), &meta)?;
        tracing::info!("Closed tracking run {} with status {:?}", meta.run_id, status);
        Ok(meta)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TrackingError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, bytes).map_err(|source| TrackingError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn run_writes_params_metrics_meta_and_artifacts() {
        let dir = tempdir().unwrap();
        let model = dir.path().join("model.json");
        std::fs::write(&model, b"{}").unwrap();

        let tracker = Tracker::new(dir.path().join("runs"), "iris");
        let mut run = tracker.start_run().unwrap();
        let run_dir = run.dir().to_path_buf();
        run.log_param("max_iter", 1000);
        run.log_param("dataset", "iris");
        run.log_metric("accuracy", 0.95);
        let copied = run.log_artifact(&model).unwrap();
        let meta = run.finish(RunStatus::Finished).unwrap();

        assert!(run_dir.starts_with(dir.path().join("runs").join("iris")));
        assert!(copied.is_file());
        assert_eq!(meta.status, RunStatus::Finished);
        assert_eq!(meta.artifacts, vec!["model.json".to_string()]);

        let params: serde_json::Value =
            serde_json::from_slice(&std::fs::read(run_dir.join("params.json")).unwrap()).unwrap();
        assert_eq!(params["max_iter"], 1000);
        assert_eq!(params["dataset"], "iris");
        let metrics: BTreeMap<String, f64> =
            serde_json::from_slice(&std::fs::read(run_dir.join("metrics.json")).unwrap()).unwrap();
        assert_eq!(metrics["accuracy"], 0.95);
        let stored: RunMeta =
            serde_json::from_slice(&std::fs::read(run_dir.join("meta.json")).unwrap()).unwrap();
        assert_eq!(stored, meta);
    }

    #[test]
    fn runs_get_distinct_directories() {
        let dir = tempdir().unwrap();
        let tracker = Tracker::new(dir.path(), "exp");
        let a = tracker.start_run().unwrap();
        let b = tracker.start_run().unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.dir(), b.dir());
    }

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempdir().unwrap();
        let mut run = Tracker::new(dir.path(), "exp").start_run().unwrap();
        assert!(matches!(
            run.log_artifact(&dir.path().join("absent.json")),
            Err(TrackingError::Copy { .. })
        ));
    }
}
