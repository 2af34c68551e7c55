//! Evaluation metrics and the metrics file written after training.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::app_dirs;

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Build a matrix from label slices, mapping labels through `classes`.
    ///
    /// Labels that are not in `classes` are skipped.
    pub fn from_labels(classes: &[usize], truth: &[usize], predicted: &[usize]) -> Self {
        let mut cm = Self::new(classes.len());
        for (t, p) in truth.iter().zip(predicted) {
            let (Ok(t), Ok(p)) = (classes.binary_search(t), classes.binary_search(p)) else {
                continue;
            };
            cm.add(t, p);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }
}

#[derive(Debug, Clone)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f32,
    /// `TP / (TP + FN)`.
    pub recall: f32,
    /// Total number of true examples for the class.
    pub support: u32,
}

impl PerClassStats {
    pub fn f1(&self) -> f32 {
        if self.precision + self.recall == 0.0 {
            0.0
        } else {
            2.0 * self.precision * self.recall / (self.precision + self.recall)
        }
    }
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = cm.get(class_idx, class_idx) as f32;
        let mut fp = 0f32;
        let mut fn_ = 0f32;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += v as f32;
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += cm.get(i, class_idx) as f32;
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Fraction of positions where `truth` and `predicted` agree.
pub fn accuracy_score(truth: &[usize], predicted: &[usize]) -> f64 {
    let total = truth.len().min(predicted.len());
    if total == 0 {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / total as f64
}

/// Metrics document written to `paths.metrics_path` after each training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingMetrics {
    pub timestamp: String,
    pub accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub test_size: f64,
    pub random_state: u64,
    pub dataset: String,
    pub model: ModelSummary,
    #[serde(default)]
    pub per_class: Vec<PerClassMetric>,
    #[serde(default)]
    pub artifact_blake3: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub max_iter: u64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerClassMetric {
    pub class: usize,
    pub support: u32,
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
}

/// Pair per-class stats with their class labels.
pub fn per_class_metrics(classes: &[usize], cm: &ConfusionMatrix) -> Vec<PerClassMetric> {
    classes
        .iter()
        .zip(precision_recall_by_class(cm))
        .map(|(&class, stats)| PerClassMetric {
            class,
            support: stats.support,
            precision: stats.precision,
            recall: stats.recall,
            f1: stats.f1(),
        })
        .collect()
}

/// Current UTC time as an RFC 3339 string.
pub fn utc_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Failed to prepare metrics directory: {0}")]
    Dir(#[from] app_dirs::AppDirError),
    #[error("Failed to serialize metrics: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write metrics to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write metrics as pretty JSON, creating parent directories as needed.
pub fn save_metrics(metrics: &TrainingMetrics, path: &Path) -> Result<(), MetricsError> {
    app_dirs::ensure_parent(path)?;
    let bytes = serde_json::to_vec_pretty(metrics)?;
    std::fs::write(path, bytes).map_err(|source| MetricsError::Write {
        path: path.to_path_buf(),
        source,
    })
}
