//! End-to-end training stage: data, fit, evaluate, persist, track.

use std::path::PathBuf;

use uuid::Uuid;

use crate::app_dirs;
use crate::config::PipelineConfig;
use crate::data::{self, DataError};
use crate::ml::artifact::{self, ArtifactError, PipelineArtifact};
use crate::ml::metrics::{
    self, ConfusionMatrix, MetricsError, ModelSummary, TrainingMetrics, accuracy_score,
    per_class_metrics,
};
use crate::ml::pipeline::{PipelineError, build_pipeline};
use crate::tracking::{Run, RunStatus, Tracker, TrackingError};

/// Model family name written to metrics and tracker params.
pub const MODEL_TYPE: &str = "logistic_regression";

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    #[error(transparent)]
    Metrics(#[from] MetricsError),
    #[error("experiment tracking failed: {0}")]
    Tracking(#[from] TrackingError),
    #[error(transparent)]
    Dir(#[from] app_dirs::AppDirError),
}

/// Summary of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub metrics_path: PathBuf,
    pub model_path: PathBuf,
    pub run_id: Option<Uuid>,
}

/// Run the training stage described by `config`.
///
/// When tracking is enabled, the run is closed as `failed` if any later step errors.
pub fn run(config: &PipelineConfig) -> Result<TrainingReport, TrainingError> {
    tracing::info!("Loaded config: {config:?}");

    let mut tracked = if config.tracking.enabled {
        let root = app_dirs::resolve(&config.tracking.root)?;
        Some(Tracker::new(root, config.tracking.experiment.clone()).start_run()?)
    } else {
        None
    };

    let result = train_and_persist(config, tracked.as_mut());
    let Some(run) = tracked else {
        return result;
    };
    match result {
        Ok(mut report) => {
            report.run_id = Some(run.finish(RunStatus::Finished)?.run_id);
            Ok(report)
        }
        Err(err) => {
            if let Err(track_err) = run.finish(RunStatus::Failed) {
                tracing::warn!("Failed to close tracking run: {track_err}");
            }
            Err(err)
        }
    }
}

fn train_and_persist(
    config: &PipelineConfig,
    mut run: Option<&mut Run>,
) -> Result<TrainingReport, TrainingError> {
    let (x, y) = data::get_data(config.data.dataset);
    tracing::info!(
        "Loaded {} dataset with {} samples.",
        config.data.dataset,
        y.len()
    );

    let test_size = config.data.test_size;
    let random_state = config.data.random_state;
    let split = data::split_data(&x, &y, test_size, random_state)?;
    let n_train = split.y_train.len();
    let n_test = split.y_test.len();
    tracing::info!("Split data into {n_train} train and {n_test} test samples.");

    let max_iter = config.model.max_iter;
    let params = build_pipeline(max_iter).alpha(config.model.alpha);
    tracing::info!(
        "Built pipeline with StandardScaler + LogisticRegression(max_iter={max_iter}, alpha={}).",
        params.alpha
    );
    if let Some(run) = run.as_deref_mut() {
        run.log_param("dataset", config.data.dataset.as_str());
        run.log_param("test_size", test_size);
        run.log_param("random_state", random_state);
        run.log_param("model_type", MODEL_TYPE);
        run.log_param("max_iter", max_iter);
        run.log_param("alpha", params.alpha);
    }

    let pipeline = params.fit(&split.x_train, &split.y_train)?;
    tracing::info!("Finished training.");

    let predicted = pipeline.predict(&split.x_test)?;
    let truth = split.y_test.to_vec();
    let predicted = predicted.to_vec();
    let accuracy = accuracy_score(&truth, &predicted);
    tracing::info!("Test accuracy: {accuracy:.4}");
    let cm = ConfusionMatrix::from_labels(pipeline.classes(), &truth, &predicted);
    let per_class = per_class_metrics(pipeline.classes(), &cm);

    let model_path = app_dirs::resolve(&config.paths.model_path)?;
    artifact::save_artifact(
        &PipelineArtifact::new(config.data.dataset, pipeline),
        &model_path,
    )?;
    tracing::info!("Saved trained model to: {}", model_path.display());
    let digest = artifact::artifact_digest(&model_path)?;

    let metrics_doc = TrainingMetrics {
        timestamp: metrics::utc_timestamp(),
        accuracy,
        n_train,
        n_test,
        test_size,
        random_state,
        dataset: config.data.dataset.as_str().to_string(),
        model: ModelSummary {
            kind: MODEL_TYPE.to_string(),
            max_iter,
            alpha: config.model.alpha,
        },
        per_class,
        artifact_blake3: Some(digest),
    };
    let metrics_path = app_dirs::resolve(&config.paths.metrics_path)?;
    metrics::save_metrics(&metrics_doc, &metrics_path)?;
    tracing::info!("Saved metrics to {}", metrics_path.display());

    if let Some(run) = run {
        run.log_metric("accuracy", accuracy);
        run.log_metric("n_train", n_train as f64);
        run.log_metric("n_test", n_test as f64);
        for class in &metrics_doc.per_class {
            run.log_metric(&format!("f1_class_{}", class.class), class.f1 as f64);
        }
        run.log_artifact(&model_path)?;
        run.log_artifact(&metrics_path)?;
    }

    Ok(TrainingReport {
        accuracy,
        n_train,
        n_test,
        metrics_path,
        model_path,
        run_id: None,
    })
}
