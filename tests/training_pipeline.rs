mod support;

use logipipe::config::PipelineConfig;
use logipipe::data::{self, BuiltinDataset};
use logipipe::inference;
use logipipe::ml::build_pipeline;
use logipipe::ml::metrics::{TrainingMetrics, accuracy_score};
use logipipe::tracking::{RunMeta, RunStatus};
use logipipe::training;

fn config_in(dir: &std::path::Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.model.max_iter = 200;
    config.paths.model_path = dir.join("models").join("model.json");
    config.paths.metrics_path = dir.join("logs").join("metrics.json");
    config.paths.logs_dir = dir.join("logs");
    config.tracking.root = dir.join("runs");
    config
}

#[test]
fn training_pipeline_runs_and_has_reasonable_accuracy() {
    let (x, y) = data::get_data(BuiltinDataset::Iris);
    let split = data::split_data(&x, &y, 0.2, 42).expect("split");

    let pipeline = build_pipeline(200)
        .fit(&split.x_train, &split.y_train)
        .expect("fit");
    let predicted = pipeline.predict(&split.x_test).expect("predict");
    let acc = accuracy_score(&split.y_test.to_vec(), &predicted.to_vec());

    assert!(acc > 0.8, "accuracy {acc} should beat chance by a wide margin");
}

#[test]
fn training_run_writes_artifact_and_metrics() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = config_in(dir.path());

    let report = training::run(&config).expect("training run");
    assert_eq!(report.n_train, 120);
    assert_eq!(report.n_test, 30);
    assert!(report.run_id.is_none());
    assert!(report.model_path.is_file());

    let metrics: TrainingMetrics =
        serde_json::from_slice(&std::fs::read(&report.metrics_path).expect("read metrics"))
            .expect("parse metrics");
    assert_eq!(metrics.accuracy, report.accuracy);
    assert_eq!(metrics.n_train, 120);
    assert_eq!(metrics.random_state, 42);
    assert_eq!(metrics.model.kind, "logistic_regression");
    assert_eq!(metrics.model.max_iter, 200);
    assert_eq!(metrics.per_class.len(), 3);
    assert_eq!(
        metrics.artifact_blake3.as_deref().map(str::len),
        Some(64)
    );

    let prediction =
        inference::predict(&report.model_path, &[5.1, 3.5, 1.4, 0.2]).expect("predict");
    assert_eq!(prediction, 0);
}

#[test]
fn training_is_reproducible_for_a_fixed_seed() {
    let first_dir = tempfile::tempdir().expect("tempdir");
    let second_dir = tempfile::tempdir().expect("tempdir");
    let first = training::run(&config_in(first_dir.path())).expect("first run");
    let second = training::run(&config_in(second_dir.path())).expect("second run");
    assert_eq!(first.accuracy, second.accuracy);
}

#[test]
fn tracked_run_records_params_metrics_and_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());
    config.tracking.enabled = true;
    config.tracking.experiment = "iris-baseline".to_string();

    let report = training::run(&config).expect("training run");
    let run_id = report.run_id.expect("run id");
    let run_dir = dir
        .path()
        .join("runs")
        .join("iris-baseline")
        .join(run_id.to_string());

    let meta: RunMeta =
        serde_json::from_slice(&std::fs::read(run_dir.join("meta.json")).expect("meta"))
            .expect("parse meta");
    assert_eq!(meta.status, RunStatus::Finished);
    assert_eq!(meta.artifacts, vec!["model.json", "metrics.json"]);
    assert!(run_dir.join("artifacts").join("model.json").is_file());

    let params: serde_json::Value =
        serde_json::from_slice(&std::fs::read(run_dir.join("params.json")).expect("params"))
            .expect("parse params");
    assert_eq!(params["max_iter"], 200);
    assert_eq!(params["dataset"], "iris");
    let metrics: serde_json::Value =
        serde_json::from_slice(&std::fs::read(run_dir.join("metrics.json")).expect("metrics"))
            .expect("parse metrics");
    assert_eq!(metrics["accuracy"], report.accuracy);
}

#[test]
fn tracked_run_is_marked_failed_when_training_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());
    config.tracking.enabled = true;
    config.tracking.experiment = "broken-output".to_string();
    // A directory where the artifact file should go makes the save fail.
    std::fs::create_dir_all(&config.paths.model_path).expect("block model path");

    let err = training::run(&config).expect_err("training should fail");
    assert!(matches!(err, training::TrainingError::Artifact(_)), "{err}");

    let experiment_dir = dir.path().join("runs").join("broken-output");
    let runs: Vec<_> = std::fs::read_dir(&experiment_dir)
        .expect("experiment dir")
        .map(|entry| entry.expect("entry").path())
        .collect();
    assert_eq!(runs.len(), 1);
    let meta: RunMeta =
        serde_json::from_slice(&std::fs::read(runs[0].join("meta.json")).expect("meta"))
            .expect("parse meta");
    assert_eq!(meta.status, RunStatus::Failed);
    assert!(meta.artifacts.is_empty());
    assert!(!meta.finished_at.is_empty());
}

#[test]
fn wine_quality_trains_and_predicts_known_classes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = config_in(dir.path());
    config.data.dataset = BuiltinDataset::WineQuality;
    config.model.max_iter = 100;

    let (x, _) = data::get_data(BuiltinDataset::WineQuality);
    let report = training::run(&config).expect("training run");
    assert_eq!(report.n_train + report.n_test, x.nrows());
    let model = inference::load_model(&report.model_path).expect("load model");
    assert_eq!(model.n_features(), 11);
    assert!(model.classes().len() >= 2);
}
