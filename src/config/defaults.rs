use std::path::PathBuf;

pub(super) fn default_test_size() -> f64 {
    crate::data::DEFAULT_TEST_SIZE
}

pub(super) fn default_random_state() -> u64 {
    crate::data::DEFAULT_RANDOM_STATE
}

pub(super) fn default_max_iter() -> u64 {
    crate::ml::pipeline::DEFAULT_MAX_ITER
}

pub(super) fn default_alpha() -> f64 {
    crate::ml::pipeline::DEFAULT_ALPHA
}

pub(super) fn default_model_path() -> PathBuf {
    PathBuf::from("models/model.json")
}

pub(super) fn default_metrics_path() -> PathBuf {
    PathBuf::from("logs/metrics.json")
}

pub(super) fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

pub(super) fn default_tracking_root() -> PathBuf {
    PathBuf::from("runs")
}

pub(super) fn default_experiment() -> String {
    "default".to_string()
}

pub(super) fn default_host() -> String {
    "127.0.0.1".to_string()
}

pub(super) fn default_port() -> u16 {
    8000
}

pub(super) fn default_false() -> bool {
    false
}
