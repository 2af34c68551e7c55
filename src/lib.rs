//! Train a scaling + logistic regression pipeline on a built-in dataset and
//! serve its predictions over HTTP.

/// Project root and directory helpers.
pub mod app_dirs;
/// TOML configuration.
pub mod config;
/// Built-in datasets and splitting.
pub mod data;
/// Single-sample inference from a stored artifact.
pub mod inference;
/// Tracing subscriber setup for the binaries.
pub mod logging;
/// Pipeline, metrics and artifacts.
pub mod ml;
/// HTTP prediction service.
pub mod server;
/// Local experiment tracking.
pub mod tracking;
/// The training stage.
pub mod training;
