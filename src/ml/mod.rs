//! Pipeline fitting, evaluation metrics and artifact persistence.
//!
//! The numerical work is delegated to `linfa`; these modules wire the scaler
//! and classifier together and move the fitted result to and from disk.

pub mod artifact;
pub mod metrics;
pub mod pipeline;

pub use artifact::{ArtifactError, PipelineArtifact, load_artifact, save_artifact};
pub use pipeline::{FittedPipeline, PipelineError, PipelineParams, build_pipeline};
