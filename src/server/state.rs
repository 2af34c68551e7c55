//! Shared handler state with the lazily loaded model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::inference::load_model;
use crate::ml::pipeline::FittedPipeline;

use super::error::ApiError;

/// Shared handler state: where the artifact lives and the model once loaded.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    model_path: PathBuf,
    model: OnceCell<Arc<FittedPipeline>>,
}

impl AppState {
    /// State that loads the artifact on the first predict request.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                model_path: model_path.into(),
                model: OnceCell::new(),
            }),
        }
    }

    /// State with an already loaded pipeline.
    pub fn with_model(model_path: impl Into<PathBuf>, model: FittedPipeline) -> Self {
        Self {
            inner: Arc::new(Inner {
                model_path: model_path.into(),
                model: OnceCell::new_with(Some(Arc::new(model))),
            }),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.inner.model_path
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.model.initialized()
    }

    /// Return the cached model, loading it first if needed.
    ///
    /// A failed load leaves the cell empty so a later call can retry.
    pub async fn model(&self) -> Result<Arc<FittedPipeline>, ApiError> {
        let model = self
            .inner
            .model
            .get_or_try_init(|| async {
                let path = self.inner.model_path.clone();
                let loaded = tokio::task::spawn_blocking(move || load_model(&path)).await??;
                tracing::info!(
                    "Loaded model from {} ({} features)",
                    self.inner.model_path.display(),
                    loaded.n_features()
                );
                Ok::<_, ApiError>(Arc::new(loaded))
            })
            .await?;
        Ok(Arc::clone(model))
    }
}
