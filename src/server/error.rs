//! JSON error responses and their status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::ml::artifact::ArtifactError;
use crate::ml::pipeline::PipelineError;

/// JSON body returned for every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Request failures mapped onto HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Model(#[from] ArtifactError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("model loader task failed: {0}")]
    Loader(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Model(ArtifactError::NotFound(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(
                PipelineError::FeatureCount { .. } | PipelineError::NonFinite { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("predict failed: {self}");
        } else {
            tracing::debug!("rejected predict request: {self}");
        }
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}
