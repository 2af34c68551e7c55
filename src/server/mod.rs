//! HTTP service exposing `/health` and `/predict` over a lazily loaded artifact.

mod error;
mod routes;
mod state;

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

pub use error::{ApiError, ErrorBody};
pub use routes::{HealthResponse, PredictRequest, PredictResponse};
pub use state::AppState;

use crate::config::ServerSettings;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/predict", post(routes::predict))
        .with_state(state)
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(settings: &ServerSettings, state: AppState) -> Result<(), ServerError> {
    let bind_err = |source| ServerError::Bind {
        addr: format!("{}:{}", settings.host, settings.port),
        source,
    };
    let listener = TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .map_err(bind_err)?;
    let addr: SocketAddr = listener.local_addr().map_err(bind_err)?;
    tracing::info!(
        "Serving on http://{addr} (model: {})",
        state.model_path().display()
    );
    serve_on(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_on<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
