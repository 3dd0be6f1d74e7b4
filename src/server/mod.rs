//! HTTP server.
//!
//! Routes:
//! - `POST /api/analyze`: analyze a repository
//! - `GET /api/health`: liveness and credential status
//! - everything else: the browser UI from the static directory

pub mod handlers;

use crate::analysis::Orchestrator;
use crate::config::ServerConfig;
use crate::error::ApiError;
use anyhow::{Context, Result};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use std::any::Any;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Build the application router.
pub fn router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/health", get(handlers::health))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn a handler panic into a 500 `InternalError` response.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Request handler panicked: {}", detail);

    ApiError::InternalError("An unexpected error occurred while analyzing the repository".to_string())
        .into_response()
}

/// Bind and serve until Ctrl-C.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let app = router(state, &config.static_dir);

    info!("Listening on http://{}", listener.local_addr().context("Listener has no address")?);
    info!("Serving UI from {}", config.static_dir);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
