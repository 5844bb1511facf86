use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use anyhow::Context;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{download_handler, health_handler};
use super::upload::upload_handler;
use crate::config::ServiceConfig;
use crate::vision::ocr::{build_engine, OcrEngine};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Engine used for every upload
    pub engine: Arc<dyn OcrEngine>,
    /// Directory receiving uploaded images and generated text files
    pub output_dir: PathBuf,
    /// Request body cap in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(engine: Arc<dyn OcrEngine>, output_dir: PathBuf, max_upload_bytes: usize) -> Self {
        Self {
            engine,
            output_dir,
            max_upload_bytes,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_handler))
        // Upload and OCR
        .route("/upload", post(upload_handler))
        // Generated file download
        .route("/download/*filename", get(download_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Create the output directory if needed and return its absolute path
pub fn prepare_output_dir(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    dir.canonicalize()
}

pub async fn start_server(config: ServiceConfig) -> anyhow::Result<()> {
    let output_dir = prepare_output_dir(&config.output_dir).with_context(|| {
        format!(
            "failed to prepare output directory {}",
            config.output_dir.display()
        )
    })?;
    tracing::info!("Output directory: {}", output_dir.display());

    let engine = build_engine(&config.engine)?;
    let state = AppState::new(engine, output_dir, config.max_upload_bytes);
    let app = create_router(state);

    let addr = config
        .listen_addr()
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid listen address {}", config.listen_addr()))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
