//! HTTP front-end: a form, a playback page and the media files themselves.

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod handlers;
pub mod pages;

pub use error::{AppError, AppResult};
pub use pages::Templates;

use crate::pipeline::AudioPipeline;
use crate::Result;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AudioPipeline>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(pipeline: AudioPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            templates: Arc::new(Templates::load()),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/download/", post(handlers::download))
        .route("/media/{filename}/", get(handlers::get_media))
        .route("/{filename}/", get(handlers::view_media))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the application until Ctrl+C
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    state.pipeline.library().ensure_exists().await?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;

    tracing::info!(
        "Server starting on http://{} (media in {})",
        listener.local_addr()?,
        state.pipeline.library().root().display()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running web server")?;

    tracing::info!("Server closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", err);
    }
}
