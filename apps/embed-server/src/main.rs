//! Embedding HTTP server
//!
//! Serves a local embedding model over a small REST surface:
//! - `GET /` — service status and configured model
//! - `POST /embed` — embed a single text, with timing metadata
//! - `GET /api-docs/openapi.json` — OpenAPI document

use axum::{Json, routing::get};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_memory::{EmbedApiDoc, EmbeddingService, FastEmbedProvider, embed_routes};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

mod config;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!(
        "Loading embedding model {} (lazy, first request pays the cost)",
        config.model.model_name()
    );
    let provider = Arc::new(FastEmbedProvider::new(config.model)?);
    let service = Arc::new(EmbeddingService::new(provider, config.model));

    let app = embed_routes(service)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(EmbedApiDoc::openapi()) }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Embedding server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Embedding server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    info!("Shutdown signal received");
}
