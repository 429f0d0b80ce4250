mod http;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::CollectionSpec;
use crate::repository::VectorRepository;
use crate::service::{EmbeddingService, MemoryService};

pub use http::{EmbedRequest, EmbedResponse, SearchRequest, StatusResponse};

/// OpenAPI documentation for the embedding API
#[derive(OpenApi)]
#[openapi(
    paths(http::service_status, http::embed_text, http::search_memory),
    components(schemas(EmbedRequest, EmbedResponse, SearchRequest, StatusResponse)),
    tags(
        (name = "embeddings", description = "Text embedding operations"),
        (name = "memory", description = "Semantic memory search")
    )
)]
pub struct EmbedApiDoc;

/// State for the memory search surface: the service plus the one collection
/// this deployment serves
pub struct MemoryState<R: VectorRepository> {
    pub service: MemoryService<R>,
    pub spec: CollectionSpec,
}

/// Build the embedding endpoint router with its state applied
pub fn embed_routes(service: Arc<EmbeddingService>) -> Router {
    Router::new()
        .route("/", get(http::service_status))
        .route("/embed", post(http::embed_text))
        .with_state(service)
}

/// Build the search router over a fixed collection
pub fn memory_routes<R: VectorRepository + 'static>(state: Arc<MemoryState<R>>) -> Router {
    Router::new()
        .route("/search", post(http::search_memory))
        .with_state(state)
}
