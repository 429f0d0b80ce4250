//! REST handlers for the embedding endpoint

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::MemoryState;
use crate::error::{MemoryError, MemoryResult};
use crate::models::{EmbeddingModel, SearchResult};
use crate::repository::VectorRepository;
use crate::service::EmbeddingService;

/// Request to embed a single text
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbedRequest {
    pub text: String,
    /// Wire model name; defaults to the model the service was started with.
    /// Kept as a plain string so an unknown name surfaces as a 400 with the
    /// standard error body rather than a deserialization rejection.
    #[serde(default)]
    pub model: Option<String>,
}

/// Embedding response: vector, timing and the model identity it came from
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmbedResponse {
    pub embedding: Vec<f32>,
    #[serde(rename = "timingMs")]
    pub timing_ms: u64,
    pub model: String,
    pub dimension: u32,
}

/// Service status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub service: String,
    pub model: String,
    pub status: String,
}

/// Semantic search over the memory collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub text: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, rename = "scoreThreshold")]
    pub score_threshold: Option<f32>,
}

fn default_limit() -> u32 {
    5
}

/// Service status and configured model
#[utoipa::path(
    get,
    path = "/",
    tag = "embeddings",
    responses(
        (status = 200, description = "Service is ready", body = StatusResponse)
    )
)]
pub async fn service_status(
    State(service): State<Arc<EmbeddingService>>,
) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: "Legal Memory Embedding Server".to_string(),
        model: service.default_model().model_name().to_string(),
        status: "ready".to_string(),
    })
}

/// Embed a single text into a fixed-width vector
#[utoipa::path(
    post,
    path = "/embed",
    tag = "embeddings",
    request_body = EmbedRequest,
    responses(
        (status = 200, description = "Embedding generated", body = EmbedResponse),
        (status = 400, description = "Unknown model name"),
        (status = 503, description = "Embedding model unavailable"),
        (status = 500, description = "Embedding failed")
    )
)]
pub async fn embed_text(
    State(service): State<Arc<EmbeddingService>>,
    Json(request): Json<EmbedRequest>,
) -> MemoryResult<Json<EmbedResponse>> {
    let model = match request.model.as_deref() {
        Some(name) => EmbeddingModel::parse(name).ok_or_else(|| {
            MemoryError::Validation(format!("Unknown embedding model '{}'", name))
        })?,
        None => service.default_model(),
    };

    let outcome = service.embed_with(model, &request.text).await?;

    Ok(Json(EmbedResponse {
        embedding: outcome.values,
        timing_ms: outcome.elapsed_ms,
        model: outcome.model.model_name().to_string(),
        dimension: outcome.dimension,
    }))
}

/// Search the memory collection by semantic similarity to the query text
#[utoipa::path(
    post,
    path = "/search",
    tag = "memory",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Ranked results", body = Vec<SearchResult>),
        (status = 500, description = "Embedding or store failure")
    )
)]
pub async fn search_memory<R: VectorRepository>(
    State(state): State<Arc<MemoryState<R>>>,
    Json(request): Json<SearchRequest>,
) -> MemoryResult<Json<Vec<SearchResult>>> {
    let results = state
        .service
        .search_text(
            &state.spec,
            &request.text,
            request.limit,
            request.score_threshold,
        )
        .await?;
    Ok(Json(results))
}
