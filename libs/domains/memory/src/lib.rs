//! Semantic Memory Domain Library
//!
//! This module provides a complete domain implementation for semantic text
//! memory: embedding generation, Qdrant-backed vector storage, collection
//! bootstrapping and similarity search.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │  MemoryService   │────▶│ EmbeddingService │  ← timing, default model
//! │ (reset/ingest/   │     └────────┬─────────┘
//! │  search)         │              │
//! └────────┬─────────┘     ┌────────▼─────────┐
//!          │               │ EmbeddingProvider │
//! ┌────────▼─────────┐     │     (trait)       │
//! │ VectorRepository │     └────────┬──────────┘
//! │     (trait)      │              │
//! └────────┬─────────┘     ┌────────▼──────────┐
//! ┌────────▼─────────┐     │ FastEmbedProvider │  (local weights)
//! │ QdrantRepository │     │ JinaProvider      │  (remote API)
//! └──────────────────┘     └───────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - **Model/collection pairing**: a [`CollectionSpec`] carries the embedding
//!   model that fixes its vector width; every vector is validated against
//!   that width before it reaches the store.
//! - **Destructive idempotent reset**: `reset_collection` always leaves the
//!   collection with the requested schema and zero points.
//! - **All-or-nothing ingestion**: embedding runs through a bounded worker
//!   pool and a single batch upsert; the first failure aborts the run
//!   before anything is written.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_memory::{
//!     CollectionSpec, Document, EmbeddingModel, EmbeddingService,
//!     FastEmbedProvider, MemoryService, QdrantConfig, QdrantRepository,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = QdrantRepository::new(QdrantConfig::from_env()?).await?;
//!
//! let provider = Arc::new(FastEmbedProvider::new(EmbeddingModel::NomicEmbedTextV15)?);
//! let embedder = Arc::new(EmbeddingService::new(
//!     provider,
//!     EmbeddingModel::NomicEmbedTextV15,
//! ));
//!
//! let service = MemoryService::new(repository, embedder);
//!
//! let spec = CollectionSpec::new("legal_memory", EmbeddingModel::NomicEmbedTextV15);
//! service.reset_collection(&spec).await?;
//!
//! let docs = vec![
//!     Document::new(6u64, "Rule 802: Hearsay is not admissible unless it falls under an exception.")
//!         .with_payload(serde_json::json!({"doc_type": "RULE"})),
//! ];
//! let report = service.ingest(&spec, docs).await?;
//! println!("ingested {} documents", report.count);
//! # Ok(())
//! # }
//! ```

pub mod embedding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod qdrant;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use embedding::{EmbeddingProvider, FastEmbedProvider, JinaConfig, JinaProvider};
pub use error::{MemoryError, MemoryResult};
pub use handlers::{EmbedApiDoc, MemoryState, embed_routes, memory_routes};
pub use models::{
    CollectionInfo, CollectionSpec, CollectionStatus, DistanceMetric, Document, EmbedOutcome,
    EmbeddingModel, EmbeddingResult, IngestFailure, IngestReport, PointKey, SearchQuery,
    SearchResult, VectorRecord,
};
pub use qdrant::{QdrantConfig, QdrantRepository};
pub use repository::VectorRepository;
pub use service::{EmbeddingService, MemoryService};
