//! Memory collection bootstrap
//!
//! Resets the legal memory collection and seeds it with the sample document
//! set: connect to Qdrant, delete and recreate the collection, embed every
//! document, upsert them as one batch, then print a summary. Any failure
//! exits non-zero with the full error chain.
//!
//! Environment:
//! - `QDRANT_URL`, `QDRANT_API_KEY` — store connection
//! - `MEMORY_COLLECTION` — collection name (default: legal_memory)
//! - `JINA_API_KEY` — when set, embeds through the Jina API; otherwise a
//!   local model is loaded (both produce 768-wide vectors)

use core_config::env_or_default;
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::Environment;
use domain_memory::{
    CollectionSpec, EmbeddingModel, EmbeddingProvider, EmbeddingService, FastEmbedProvider,
    JinaProvider, MemoryService, QdrantConfig, QdrantRepository,
};
use std::sync::Arc;
use tracing::info;

mod docs;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();
    init_tracing(&Environment::from_env());

    let collection = env_or_default("MEMORY_COLLECTION", "legal_memory");

    let qdrant_config = QdrantConfig::from_env()?;
    info!("Connecting to Qdrant at {}", qdrant_config.url);
    let repository = QdrantRepository::new(qdrant_config).await?;

    // Remote API when a key is present, local weights otherwise. Both models
    // are 768-wide, so the collection schema is the same either way.
    let (provider, model): (Arc<dyn EmbeddingProvider>, EmbeddingModel) =
        if std::env::var("JINA_API_KEY").is_ok() {
            info!("Embedding via the Jina API");
            (
                Arc::new(JinaProvider::from_env()?),
                EmbeddingModel::JinaV2BaseEn,
            )
        } else {
            info!("JINA_API_KEY not set, embedding with local model weights");
            (
                Arc::new(FastEmbedProvider::new(EmbeddingModel::NomicEmbedTextV15)?),
                EmbeddingModel::NomicEmbedTextV15,
            )
        };

    let embedder = Arc::new(EmbeddingService::new(provider, model));
    let service = MemoryService::new(repository, embedder);

    let spec = CollectionSpec::new(collection, model);
    service.reset_collection(&spec).await?;

    let documents = docs::sample_documents();
    info!(
        "Embedding {} documents with {}",
        documents.len(),
        model.model_name()
    );
    let report = service.ingest(&spec, documents).await?;

    let stored = service.count_points(&spec.name).await?;

    println!();
    println!("✓ Setup complete!");
    println!("  Collection:  {}", spec.name);
    println!("  Documents:   {} embedded, {} stored", report.count, stored);
    println!("  Vector size: {}", spec.dimension());
    println!("  Distance:    {}", spec.distance.as_str());
    println!("  Model:       {}", model.model_name());

    Ok(())
}
