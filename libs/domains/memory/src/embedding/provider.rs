use async_trait::async_trait;

use crate::error::MemoryResult;
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Trait for embedding generation providers
///
/// Implementations may call a remote embedding API or run a local model.
/// The `model` argument is advisory: a local provider serves the single
/// model it was initialized with and will not silently switch weights to
/// honor a different request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, model: EmbeddingModel, text: &str) -> MemoryResult<EmbeddingResult>;

    /// Generate embeddings for multiple texts in batch
    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> MemoryResult<Vec<EmbeddingResult>>;
}
