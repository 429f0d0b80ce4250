use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel as FastEmbedModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;
use tracing::info;

use super::EmbeddingProvider;
use crate::error::{MemoryError, MemoryResult};
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Map a model identifier to the fastembed model that serves it locally
fn to_fastembed_model(model: EmbeddingModel) -> MemoryResult<FastEmbedModel> {
    match model {
        EmbeddingModel::NomicEmbedTextV15 => Ok(FastEmbedModel::NomicEmbedTextV15),
        EmbeddingModel::AllMiniLmL6V2 => Ok(FastEmbedModel::AllMiniLML6V2),
        EmbeddingModel::BgeSmallEnV15 => Ok(FastEmbedModel::BGESmallENV15),
        other => Err(MemoryError::ModelUnavailable(format!(
            "'{}' is not servable locally",
            other.model_name()
        ))),
    }
}

/// One-time async initialization shared by all callers.
///
/// Concurrent cold-start callers await the same in-flight load; once it
/// succeeds, exactly one value exists for the life of the wrapper. A failed
/// load is returned to the caller and the next call starts over.
struct OnceHandle<T> {
    cell: OnceCell<Arc<T>>,
}

impl<T> OnceHandle<T> {
    fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    fn initialized(&self) -> bool {
        self.cell.initialized()
    }

    async fn get_or_try_init<F, Fut>(&self, load: F) -> MemoryResult<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = MemoryResult<T>>,
    {
        self.cell
            .get_or_try_init(|| async { Ok(Arc::new(load().await?)) })
            .await
            .cloned()
    }
}

/// Local embedding provider backed by a fastembed model.
///
/// The model weights load once, on first use, and the handle is reused for
/// the rest of the process's life. Concurrent cold-start callers block on
/// the same initialization; a second model instance is never created.
/// Inference runs on the blocking thread pool, serialized by a mutex: the
/// model's compute engine is the scarce resource, not the tokio runtime.
pub struct FastEmbedProvider {
    model: EmbeddingModel,
    handle: OnceHandle<Mutex<TextEmbedding>>,
}

impl FastEmbedProvider {
    /// Create a provider for the given model. Weights are not loaded until
    /// the first embed call.
    pub fn new(model: EmbeddingModel) -> MemoryResult<Self> {
        // Reject unsupported models at construction, not on first request
        to_fastembed_model(model)?;

        Ok(Self {
            model,
            handle: OnceHandle::new(),
        })
    }

    /// The model this provider was initialized with
    pub fn model(&self) -> EmbeddingModel {
        self.model
    }

    async fn model_handle(&self) -> MemoryResult<Arc<Mutex<TextEmbedding>>> {
        let model = self.model;
        self.handle
            .get_or_try_init(|| async move {
                let fastembed_model = to_fastembed_model(model)?;
                info!(model = model.model_name(), "Loading embedding model");

                let loaded = tokio::task::spawn_blocking(move || {
                    TextEmbedding::try_new(
                        InitOptions::new(fastembed_model).with_show_download_progress(false),
                    )
                })
                .await
                .map_err(|e| MemoryError::Internal(format!("Model load task failed: {}", e)))?
                .map_err(|e| MemoryError::ModelUnavailable(e.to_string()))?;

                info!(model = model.model_name(), "Embedding model loaded");
                Ok(Mutex::new(loaded))
            })
            .await
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, model: EmbeddingModel, text: &str) -> MemoryResult<EmbeddingResult> {
        let results = self.embed_batch(model, &[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Embedding("No embedding produced".to_string()))
    }

    // The requested model is advisory: this provider always embeds with the
    // weights it loaded. Callers that need model identity for reproducibility
    // must construct the provider with the model they request.
    async fn embed_batch(
        &self,
        _model: EmbeddingModel,
        texts: &[String],
    ) -> MemoryResult<Vec<EmbeddingResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let handle = self.model_handle().await?;
        let batch: Vec<String> = texts.to_vec();

        let embeddings = tokio::task::spawn_blocking(move || {
            let embedder = handle
                .lock()
                .map_err(|_| MemoryError::Internal("Embedding model lock poisoned".to_string()))?;
            embedder
                .embed(batch, None)
                .map_err(|e| MemoryError::Embedding(e.to_string()))
        })
        .await
        .map_err(|e| MemoryError::Internal(format!("Embedding task failed: {}", e)))??;

        Ok(embeddings
            .into_iter()
            .map(|values| EmbeddingResult {
                dimension: values.len() as u32,
                values,
                tokens_used: None,
            })
            .collect())
    }
}
