use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::error::{MemoryError, MemoryResult};
use crate::models::{EmbeddingModel, EmbeddingResult};

/// Jina embedding API configuration
#[derive(Debug, Clone)]
pub struct JinaConfig {
    pub api_key: String,
    pub base_url: String,
}

impl JinaConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.jina.ai/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn from_env() -> MemoryResult<Self> {
        let api_key = std::env::var("JINA_API_KEY")
            .map_err(|_| MemoryError::Config("JINA_API_KEY not set".to_string()))?;

        let base_url = std::env::var("JINA_BASE_URL")
            .unwrap_or_else(|_| "https://api.jina.ai/v1".to_string());

        Ok(Self { api_key, base_url })
    }
}

/// Remote embedding provider backed by the Jina embeddings API
pub struct JinaProvider {
    client: Client,
    config: JinaConfig,
}

impl JinaProvider {
    pub fn new(config: JinaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> MemoryResult<Self> {
        Ok(Self::new(JinaConfig::from_env()?))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: Option<EmbeddingUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for JinaProvider {
    async fn embed(&self, model: EmbeddingModel, text: &str) -> MemoryResult<EmbeddingResult> {
        let results = self.embed_batch(model, &[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| MemoryError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> MemoryResult<Vec<EmbeddingResult>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: model.model_name().to_string(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MemoryError::Embedding(format!(
                "Jina API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        // Sort by index to maintain input order
        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        let tokens_per_embedding = embedding_response
            .usage
            .map(|u| u.total_tokens / texts.len() as u32);

        Ok(data
            .into_iter()
            .map(|d| EmbeddingResult {
                dimension: d.embedding.len() as u32,
                values: d.embedding,
                tokens_used: tokens_per_embedding,
            })
            .collect())
    }
}
