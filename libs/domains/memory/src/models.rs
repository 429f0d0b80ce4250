use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

/// Point identifier: Qdrant accepts either an unsigned integer or a UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PointKey {
    Num(u64),
    Uuid(Uuid),
}

impl From<u64> for PointKey {
    fn from(id: u64) -> Self {
        PointKey::Num(id)
    }
}

impl From<Uuid> for PointKey {
    fn from(id: Uuid) -> Self {
        PointKey::Uuid(id)
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKey::Num(n) => write!(f, "{}", n),
            PointKey::Uuid(u) => write!(f, "{}", u),
        }
    }
}

/// Distance metric for similarity calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
    Manhattan,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "Cosine",
            DistanceMetric::Euclidean => "Euclidean",
            DistanceMetric::DotProduct => "Dot",
            DistanceMetric::Manhattan => "Manhattan",
        }
    }
}

/// Embedding model selection
///
/// Every model fixes the vector width of any collection populated from it.
/// The model name is the wire identifier used by both the embedding endpoint
/// and the remote provider APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum EmbeddingModel {
    /// jina-embeddings-v2-base-en (768 dimensions, Jina API)
    #[default]
    #[serde(rename = "jina-embeddings-v2-base-en")]
    JinaV2BaseEn,
    /// nomic-embed-text-v1.5 (768 dimensions, local)
    #[serde(rename = "nomic-embed-text-v1.5")]
    NomicEmbedTextV15,
    /// all-MiniLM-L6-v2 (384 dimensions, local)
    #[serde(rename = "all-MiniLM-L6-v2")]
    AllMiniLmL6V2,
    /// bge-small-en-v1.5 (384 dimensions, local)
    #[serde(rename = "bge-small-en-v1.5")]
    BgeSmallEnV15,
    /// Custom model with specified dimension
    #[serde(rename = "custom")]
    Custom(u32),
}

impl EmbeddingModel {
    /// Native output width of the model
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::JinaV2BaseEn => 768,
            EmbeddingModel::NomicEmbedTextV15 => 768,
            EmbeddingModel::AllMiniLmL6V2 => 384,
            EmbeddingModel::BgeSmallEnV15 => 384,
            EmbeddingModel::Custom(dim) => *dim,
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            EmbeddingModel::JinaV2BaseEn => "jina-embeddings-v2-base-en",
            EmbeddingModel::NomicEmbedTextV15 => "nomic-embed-text-v1.5",
            EmbeddingModel::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            EmbeddingModel::BgeSmallEnV15 => "bge-small-en-v1.5",
            EmbeddingModel::Custom(_) => "custom",
        }
    }

    /// Resolve a wire model name back to a known model
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "jina-embeddings-v2-base-en" => Some(EmbeddingModel::JinaV2BaseEn),
            "nomic-embed-text-v1.5" => Some(EmbeddingModel::NomicEmbedTextV15),
            "all-MiniLM-L6-v2" => Some(EmbeddingModel::AllMiniLmL6V2),
            "bge-small-en-v1.5" => Some(EmbeddingModel::BgeSmallEnV15),
            _ => None,
        }
    }
}

/// Declared schema of a collection: name, source model and distance metric.
///
/// Vectors compared by similarity must all originate from the same model;
/// mixing models corrupts ranking without any technical error. Carrying the
/// model here keeps the collection/model pairing explicit wherever a
/// collection is created or populated.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionSpec {
    pub name: String,
    pub model: EmbeddingModel,
    pub distance: DistanceMetric,
}

impl CollectionSpec {
    pub fn new(name: impl Into<String>, model: EmbeddingModel) -> Self {
        Self {
            name: name.into(),
            model,
            distance: DistanceMetric::default(),
        }
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    /// Vector width every point in this collection must have
    pub fn dimension(&self) -> u32 {
        self.model.dimension()
    }
}

/// Collection information as reported by the store
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollectionInfo {
    pub name: String,
    pub points_count: u64,
    pub dimension: u32,
    pub distance: DistanceMetric,
    pub status: CollectionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CollectionStatus {
    Green,
    Yellow,
    Grey,
}

impl CollectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionStatus::Green => "green",
            CollectionStatus::Yellow => "yellow",
            CollectionStatus::Grey => "grey",
        }
    }
}

/// An ingestion document: raw text plus free-form metadata, not yet embedded
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Document {
    pub id: PointKey,
    pub text: String,
    pub payload: Option<serde_json::Value>,
}

impl Document {
    pub fn new(id: impl Into<PointKey>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// The persisted unit: id, embedding vector and payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VectorRecord {
    pub id: PointKey,
    pub values: Vec<f32>,
    pub payload: Option<serde_json::Value>,
}

impl VectorRecord {
    pub fn new(id: impl Into<PointKey>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Search query parameters
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub vector: Vec<f32>,
    pub limit: u32,
    pub score_threshold: Option<f32>,
    pub with_vectors: bool,
    pub with_payloads: bool,
}

impl SearchQuery {
    pub fn new(vector: Vec<f32>, limit: u32) -> Self {
        Self {
            vector,
            limit,
            score_threshold: None,
            with_vectors: false,
            with_payloads: true,
        }
    }
}

/// Search result
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    pub id: PointKey,
    pub score: f32,
    pub payload: Option<serde_json::Value>,
    pub vector: Option<Vec<f32>>,
}

/// Raw provider output for one text
#[derive(Debug, Clone)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: Option<u32>,
}

/// Service-level embedding outcome: vector plus timing and model identity
#[derive(Debug, Clone)]
pub struct EmbedOutcome {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub elapsed_ms: u64,
    pub model: EmbeddingModel,
}

/// Outcome of one ingestion run.
///
/// The pipeline is all-or-nothing: any embedding failure aborts the run
/// before the batch upsert, so `failures` is empty whenever a report is
/// returned at all. The field stays on the wire type so a best-effort
/// pipeline can be introduced without breaking consumers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestReport {
    pub count: u32,
    pub failures: Vec<IngestFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestFailure {
    pub id: PointKey,
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_dimensions() {
        assert_eq!(EmbeddingModel::JinaV2BaseEn.dimension(), 768);
        assert_eq!(EmbeddingModel::NomicEmbedTextV15.dimension(), 768);
        assert_eq!(EmbeddingModel::AllMiniLmL6V2.dimension(), 384);
        assert_eq!(EmbeddingModel::BgeSmallEnV15.dimension(), 384);
        assert_eq!(EmbeddingModel::Custom(1024).dimension(), 1024);
    }

    #[test]
    fn test_model_names_round_trip() {
        for model in [
            EmbeddingModel::JinaV2BaseEn,
            EmbeddingModel::NomicEmbedTextV15,
            EmbeddingModel::AllMiniLmL6V2,
            EmbeddingModel::BgeSmallEnV15,
        ] {
            assert_eq!(EmbeddingModel::parse(model.model_name()), Some(model));
        }
        assert_eq!(EmbeddingModel::parse("no-such-model"), None);
    }

    #[test]
    fn test_default_model_is_reference_model() {
        assert_eq!(EmbeddingModel::default(), EmbeddingModel::JinaV2BaseEn);
    }

    #[test]
    fn test_collection_spec_dimension_follows_model() {
        let spec = CollectionSpec::new("legal_memory", EmbeddingModel::JinaV2BaseEn);
        assert_eq!(spec.dimension(), 768);
        assert_eq!(spec.distance, DistanceMetric::Cosine);

        let spec = spec.with_distance(DistanceMetric::DotProduct);
        assert_eq!(spec.distance, DistanceMetric::DotProduct);
    }

    #[test]
    fn test_point_key_serde_untagged() {
        let num: PointKey = serde_json::from_str("6").unwrap();
        assert_eq!(num, PointKey::Num(6));

        let id = Uuid::new_v4();
        let json = format!("\"{}\"", id);
        let parsed: PointKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, PointKey::Uuid(id));

        assert_eq!(serde_json::to_string(&PointKey::Num(6)).unwrap(), "6");
    }

    #[test]
    fn test_embedding_model_wire_names() {
        let json = serde_json::to_string(&EmbeddingModel::JinaV2BaseEn).unwrap();
        assert_eq!(json, "\"jina-embeddings-v2-base-en\"");

        let parsed: EmbeddingModel =
            serde_json::from_str("\"nomic-embed-text-v1.5\"").unwrap();
        assert_eq!(parsed, EmbeddingModel::NomicEmbedTextV15);
    }

    #[test]
    fn test_document_builder() {
        let doc = Document::new(6u64, "Rule 802: Hearsay is not admissible.")
            .with_payload(serde_json::json!({"doc_type": "RULE"}));
        assert_eq!(doc.id, PointKey::Num(6));
        assert!(doc.payload.is_some());
    }

    #[test]
    fn test_search_query_defaults() {
        let query = SearchQuery::new(vec![0.1; 768], 5);
        assert_eq!(query.limit, 5);
        assert!(query.with_payloads);
        assert!(!query.with_vectors);
        assert!(query.score_threshold.is_none());
    }
}
