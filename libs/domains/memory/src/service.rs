use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::embedding::EmbeddingProvider;
use crate::error::{MemoryError, MemoryResult};
use crate::models::{
    CollectionInfo, CollectionSpec, Document, EmbedOutcome, EmbeddingModel, IngestReport,
    PointKey, SearchQuery, SearchResult, VectorRecord,
};
use crate::repository::VectorRepository;

const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_EMBED_CONCURRENCY: usize = 4;

/// Embedding service: wraps a provider behind a request/response contract
/// and measures wall-clock latency around each transform.
///
/// One call = one embed = one response. No retries, no queueing; provider
/// errors surface as a single typed error per request.
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    default_model: EmbeddingModel,
    op_timeout: Duration,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, default_model: EmbeddingModel) -> Self {
        Self {
            provider,
            default_model,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn default_model(&self) -> EmbeddingModel {
        self.default_model
    }

    /// Embed with the service's default model
    pub async fn embed(&self, text: &str) -> MemoryResult<EmbedOutcome> {
        self.embed_with(self.default_model, text).await
    }

    /// Embed with an explicit model.
    ///
    /// The model is echoed back in the outcome, not re-validated against the
    /// weights a local provider actually loaded; callers relying on model
    /// identity must initialize the provider with the model they request.
    /// Timing covers the embed call only, so a warm handle reports transform
    /// cost without the amortized one-time load.
    pub async fn embed_with(
        &self,
        model: EmbeddingModel,
        text: &str,
    ) -> MemoryResult<EmbedOutcome> {
        let started = Instant::now();

        let result = timeout(self.op_timeout, self.provider.embed(model, text))
            .await
            .map_err(|_| {
                MemoryError::Timeout(format!(
                    "embedding did not complete within {:?}",
                    self.op_timeout
                ))
            })??;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(
            model = model.model_name(),
            dimension = result.dimension,
            elapsed_ms,
            "Embedded text"
        );

        Ok(EmbedOutcome {
            dimension: result.dimension,
            values: result.values,
            elapsed_ms,
            model,
        })
    }
}

/// Memory service: collection lifecycle, batch ingestion and semantic search
/// over a vector repository, with embeddings generated through
/// [`EmbeddingService`].
pub struct MemoryService<R: VectorRepository> {
    repository: R,
    embedder: Arc<EmbeddingService>,
    op_timeout: Duration,
    embed_concurrency: usize,
}

impl<R: VectorRepository> MemoryService<R> {
    pub fn new(repository: R, embedder: Arc<EmbeddingService>) -> Self {
        Self {
            repository,
            embedder,
            op_timeout: DEFAULT_OP_TIMEOUT,
            embed_concurrency: DEFAULT_EMBED_CONCURRENCY,
        }
    }

    pub fn with_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    /// Bound on concurrent embedding calls during ingestion
    pub fn with_embed_concurrency(mut self, embed_concurrency: usize) -> Self {
        self.embed_concurrency = embed_concurrency.max(1);
        self
    }

    // ===== Collection Management =====

    /// Destructive idempotent reset: delete the collection if it exists, then
    /// recreate it with the spec's schema.
    ///
    /// Post-condition regardless of prior state: the collection exists with
    /// exactly this schema and zero points. This is a reset, never a
    /// migration; previously ingested points are gone.
    pub async fn reset_collection(&self, spec: &CollectionSpec) -> MemoryResult<()> {
        if self.repository.get_collection(&spec.name).await?.is_some() {
            info!(collection = %spec.name, "Collection exists, deleting before recreate");
            self.repository.delete_collection(&spec.name).await?;
        }

        info!(
            collection = %spec.name,
            model = spec.model.model_name(),
            dimension = spec.dimension(),
            distance = spec.distance.as_str(),
            "Creating collection"
        );
        self.repository.create_collection(spec).await
    }

    pub async fn collection_info(
        &self,
        collection_name: &str,
    ) -> MemoryResult<Option<CollectionInfo>> {
        self.repository.get_collection(collection_name).await
    }

    pub async fn count_points(&self, collection_name: &str) -> MemoryResult<u64> {
        self.repository.count_points(collection_name).await
    }

    // ===== Ingestion =====

    /// Embed every document and upsert the full set as one batch.
    ///
    /// Embedding runs through a bounded worker pool (input order preserved);
    /// the first failure aborts the whole run before anything reaches the
    /// store. Every produced vector is validated against the collection's
    /// declared width before the upsert.
    pub async fn ingest(
        &self,
        spec: &CollectionSpec,
        documents: Vec<Document>,
    ) -> MemoryResult<IngestReport> {
        if documents.is_empty() {
            return Ok(IngestReport {
                count: 0,
                failures: Vec::new(),
            });
        }

        let expected = spec.dimension();
        let model = spec.model;

        let records: Vec<VectorRecord> = stream::iter(documents.into_iter().map(|doc| {
            let embedder = Arc::clone(&self.embedder);
            async move {
                let outcome = embedder.embed_with(model, &doc.text).await?;
                if outcome.dimension != expected {
                    return Err(MemoryError::DimensionMismatch {
                        expected,
                        actual: outcome.dimension,
                    });
                }

                debug!(id = %doc.id, elapsed_ms = outcome.elapsed_ms, "Embedded document");

                let mut record = VectorRecord::new(doc.id, outcome.values);
                if let Some(payload) = doc.payload {
                    record = record.with_payload(payload);
                }
                Ok(record)
            }
        }))
        .buffered(self.embed_concurrency)
        .try_collect()
        .await?;

        let count = records.len() as u32;

        timeout(
            self.op_timeout,
            self.repository.upsert_batch(&spec.name, records, true),
        )
        .await
        .map_err(|_| {
            MemoryError::Timeout(format!(
                "batch upsert did not complete within {:?}",
                self.op_timeout
            ))
        })??;

        info!(collection = %spec.name, count, "Ingestion complete");

        Ok(IngestReport {
            count,
            failures: Vec::new(),
        })
    }

    /// Upsert a single pre-embedded record, validating its width against the
    /// collection schema before it reaches the store.
    pub async fn upsert_record(
        &self,
        spec: &CollectionSpec,
        record: VectorRecord,
        wait: bool,
    ) -> MemoryResult<PointKey> {
        let actual = record.values.len() as u32;
        if actual != spec.dimension() {
            return Err(MemoryError::DimensionMismatch {
                expected: spec.dimension(),
                actual,
            });
        }

        timeout(
            self.op_timeout,
            self.repository.upsert(&spec.name, record, wait),
        )
        .await
        .map_err(|_| {
            MemoryError::Timeout(format!(
                "upsert did not complete within {:?}",
                self.op_timeout
            ))
        })?
    }

    // ===== Search =====

    /// Embed the query text with the collection's model and search by
    /// similarity.
    pub async fn search_text(
        &self,
        spec: &CollectionSpec,
        text: &str,
        limit: u32,
        score_threshold: Option<f32>,
    ) -> MemoryResult<Vec<SearchResult>> {
        let outcome = self.embedder.embed_with(spec.model, text).await?;
        if outcome.dimension != spec.dimension() {
            return Err(MemoryError::DimensionMismatch {
                expected: spec.dimension(),
                actual: outcome.dimension,
            });
        }

        let mut query = SearchQuery::new(outcome.values, limit);
        query.score_threshold = score_threshold;

        timeout(self.op_timeout, self.repository.search(&spec.name, query))
            .await
            .map_err(|_| {
                MemoryError::Timeout(format!(
                    "search did not complete within {:?}",
                    self.op_timeout
                ))
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::models::{CollectionStatus, DistanceMetric, EmbeddingResult};
    use crate::repository::MockVectorRepository;

    // Deterministic stand-in embedding: same text always maps to the same
    // vector, different seeds to different vectors.
    fn stub_vector(dimension: u32, seed: f32) -> Vec<f32> {
        (0..dimension).map(|i| seed + i as f32 * 0.01).collect()
    }

    fn stub_provider(dimension: u32) -> MockEmbeddingProvider {
        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(move |_, text| {
            let seed = text.len() as f32;
            Ok(EmbeddingResult {
                values: stub_vector(dimension, seed),
                dimension,
                tokens_used: None,
            })
        });
        provider
    }

    fn embedder_with(provider: MockEmbeddingProvider, model: EmbeddingModel) -> Arc<EmbeddingService> {
        Arc::new(EmbeddingService::new(Arc::new(provider), model))
    }

    fn test_spec(dimension: u32) -> CollectionSpec {
        CollectionSpec::new("legal_memory", EmbeddingModel::Custom(dimension))
    }

    fn rule_802_doc() -> Document {
        Document::new(
            6u64,
            "Rule 802: Hearsay is not admissible unless it falls under an exception.",
        )
        .with_payload(serde_json::json!({"doc_type": "RULE"}))
    }

    // Provider whose calls never resolve, for exercising timeouts
    struct StalledProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for StalledProvider {
        async fn embed(&self, _: EmbeddingModel, _: &str) -> MemoryResult<EmbeddingResult> {
            futures::future::pending().await
        }

        async fn embed_batch(
            &self,
            _: EmbeddingModel,
            _: &[String],
        ) -> MemoryResult<Vec<EmbeddingResult>> {
            futures::future::pending().await
        }
    }

    // Repository whose calls never resolve
    struct StalledRepository;

    #[async_trait::async_trait]
    impl VectorRepository for StalledRepository {
        async fn create_collection(&self, _: &CollectionSpec) -> MemoryResult<()> {
            futures::future::pending().await
        }

        async fn delete_collection(&self, _: &str) -> MemoryResult<bool> {
            futures::future::pending().await
        }

        async fn get_collection(&self, _: &str) -> MemoryResult<Option<CollectionInfo>> {
            futures::future::pending().await
        }

        async fn count_points(&self, _: &str) -> MemoryResult<u64> {
            futures::future::pending().await
        }

        async fn upsert(&self, _: &str, _: VectorRecord, _: bool) -> MemoryResult<PointKey> {
            futures::future::pending().await
        }

        async fn upsert_batch(
            &self,
            _: &str,
            _: Vec<VectorRecord>,
            _: bool,
        ) -> MemoryResult<Vec<PointKey>> {
            futures::future::pending().await
        }

        async fn search(&self, _: &str, _: SearchQuery) -> MemoryResult<Vec<SearchResult>> {
            futures::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_embed_reports_dimension_and_echoes_model() {
        let embedder = embedder_with(stub_provider(768), EmbeddingModel::JinaV2BaseEn);

        let outcome = embedder.embed("some legal text").await.unwrap();

        assert_eq!(outcome.dimension, 768);
        assert_eq!(outcome.values.len(), 768);
        assert_eq!(outcome.model, EmbeddingModel::JinaV2BaseEn);
    }

    #[tokio::test]
    async fn test_embed_is_deterministic_for_same_text() {
        let embedder = embedder_with(stub_provider(768), EmbeddingModel::JinaV2BaseEn);

        let first = embedder.embed("Rule 802").await.unwrap();
        let second = embedder.embed("Rule 802").await.unwrap();

        assert_eq!(first.values, second.values);
    }

    #[tokio::test]
    async fn test_embed_empty_text_is_not_an_error() {
        let embedder = embedder_with(stub_provider(768), EmbeddingModel::JinaV2BaseEn);

        let outcome = embedder.embed("").await.unwrap();

        assert_eq!(outcome.values.len(), 768);
    }

    #[tokio::test]
    async fn test_embed_with_overrides_default_model() {
        let embedder = embedder_with(stub_provider(384), EmbeddingModel::JinaV2BaseEn);

        let outcome = embedder
            .embed_with(EmbeddingModel::AllMiniLmL6V2, "query")
            .await
            .unwrap();

        assert_eq!(outcome.model, EmbeddingModel::AllMiniLmL6V2);
    }

    #[tokio::test]
    async fn test_embed_surfaces_provider_failure() {
        let mut provider = MockEmbeddingProvider::new();
        provider
            .expect_embed()
            .returning(|_, _| Err(MemoryError::Embedding("onnx transform failed".to_string())));
        let embedder = embedder_with(provider, EmbeddingModel::JinaV2BaseEn);

        let result = embedder.embed("text").await;

        assert!(matches!(result, Err(MemoryError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_embed_times_out_as_distinct_error_kind() {
        let embedder =
            EmbeddingService::new(Arc::new(StalledProvider), EmbeddingModel::JinaV2BaseEn)
                .with_timeout(Duration::from_millis(5));

        let result = embedder.embed("some legal text").await;

        assert!(matches!(result, Err(MemoryError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_ingest_times_out_when_store_stalls() {
        let spec = test_spec(4);

        // Embedding succeeds instantly; the batch upsert never completes
        let service = MemoryService::new(
            StalledRepository,
            embedder_with(stub_provider(4), EmbeddingModel::Custom(4)),
        )
        .with_timeout(Duration::from_millis(5));

        let result = service.ingest(&spec, vec![rule_802_doc()]).await;

        assert!(matches!(result, Err(MemoryError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_reset_deletes_existing_collection_before_recreate() {
        let mut repository = MockVectorRepository::new();
        let mut sequence = mockall::Sequence::new();

        repository
            .expect_get_collection()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|name| {
                Ok(Some(CollectionInfo {
                    name: name.to_string(),
                    points_count: 10,
                    dimension: 768,
                    distance: DistanceMetric::Cosine,
                    status: CollectionStatus::Green,
                }))
            });
        repository
            .expect_delete_collection()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(true));
        repository
            .expect_create_collection()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));

        let service = MemoryService::new(
            repository,
            embedder_with(stub_provider(768), EmbeddingModel::JinaV2BaseEn),
        );

        let spec = CollectionSpec::new("legal_memory", EmbeddingModel::JinaV2BaseEn);
        service.reset_collection(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_skips_delete_when_collection_missing() {
        let mut repository = MockVectorRepository::new();

        repository.expect_get_collection().returning(|_| Ok(None));
        // No expect_delete_collection: a delete call would panic the mock
        repository
            .expect_create_collection()
            .times(1)
            .returning(|_| Ok(()));

        let service = MemoryService::new(
            repository,
            embedder_with(stub_provider(768), EmbeddingModel::JinaV2BaseEn),
        );

        let spec = CollectionSpec::new("legal_memory", EmbeddingModel::JinaV2BaseEn);
        service.reset_collection(&spec).await.unwrap();
    }

    #[tokio::test]
    async fn test_ingest_embeds_all_documents_and_upserts_one_batch() {
        let spec = test_spec(4);

        let documents = vec![
            Document::new(1u64, "The defendant's strategy violated antitrust law."),
            Document::new(2u64, "Mark-to-market accounting was fully disclosed."),
            rule_802_doc(),
        ];

        let mut repository = MockVectorRepository::new();
        repository
            .expect_upsert_batch()
            .times(1)
            .withf(|name, records, wait| {
                name == "legal_memory"
                    && *wait
                    && records.len() == 3
                    && records[0].id == PointKey::Num(1)
                    && records[1].id == PointKey::Num(2)
                    && records[2].id == PointKey::Num(6)
            })
            .returning(|_, records, _| Ok(records.iter().map(|r| r.id).collect()));

        let service = MemoryService::new(
            repository,
            embedder_with(stub_provider(4), EmbeddingModel::Custom(4)),
        );

        let report = service.ingest(&spec, documents).await.unwrap();

        assert_eq!(report.count, 3);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_aborts_whole_run_on_embedding_failure() {
        let spec = test_spec(4);

        let mut provider = MockEmbeddingProvider::new();
        provider.expect_embed().returning(|_, text| {
            if text.contains("poison") {
                Err(MemoryError::Embedding("transform failed".to_string()))
            } else {
                Ok(EmbeddingResult {
                    values: stub_vector(4, 1.0),
                    dimension: 4,
                    tokens_used: None,
                })
            }
        });

        // No upsert expectation: reaching the store would panic the mock
        let repository = MockVectorRepository::new();

        let service = MemoryService::new(
            repository,
            embedder_with(provider, EmbeddingModel::Custom(4)),
        );

        let documents = vec![
            Document::new(1u64, "fine"),
            Document::new(2u64, "poison pill"),
            Document::new(3u64, "also fine"),
        ];

        let result = service.ingest(&spec, documents).await;
        assert!(matches!(result, Err(MemoryError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_ingest_rejects_vectors_of_wrong_width() {
        let spec = test_spec(4);

        // Provider produces 5-wide vectors against a 4-wide collection
        let repository = MockVectorRepository::new();
        let service = MemoryService::new(
            repository,
            embedder_with(stub_provider(5), EmbeddingModel::Custom(4)),
        );

        let result = service.ingest(&spec, vec![rule_802_doc()]).await;

        assert!(matches!(
            result,
            Err(MemoryError::DimensionMismatch {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[tokio::test]
    async fn test_ingest_empty_document_set_is_a_noop() {
        let repository = MockVectorRepository::new();
        let service = MemoryService::new(
            repository,
            embedder_with(MockEmbeddingProvider::new(), EmbeddingModel::Custom(4)),
        );

        let report = service.ingest(&test_spec(4), vec![]).await.unwrap();

        assert_eq!(report.count, 0);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_reingest_reuses_same_ids() {
        let spec = test_spec(4);

        let mut repository = MockVectorRepository::new();
        repository
            .expect_upsert_batch()
            .times(2)
            .withf(|_, records, _| {
                records.len() == 2
                    && records[0].id == PointKey::Num(1)
                    && records[1].id == PointKey::Num(2)
            })
            .returning(|_, records, _| Ok(records.iter().map(|r| r.id).collect()));

        let service = MemoryService::new(
            repository,
            embedder_with(stub_provider(4), EmbeddingModel::Custom(4)),
        );

        let documents = vec![
            Document::new(1u64, "first doc"),
            Document::new(2u64, "second doc"),
        ];

        // Same id set twice: the store overwrites in place, so both runs
        // submit exactly the same two ids rather than growing the collection
        let first = service.ingest(&spec, documents.clone()).await.unwrap();
        let second = service.ingest(&spec, documents).await.unwrap();

        assert_eq!(first.count, 2);
        assert_eq!(second.count, 2);
    }

    #[tokio::test]
    async fn test_upsert_record_rejects_wrong_width_before_store() {
        let spec = test_spec(4);

        // No upsert expectation: the record must be rejected client-side
        let repository = MockVectorRepository::new();
        let service = MemoryService::new(
            repository,
            embedder_with(MockEmbeddingProvider::new(), EmbeddingModel::Custom(4)),
        );

        let record = VectorRecord::new(7u64, vec![0.1; 5]);
        let result = service.upsert_record(&spec, record, true).await;

        assert!(matches!(
            result,
            Err(MemoryError::DimensionMismatch {
                expected: 4,
                actual: 5
            })
        ));
    }

    #[tokio::test]
    async fn test_search_text_returns_self_as_top_hit() {
        let spec = test_spec(4);
        let query_text = "Rule 802: Hearsay is not admissible unless it falls under an exception.";
        let expected_vector = stub_vector(4, query_text.len() as f32);

        let mut repository = MockVectorRepository::new();
        repository
            .expect_search()
            .times(1)
            .withf(move |name, query| {
                name == "legal_memory" && query.vector == expected_vector && query.limit == 1
            })
            .returning(|_, _| {
                Ok(vec![SearchResult {
                    id: PointKey::Num(6),
                    score: 0.9999,
                    payload: Some(serde_json::json!({"doc_type": "RULE"})),
                    vector: None,
                }])
            });

        let service = MemoryService::new(
            repository,
            embedder_with(stub_provider(4), EmbeddingModel::Custom(4)),
        );

        let results = service
            .search_text(&spec, query_text, 1, None)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, PointKey::Num(6));
        assert!(results[0].score > 0.99);
        assert_eq!(
            results[0].payload.as_ref().unwrap()["doc_type"],
            "RULE"
        );
    }
}
