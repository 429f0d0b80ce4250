use async_trait::async_trait;

use crate::error::MemoryResult;
use crate::models::{
    CollectionInfo, CollectionSpec, PointKey, SearchQuery, SearchResult, VectorRecord,
};

/// Repository trait for vector storage operations
///
/// Abstracts the underlying vector database (Qdrant). Collection schema is
/// declared through [`CollectionSpec`]; upserts overwrite by point id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorRepository: Send + Sync {
    // ===== Collection Management =====

    /// Create a new collection with the spec's dimension and distance metric
    async fn create_collection(&self, spec: &CollectionSpec) -> MemoryResult<()>;

    /// Delete a collection; returns false if it did not exist
    async fn delete_collection(&self, collection_name: &str) -> MemoryResult<bool>;

    /// Get collection info, or None if the collection does not exist
    async fn get_collection(&self, collection_name: &str) -> MemoryResult<Option<CollectionInfo>>;

    /// Exact number of points currently stored in the collection
    async fn count_points(&self, collection_name: &str) -> MemoryResult<u64>;

    // ===== Vector Operations =====

    /// Upsert a single record; an existing id is overwritten in place
    async fn upsert(
        &self,
        collection_name: &str,
        record: VectorRecord,
        wait: bool,
    ) -> MemoryResult<PointKey>;

    /// Upsert multiple records as one batch call
    async fn upsert_batch(
        &self,
        collection_name: &str,
        records: Vec<VectorRecord>,
        wait: bool,
    ) -> MemoryResult<Vec<PointKey>>;

    /// Search for similar vectors, ranked by the collection's distance metric
    async fn search(
        &self,
        collection_name: &str,
        query: SearchQuery,
    ) -> MemoryResult<Vec<SearchResult>>;
}
