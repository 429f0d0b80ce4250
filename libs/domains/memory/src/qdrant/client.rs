use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, CountPointsBuilder, CreateCollectionBuilder, Distance, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{MemoryError, MemoryResult};
use crate::models::{
    CollectionInfo, CollectionSpec, CollectionStatus, DistanceMetric, PointKey, SearchQuery,
    SearchResult, VectorRecord,
};
use crate::repository::VectorRepository;

/// Qdrant-backed implementation of VectorRepository
pub struct QdrantRepository {
    client: Qdrant,
}

impl QdrantRepository {
    pub async fn new(config: QdrantConfig) -> MemoryResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| MemoryError::Store(format!("Failed to build client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_client(client: Qdrant) -> Self {
        Self { client }
    }

    fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
            DistanceMetric::Manhattan => Distance::Manhattan,
        }
    }

    fn from_qdrant_distance(distance: Distance) -> DistanceMetric {
        match distance {
            Distance::Cosine => DistanceMetric::Cosine,
            Distance::Euclid => DistanceMetric::Euclidean,
            Distance::Dot => DistanceMetric::DotProduct,
            Distance::Manhattan => DistanceMetric::Manhattan,
            _ => DistanceMetric::Cosine,
        }
    }

    fn key_to_point_id(key: PointKey) -> PointId {
        match key {
            PointKey::Num(n) => PointId::from(n),
            PointKey::Uuid(u) => PointId::from(u.to_string()),
        }
    }

    fn point_id_to_key(point_id: &PointId) -> MemoryResult<PointKey> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(PointKey::Num(*num)),
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid_str)) => Uuid::parse_str(uuid_str)
                .map(PointKey::Uuid)
                .map_err(|e| MemoryError::Internal(format!("Invalid UUID: {}", e))),
            None => Err(MemoryError::Internal("Missing point ID".to_string())),
        }
    }

    fn payload_to_qdrant(payload: Option<serde_json::Value>) -> HashMap<String, QdrantValue> {
        let Some(serde_json::Value::Object(map)) = payload else {
            return HashMap::new();
        };

        map.into_iter()
            .filter_map(|(key, val)| json_to_qdrant_value(val).map(|v| (key, v)))
            .collect()
    }

    fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> Option<serde_json::Value> {
        if payload.is_empty() {
            return None;
        }

        let mut map = serde_json::Map::new();
        for (key, val) in payload {
            if let Some(json_val) = qdrant_value_to_json(val) {
                map.insert(key, json_val);
            }
        }

        Some(serde_json::Value::Object(map))
    }

    fn record_to_point(record: VectorRecord) -> PointStruct {
        PointStruct::new(
            Self::key_to_point_id(record.id),
            record.values,
            Self::payload_to_qdrant(record.payload),
        )
    }
}

fn json_to_qdrant_value(val: serde_json::Value) -> Option<QdrantValue> {
    match val {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(QdrantValue::from(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(QdrantValue::from(i))
            } else {
                n.as_f64().map(QdrantValue::from)
            }
        }
        serde_json::Value::String(s) => Some(QdrantValue::from(s)),
        // Nested structures are stored as their JSON text
        _ => Some(QdrantValue::from(val.to_string())),
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind {
        Some(Kind::NullValue(_)) => Some(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(b)),
        Some(Kind::IntegerValue(i)) => Some(serde_json::Value::Number(i.into())),
        Some(Kind::DoubleValue(f)) => {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number)
        }
        Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s)),
        _ => None,
    }
}

#[async_trait]
impl VectorRepository for QdrantRepository {
    async fn create_collection(&self, spec: &CollectionSpec) -> MemoryResult<()> {
        let builder = CreateCollectionBuilder::new(&spec.name).vectors_config(
            VectorParamsBuilder::new(
                spec.dimension() as u64,
                Self::to_qdrant_distance(spec.distance),
            ),
        );

        self.client.create_collection(builder).await?;

        Ok(())
    }

    async fn delete_collection(&self, collection_name: &str) -> MemoryResult<bool> {
        if !self.client.collection_exists(collection_name).await? {
            return Ok(false);
        }

        self.client.delete_collection(collection_name).await?;
        Ok(true)
    }

    async fn get_collection(&self, collection_name: &str) -> MemoryResult<Option<CollectionInfo>> {
        if !self.client.collection_exists(collection_name).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(collection_name).await?;

        let result = info
            .result
            .ok_or_else(|| MemoryError::Internal("Collection info missing result".to_string()))?;

        let (dimension, distance) = Self::extract_schema(&result.config);

        let status = match result.status() {
            qdrant::CollectionStatus::Green => CollectionStatus::Green,
            qdrant::CollectionStatus::Yellow => CollectionStatus::Yellow,
            _ => CollectionStatus::Grey,
        };

        Ok(Some(CollectionInfo {
            name: collection_name.to_string(),
            points_count: result.points_count.unwrap_or(0),
            dimension,
            distance,
            status,
        }))
    }

    async fn count_points(&self, collection_name: &str) -> MemoryResult<u64> {
        let response = self
            .client
            .count(CountPointsBuilder::new(collection_name).exact(true))
            .await?;

        Ok(response.result.map(|r| r.count).unwrap_or(0))
    }

    async fn upsert(
        &self,
        collection_name: &str,
        record: VectorRecord,
        wait: bool,
    ) -> MemoryResult<PointKey> {
        let id = record.id;
        let point = Self::record_to_point(record);

        let mut builder = UpsertPointsBuilder::new(collection_name, vec![point]);
        if wait {
            builder = builder.wait(true);
        }

        self.client.upsert_points(builder).await?;

        Ok(id)
    }

    async fn upsert_batch(
        &self,
        collection_name: &str,
        records: Vec<VectorRecord>,
        wait: bool,
    ) -> MemoryResult<Vec<PointKey>> {
        let ids: Vec<PointKey> = records.iter().map(|r| r.id).collect();

        let points: Vec<PointStruct> = records.into_iter().map(Self::record_to_point).collect();

        let mut builder = UpsertPointsBuilder::new(collection_name, points);
        if wait {
            builder = builder.wait(true);
        }

        self.client.upsert_points(builder).await?;

        Ok(ids)
    }

    async fn search(
        &self,
        collection_name: &str,
        query: SearchQuery,
    ) -> MemoryResult<Vec<SearchResult>> {
        let mut builder =
            SearchPointsBuilder::new(collection_name, query.vector, query.limit as u64);

        if let Some(threshold) = query.score_threshold {
            builder = builder.score_threshold(threshold);
        }

        builder = builder.with_vectors(query.with_vectors);
        builder = builder.with_payload(query.with_payloads);

        let results = self.client.search_points(builder).await?;

        results
            .result
            .into_iter()
            .map(|point| {
                let id = point
                    .id
                    .as_ref()
                    .map(Self::point_id_to_key)
                    .transpose()?
                    .ok_or_else(|| MemoryError::Internal("Missing point ID".to_string()))?;

                let vector = Self::extract_vector_from_output(&point.vectors);

                Ok(SearchResult {
                    id,
                    score: point.score,
                    payload: Self::qdrant_to_payload(point.payload),
                    vector,
                })
            })
            .collect()
    }
}

impl QdrantRepository {
    /// Extract vector values from VectorsOutput
    /// Note: uses the deprecated data field until migration to 1.18+
    #[allow(deprecated)]
    fn extract_vector_from_output(vectors: &Option<qdrant::VectorsOutput>) -> Option<Vec<f32>> {
        match vectors {
            Some(qdrant::VectorsOutput {
                vectors_options: Some(opts),
            }) => match opts {
                qdrant::vectors_output::VectorsOptions::Vector(v) => Some(v.data.clone()),
                qdrant::vectors_output::VectorsOptions::Vectors(map) => {
                    // For multi-vector, return the first one
                    map.vectors.values().next().map(|v| v.data.clone())
                }
            },
            _ => None,
        }
    }

    fn extract_schema(config: &Option<qdrant::CollectionConfig>) -> (u32, DistanceMetric) {
        let params = config
            .as_ref()
            .and_then(|c| c.params.as_ref())
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|vc| vc.config.as_ref());

        match params {
            Some(qdrant::vectors_config::Config::Params(p)) => {
                (p.size as u32, Self::from_qdrant_distance(p.distance()))
            }
            Some(qdrant::vectors_config::Config::ParamsMap(map)) => map
                .map
                .values()
                .next()
                .map(|p| (p.size as u32, Self::from_qdrant_distance(p.distance())))
                .unwrap_or((0, DistanceMetric::Cosine)),
            None => (0, DistanceMetric::Cosine),
        }
    }
}
