use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Dimension mismatch: collection expects {expected}, vector has {actual}")]
    DimensionMismatch { expected: u32, actual: u32 },

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type MemoryResult<T> = Result<T, MemoryError>;

impl From<qdrant_client::QdrantError> for MemoryError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        MemoryError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for MemoryError {
    fn from(err: reqwest::Error) -> Self {
        MemoryError::Embedding(err.to_string())
    }
}

impl From<serde_json::Error> for MemoryError {
    fn from(err: serde_json::Error) -> Self {
        MemoryError::Internal(format!("JSON error: {}", err))
    }
}

/// Error body returned at the HTTP boundary: a status code plus a string detail
#[derive(Debug, Serialize)]
struct ErrorDetail {
    detail: String,
}

impl IntoResponse for MemoryError {
    fn into_response(self) -> Response {
        let status = match &self {
            MemoryError::Validation(_) => StatusCode::BAD_REQUEST,
            MemoryError::CollectionNotFound(_) => StatusCode::NOT_FOUND,
            MemoryError::DimensionMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            MemoryError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            MemoryError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            MemoryError::Embedding(_)
            | MemoryError::Store(_)
            | MemoryError::Config(_)
            | MemoryError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorDetail {
            detail: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message_names_both_widths() {
        let err = MemoryError::DimensionMismatch {
            expected: 768,
            actual: 769,
        };
        let msg = err.to_string();
        assert!(msg.contains("768"));
        assert!(msg.contains("769"));
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let response = MemoryError::Validation("empty id".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_model_unavailable_maps_to_service_unavailable() {
        let response = MemoryError::ModelUnavailable("no weights".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_timeout_maps_to_gateway_timeout() {
        let response = MemoryError::Timeout("embed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_dimension_mismatch_maps_to_unprocessable_entity() {
        let response = MemoryError::DimensionMismatch {
            expected: 768,
            actual: 384,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_store_maps_to_internal_server_error() {
        let response = MemoryError::Store("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
