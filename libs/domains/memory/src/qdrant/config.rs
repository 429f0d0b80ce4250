use crate::error::MemoryResult;

/// Qdrant connection configuration
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl QdrantConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            api_key: None,
            timeout_secs: 30,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn from_env() -> MemoryResult<Self> {
        let url =
            std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6334".to_string());

        let api_key = std::env::var("QDRANT_API_KEY").ok();

        let timeout_secs = std::env::var("QDRANT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            url,
            api_key,
            timeout_secs,
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", None::<&str>),
                ("QDRANT_API_KEY", None),
                ("QDRANT_TIMEOUT_SECS", None),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://localhost:6334");
                assert!(config.api_key.is_none());
                assert_eq!(config.timeout_secs, 30);
            },
        );
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", Some("https://qdrant.example.com:6334")),
                ("QDRANT_API_KEY", Some("secret")),
                ("QDRANT_TIMEOUT_SECS", Some("5")),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "https://qdrant.example.com:6334");
                assert_eq!(config.api_key.as_deref(), Some("secret"));
                assert_eq!(config.timeout_secs, 5);
            },
        );
    }

    #[test]
    fn test_builder_style() {
        let config = QdrantConfig::new("http://localhost:6334".to_string())
            .with_api_key("key".to_string())
            .with_timeout(10);
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.timeout_secs, 10);
    }
}
