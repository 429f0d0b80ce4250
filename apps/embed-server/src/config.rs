use core_config::server::ServerConfig;
use core_config::{ConfigError, Environment, FromEnv, env_or_default};
use domain_memory::EmbeddingModel;

/// Embed server configuration, loaded entirely from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub model: EmbeddingModel,
}

impl Config {
    /// Reads:
    /// - `APP_ENV`, `HOST`, `PORT` (see core_config)
    /// - `EMBED_MODEL`: wire name of the local model to serve
    ///   (default: nomic-embed-text-v1.5)
    pub fn from_env() -> Result<Self, ConfigError> {
        let model_name = env_or_default("EMBED_MODEL", "nomic-embed-text-v1.5");
        let model =
            EmbeddingModel::parse(&model_name).ok_or_else(|| ConfigError::ParseError {
                key: "EMBED_MODEL".to_string(),
                details: format!("unknown model '{}'", model_name),
            })?;

        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            model,
        })
    }
}
