mod jina;
mod local;
mod provider;

pub use jina::{JinaConfig, JinaProvider};
pub use local::FastEmbedProvider;
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
