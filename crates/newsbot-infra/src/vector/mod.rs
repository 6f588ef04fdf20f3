//! Retrieval backends: query embedding and vector search.
//!
//! Provides the Jina embedding client and the Qdrant search client, plus
//! factories that wrap them in the boxed core types.

pub mod embedder;
pub mod qdrant;

use secrecy::SecretString;

use newsbot_core::provider::box_embedder::BoxEmbeddingProvider;
use newsbot_core::provider::box_search::BoxVectorSearchProvider;
use newsbot_types::config::{EmbeddingConfig, VectorConfig};
use newsbot_types::error::ProviderError;

use self::embedder::JinaEmbedder;
use self::qdrant::QdrantSearch;

/// Create a [`BoxEmbeddingProvider`] for the configured Jina endpoint.
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
    api_key: SecretString,
) -> Result<BoxEmbeddingProvider, ProviderError> {
    Ok(BoxEmbeddingProvider::new(JinaEmbedder::new(config, api_key)?))
}

/// Create a [`BoxVectorSearchProvider`] for the configured Qdrant collection.
///
/// `api_key` is optional: local Qdrant instances usually run without one.
pub fn create_search_provider(
    config: &VectorConfig,
    api_key: Option<SecretString>,
) -> Result<BoxVectorSearchProvider, ProviderError> {
    Ok(BoxVectorSearchProvider::new(QdrantSearch::new(config, api_key)?))
}
