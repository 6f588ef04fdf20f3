//! EmbeddingProvider trait definition.

use newsbot_types::error::ProviderError;

/// Trait for converting a single message into an embedding vector.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// The vector's length must match the index the paired
/// [`VectorSearchProvider`](super::search::VectorSearchProvider) queries.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed exactly one text.
    ///
    /// Fails rather than returning an empty or zero vector when the
    /// upstream cannot produce one.
    fn embed(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, ProviderError>> + Send;

    /// The model name used for embeddings (e.g., "jina-embeddings-v2-base-en").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    fn dimension(&self) -> usize;
}
