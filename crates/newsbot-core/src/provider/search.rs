//! VectorSearchProvider trait definition.

use newsbot_types::error::ProviderError;
use newsbot_types::retrieval::RetrievedPassage;

/// Trait for similarity search over an indexed passage collection.
///
/// Guarantees only that results are ranked by descending score and that
/// there are at most `limit` of them. Implementations may or may not apply
/// `score_threshold` themselves; the caller filters again either way.
/// An empty result is a success, not an error.
pub trait VectorSearchProvider: Send + Sync {
    fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> impl std::future::Future<Output = Result<Vec<RetrievedPassage>, ProviderError>> + Send;

    /// Human-readable backend name (e.g., "qdrant").
    fn name(&self) -> &str;
}
