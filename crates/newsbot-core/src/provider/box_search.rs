//! BoxVectorSearchProvider -- object-safe dynamic dispatch wrapper for VectorSearchProvider.

use std::future::Future;
use std::pin::Pin;

use newsbot_types::error::ProviderError;
use newsbot_types::retrieval::RetrievedPassage;

use super::search::VectorSearchProvider;

/// Object-safe version of [`VectorSearchProvider`] with boxed futures.
pub trait VectorSearchProviderDyn: Send + Sync {
    fn search_boxed<'a>(
        &'a self,
        query_vector: &'a [f32],
        limit: usize,
        score_threshold: f32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RetrievedPassage>, ProviderError>> + Send + 'a>>;

    fn name_dyn(&self) -> &str;
}

impl<T: VectorSearchProvider> VectorSearchProviderDyn for T {
    fn search_boxed<'a>(
        &'a self,
        query_vector: &'a [f32],
        limit: usize,
        score_threshold: f32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RetrievedPassage>, ProviderError>> + Send + 'a>>
    {
        Box::pin(self.search(query_vector, limit, score_threshold))
    }

    fn name_dyn(&self) -> &str {
        self.name()
    }
}

/// Type-erased vector search backend.
pub struct BoxVectorSearchProvider {
    inner: Box<dyn VectorSearchProviderDyn + Send + Sync>,
}

impl BoxVectorSearchProvider {
    pub fn new<T: VectorSearchProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    /// Search for passages similar to `query_vector`, best match first.
    pub async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<RetrievedPassage>, ProviderError> {
        self.inner
            .search_boxed(query_vector, limit, score_threshold)
            .await
    }

    pub fn name(&self) -> &str {
        self.inner.name_dyn()
    }
}
