//! BoxGenerationProvider -- object-safe dynamic dispatch wrapper for GenerationProvider.

use std::future::Future;
use std::pin::Pin;

use newsbot_types::error::ProviderError;

use super::generator::GenerationProvider;

/// Object-safe version of [`GenerationProvider`] with boxed futures.
pub trait GenerationProviderDyn: Send + Sync {
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;

    fn name_dyn(&self) -> &str;

    fn model_dyn(&self) -> &str;
}

impl<T: GenerationProvider> GenerationProviderDyn for T {
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(self.generate(prompt))
    }

    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn model_dyn(&self) -> &str {
        self.model()
    }
}

/// Type-erased generation provider for runtime selection.
///
/// Since `GenerationProvider` uses RPITIT, it cannot be used as a trait
/// object directly; this wrapper delegates to `GenerationProviderDyn`.
pub struct BoxGenerationProvider {
    inner: Box<dyn GenerationProviderDyn + Send + Sync>,
}

impl BoxGenerationProvider {
    pub fn new<T: GenerationProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.inner.generate_boxed(prompt).await
    }

    pub fn name(&self) -> &str {
        self.inner.name_dyn()
    }

    pub fn model(&self) -> &str {
        self.inner.model_dyn()
    }
}
