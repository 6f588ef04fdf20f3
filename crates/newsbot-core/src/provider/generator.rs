//! GenerationProvider trait definition.

use newsbot_types::error::ProviderError;

/// Trait for single-shot text generation.
///
/// Stateless: the provider keeps no conversation between calls, so all
/// grounding must be carried in the prompt itself.
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// An empty or malformed upstream response is an error.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, ProviderError>> + Send;

    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model identifier used for generation.
    fn model(&self) -> &str;
}
