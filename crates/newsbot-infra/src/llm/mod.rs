//! Generation provider implementations.
//!
//! Contains the Gemini implementation of the [`GenerationProvider`] trait
//! defined in `newsbot-core`, and a factory ([`create_generation_provider`])
//! that wraps it for dynamic dispatch.
//!
//! [`GenerationProvider`]: newsbot_core::provider::generator::GenerationProvider

pub mod gemini;

use secrecy::SecretString;

use newsbot_core::provider::box_generator::BoxGenerationProvider;
use newsbot_types::config::GenerationConfig;
use newsbot_types::error::ProviderError;

use self::gemini::GeminiProvider;

/// Create a [`BoxGenerationProvider`] from a [`GenerationConfig`].
pub fn create_generation_provider(
    config: &GenerationConfig,
    api_key: SecretString,
) -> Result<BoxGenerationProvider, ProviderError> {
    Ok(BoxGenerationProvider::new(GeminiProvider::new(config, api_key)?))
}
