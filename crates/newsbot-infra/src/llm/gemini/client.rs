//! GeminiProvider -- concrete [`GenerationProvider`] implementation for Google Gemini.
//!
//! Sends a single user turn to `/v1beta/models/{model}:generateContent` and
//! returns the text of the first candidate. The API key travels in the
//! `x-goog-api-key` header, never in the URL, so it cannot leak into
//! request logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use newsbot_core::provider::generator::GenerationProvider;
use newsbot_types::config::GenerationConfig;
use newsbot_types::error::ProviderError;

use super::types::{GenerateContentRequest, GenerateContentResponse};
use crate::http::{build_client, check_status, read_json, transport_error};

/// Google Gemini generation provider.
///
/// Does not derive `Debug`; the key is a [`SecretString`] and only exposed
/// when building request headers.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(config: &GenerationConfig, api_key: SecretString) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

impl GenerationProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = self.url();
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&GenerateContentRequest::user_prompt(prompt))
            .send()
            .await
            .map_err(transport_error)?;
        let parsed: GenerateContentResponse = read_json(check_status(response).await?).await?;

        match parsed.first_candidate_text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                let reason = parsed
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.clone())
                    .unwrap_or_else(|| "no candidates".to_string());
                Err(ProviderError::EmptyResponse(format!(
                    "Gemini returned no text ({reason})"
                )))
            }
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
