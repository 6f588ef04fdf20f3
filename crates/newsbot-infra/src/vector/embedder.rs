//! Jina-based remote embedding generator.
//!
//! Implements the `EmbeddingProvider` trait from `newsbot-core` against the
//! Jina `/v1/embeddings` endpoint. The query is sent as a single-element
//! `input` array and the first returned vector is used.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use newsbot_core::provider::embedder::EmbeddingProvider;
use newsbot_types::config::EmbeddingConfig;
use newsbot_types::error::ProviderError;

use crate::http::{build_client, check_status, read_json, transport_error};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: [&'a str; 1],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by the Jina embeddings API.
///
/// The API key is only exposed when building the `Authorization` header.
pub struct JinaEmbedder {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    dimension: usize,
}

impl JinaEmbedder {
    pub fn new(config: &EmbeddingConfig, api_key: SecretString) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

impl EmbeddingProvider for JinaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = EmbeddingRequest {
            input: [text],
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let parsed: EmbeddingResponse = read_json(check_status(response).await?).await?;

        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::EmptyResponse("no embedding returned".to_string()))?;

        if embedding.len() != self.dimension {
            return Err(ProviderError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        tracing::debug!(model = %self.model, dimension = embedding.len(), "query embedded");
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
