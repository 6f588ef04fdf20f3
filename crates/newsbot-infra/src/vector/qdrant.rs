//! Qdrant REST search client.
//!
//! Implements `VectorSearchProvider` with
//! `POST {url}/collections/{collection}/points/search`. Passage text is read
//! from each point's `payload.text`; points without a string `text` are
//! skipped. Results keep the order Qdrant returns (best score first).

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use newsbot_core::provider::search::VectorSearchProvider;
use newsbot_types::config::VectorConfig;
use newsbot_types::error::ProviderError;
use newsbot_types::retrieval::RetrievedPassage;

use crate::http::{build_client, check_status, read_json, transport_error};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    score_threshold: f32,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

impl ScoredPoint {
    fn into_passage(self) -> Option<RetrievedPassage> {
        let text = self.payload?.get("text")?.as_str()?.to_string();
        Some(RetrievedPassage::new(text, self.score))
    }
}

/// Vector search over a Qdrant collection of article chunks.
pub struct QdrantSearch {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    url: String,
    collection: String,
}

impl QdrantSearch {
    pub fn new(config: &VectorConfig, api_key: Option<SecretString>) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.timeout_secs))?,
            api_key,
            url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
        })
    }
}

impl VectorSearchProvider for QdrantSearch {
    async fn search(
        &self,
        query_vector: &[f32],
        limit: usize,
        score_threshold: f32,
    ) -> Result<Vec<RetrievedPassage>, ProviderError> {
        let url = format!("{}/collections/{}/points/search", self.url, self.collection);
        let body = SearchRequest {
            vector: query_vector,
            limit,
            score_threshold,
            with_payload: true,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("api-key", key.expose_secret());
        }
        let response = request.send().await.map_err(transport_error)?;
        let parsed: SearchResponse = read_json(check_status(response).await?).await?;

        let hits = parsed.result.len();
        let passages: Vec<RetrievedPassage> = parsed
            .result
            .into_iter()
            .filter_map(ScoredPoint::into_passage)
            .collect();
        if passages.len() < hits {
            tracing::debug!(
                collection = %self.collection,
                skipped = hits - passages.len(),
                "search hits without text payload"
            );
        }
        Ok(passages)
    }

    fn name(&self) -> &str {
        "qdrant"
    }
}
