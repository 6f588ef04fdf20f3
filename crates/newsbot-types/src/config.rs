//! Configuration types for newsbot.
//!
//! `AppConfig` mirrors `config.toml`. Every field has a default, so an
//! empty file (or no file at all) yields a runnable configuration once
//! credentials are present in the environment.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::retrieval::RetrievalSettings;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub retrieval: RetrievalSettings,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub vector: VectorConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    /// Static greeting returned by `GET /api/chat`.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

fn default_welcome_message() -> String {
    "Welcome to the news chatbot! Ask me anything about the latest articles.".to_string()
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Conversation history storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Connection URL of the history database. `None` uses `newsbot.db`
    /// in the data directory; the literal `"memory"` keeps history in
    /// process memory only.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Rolling time-to-live of a session, reset on every append.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// How often expired sessions are physically removed.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

/// Embedding provider (Jina-compatible `/v1/embeddings`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Expected vector length; must match the search index.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_embedding_base_url() -> String {
    "https://api.jina.ai".to_string()
}

fn default_embedding_model() -> String {
    "jina-embeddings-v2-base-en".to_string()
}

fn default_embedding_dimension() -> usize {
    768
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Vector index (Qdrant REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    #[serde(default = "default_vector_url")]
    pub url: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_vector_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "news_articles".to_string()
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            url: default_vector_url(),
            collection: default_collection(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Generation model (Gemini `generateContent`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_generation_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Value of `database_url` that selects the in-process store.
    pub const IN_MEMORY: &'static str = "memory";

    pub fn is_in_memory(&self) -> bool {
        self.database_url.as_deref() == Some(Self::IN_MEMORY)
    }
}

impl AppConfig {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retrieval.limit == 0 {
            return Err(invalid("retrieval.limit", "must be at least 1"));
        }
        let threshold = self.retrieval.score_threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(invalid(
                "retrieval.score_threshold",
                format!("must be within [0, 1], got {threshold}"),
            ));
        }
        if self.store.ttl_secs == 0 {
            return Err(invalid("store.ttl_secs", "must be greater than zero"));
        }
        if self.store.sweep_interval_secs == 0 {
            return Err(invalid("store.sweep_interval_secs", "must be greater than zero"));
        }
        if self.embedding.dimension == 0 {
            return Err(invalid("embedding.dimension", "must be greater than zero"));
        }
        for (field, value) in [
            ("embedding.base_url", &self.embedding.base_url),
            ("embedding.model", &self.embedding.model),
            ("vector.url", &self.vector.url),
            ("vector.collection", &self.vector.collection),
            ("generation.base_url", &self.generation.base_url),
            ("generation.model", &self.generation.model),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
