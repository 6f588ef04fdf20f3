//! Application state wiring the chat pipeline together.
//!
//! AppState holds the orchestrator used by both CLI commands and REST
//! handlers, pinned to the concrete infra providers and store.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use newsbot_core::chat::orchestrator::ChatOrchestrator;
use newsbot_core::clock::SystemClock;
use newsbot_core::history::box_store::BoxConversationStore;
use newsbot_core::history::memory::InMemoryConversationStore;
use newsbot_core::history::sweeper::spawn_expiry_sweeper;
use newsbot_infra::config::{
    apply_env_overrides, default_config_path, load_config, resolve_data_dir, Credentials,
};
use newsbot_infra::llm::create_generation_provider;
use newsbot_infra::sqlite::history::SqliteConversationStore;
use newsbot_infra::sqlite::pool::{default_database_url, DatabasePool};
use newsbot_infra::vector::{create_embedding_provider, create_search_provider};
use newsbot_types::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub config: Arc<AppConfig>,
    /// `None` when history lives in process memory.
    pub db_pool: Option<DatabasePool>,
}

impl AppState {
    pub fn new(orchestrator: ChatOrchestrator, config: AppConfig, db_pool: Option<DatabasePool>) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            db_pool,
        }
    }

    /// Load configuration, resolve credentials, open the history store and
    /// build the provider clients.
    pub async fn init(config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config_path = config_path.unwrap_or_else(|| default_config_path(&data_dir));

        let mut config = load_config(&config_path).await;
        apply_env_overrides(&mut config);
        config.validate()?;

        let credentials = Credentials::from_env()?;
        let ttl = Duration::from_secs(config.store.ttl_secs);

        let (store, db_pool) = if config.store.is_in_memory() {
            tracing::info!("conversation history kept in memory");
            let store = InMemoryConversationStore::with_clock(ttl, Arc::new(SystemClock));
            (BoxConversationStore::new(store), None)
        } else {
            let url = match &config.store.database_url {
                Some(url) => url.clone(),
                None => {
                    tokio::fs::create_dir_all(&data_dir)
                        .await
                        .with_context(|| format!("failed to create {}", data_dir.display()))?;
                    default_database_url(&data_dir)
                }
            };
            let pool = DatabasePool::new(&url)
                .await
                .with_context(|| format!("failed to open history database at {url}"))?;
            let store = SqliteConversationStore::with_clock(pool.clone(), ttl, Arc::new(SystemClock));
            (BoxConversationStore::new(store), Some(pool))
        };

        let embedder = create_embedding_provider(&config.embedding, credentials.jina_api_key)?;
        let search = create_search_provider(&config.vector, credentials.qdrant_api_key)?;
        let generator = create_generation_provider(&config.generation, credentials.gemini_api_key)?;

        tracing::debug!(
            embedding_model = %embedder.model_name(),
            collection = %config.vector.collection,
            generation_model = %generator.model(),
            "providers configured"
        );

        let orchestrator = ChatOrchestrator::new(
            embedder,
            search,
            generator,
            Arc::new(store),
            config.retrieval.clone(),
        )
        .with_welcome_message(config.welcome_message.clone());

        Ok(Self::new(orchestrator, config, db_pool))
    }

    /// Start the background task that reclaims expired sessions.
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        spawn_expiry_sweeper(
            Arc::clone(self.orchestrator.store()),
            Duration::from_secs(self.config.store.sweep_interval_secs),
            cancel,
        )
    }

    /// Release the history store's connections.
    pub async fn shutdown(&self) {
        if let Some(pool) = &self.db_pool {
            pool.close().await;
            tracing::debug!("history database closed");
        }
    }
}
