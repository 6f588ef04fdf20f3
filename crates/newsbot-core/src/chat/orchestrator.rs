//! ChatOrchestrator: message in, grounded answer out.
//!
//! One `send_message` call is a single linear pass:
//! embed -> search -> (bypass | prompt -> generate) -> persist -> reply.
//! No state is kept between calls; concurrency is handled by the store's
//! per-session isolation.

use std::sync::Arc;

use newsbot_types::chat::{SessionHistory, SessionId, Turn};
use newsbot_types::error::{ChatError, ProviderError};
use newsbot_types::retrieval::{RetrievalSettings, RetrievedPassage};
use tracing::{debug, info, info_span, Instrument};

use super::prompt::{build_context, build_prompt, FALLBACK_REPLY};
use crate::clock::{Clock, SystemClock};
use crate::history::box_store::BoxConversationStore;
use crate::provider::box_embedder::BoxEmbeddingProvider;
use crate::provider::box_generator::BoxGenerationProvider;
use crate::provider::box_search::BoxVectorSearchProvider;

/// Composes the embedding, search, generation and history components into
/// the end-to-end answer pipeline.
///
/// Owns the two policy decisions of the system: which passages count as
/// relevant, and skipping generation entirely when none do.
pub struct ChatOrchestrator {
    embedder: BoxEmbeddingProvider,
    search: BoxVectorSearchProvider,
    generator: BoxGenerationProvider,
    store: Arc<BoxConversationStore>,
    retrieval: RetrievalSettings,
    clock: Arc<dyn Clock>,
    welcome_message: String,
}

impl ChatOrchestrator {
    pub fn new(
        embedder: BoxEmbeddingProvider,
        search: BoxVectorSearchProvider,
        generator: BoxGenerationProvider,
        store: Arc<BoxConversationStore>,
        retrieval: RetrievalSettings,
    ) -> Self {
        Self {
            embedder,
            search,
            generator,
            store,
            retrieval,
            clock: Arc::new(SystemClock),
            welcome_message: String::new(),
        }
    }

    /// Stamp turns with `clock` instead of wall-clock time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    /// The shared conversation store (also handed to the expiry sweeper).
    pub fn store(&self) -> &Arc<BoxConversationStore> {
        &self.store
    }

    /// Answer `message` for `session_id` and record the exchange.
    ///
    /// Provider failures propagate unchanged and nothing is persisted. When
    /// no passage clears the score threshold the fixed [`FALLBACK_REPLY`] is
    /// returned and stored without calling the generation provider.
    pub async fn send_message(
        &self,
        session_id: &SessionId,
        message: &str,
    ) -> Result<String, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::InvalidInput("message must not be empty".to_string()));
        }

        let span = info_span!(
            "embedding.embed",
            embedding.model = %self.embedder.model_name(),
            embedding.dimension = self.embedder.dimension(),
        );
        let vector = self
            .embedder
            .embed(message)
            .instrument(span)
            .await
            .map_err(ChatError::EmbeddingUnavailable)?;
        if vector.is_empty() {
            return Err(ChatError::EmbeddingUnavailable(ProviderError::EmptyResponse(
                "embedding vector is empty".to_string(),
            )));
        }

        let span = info_span!(
            "vector.search",
            vector.backend = %self.search.name(),
            vector.limit = self.retrieval.limit,
            vector.score_threshold = self.retrieval.score_threshold,
        );
        let hits = self
            .search
            .search(&vector, self.retrieval.limit, self.retrieval.score_threshold)
            .instrument(span)
            .await
            .map_err(ChatError::SearchUnavailable)?;

        let passages = select_passages(hits, &self.retrieval);
        debug!(
            session_id = %session_id,
            passages = passages.len(),
            "retrieved context passages"
        );

        let reply = if passages.is_empty() {
            debug!(session_id = %session_id, "no passage above threshold, skipping generation");
            FALLBACK_REPLY.to_string()
        } else {
            let prompt = build_prompt(&build_context(&passages), message);
            let span = info_span!(
                "gen_ai.generate",
                gen_ai.system = %self.generator.name(),
                gen_ai.request.model = %self.generator.model(),
            );
            let answer = self
                .generator
                .generate(&prompt)
                .instrument(span)
                .await
                .map_err(ChatError::GenerationUnavailable)?;
            if answer.trim().is_empty() {
                return Err(ChatError::GenerationUnavailable(ProviderError::EmptyResponse(
                    "generated text is empty".to_string(),
                )));
            }
            answer
        };

        let turn = Turn::new(message, reply.as_str(), self.clock.now());
        self.store.append(session_id, &turn).await?;
        info!(session_id = %session_id, "turn recorded");

        Ok(reply)
    }

    /// The session's turns, oldest first. Empty for unknown sessions.
    pub async fn history(&self, session_id: &SessionId) -> Result<Vec<Turn>, ChatError> {
        Ok(self.store.list(session_id).await?)
    }

    /// Every active session with its history.
    pub async fn all_sessions(&self) -> Result<Vec<SessionHistory>, ChatError> {
        let sessions = self.store.all_sessions().await?;
        debug!(sessions = sessions.len(), "listed active sessions");
        Ok(sessions)
    }

    /// Drop a session's history. Succeeds for unknown sessions.
    pub async fn clear_history(&self, session_id: &SessionId) -> Result<(), ChatError> {
        self.store.clear(session_id).await?;
        info!(session_id = %session_id, "history cleared");
        Ok(())
    }

    pub fn welcome_message(&self) -> &str {
        &self.welcome_message
    }
}

/// Keep passages at or above the threshold, at most `limit` of them, in the
/// order the search backend returned them.
fn select_passages(
    hits: Vec<RetrievedPassage>,
    settings: &RetrievalSettings,
) -> Vec<RetrievedPassage> {
    hits.into_iter()
        .filter(|p| p.score >= settings.score_threshold)
        .take(settings.limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use newsbot_types::error::StoreError;

    use crate::chat::prompt::CONTEXT_SEPARATOR;
    use crate::clock::ManualClock;
    use crate::history::memory::InMemoryConversationStore;
    use crate::history::store::ConversationStore;
    use crate::history::DEFAULT_SESSION_TTL;
    use crate::provider::embedder::EmbeddingProvider;
    use crate::provider::generator::GenerationProvider;
    use crate::provider::search::VectorSearchProvider;

    // -- Fakes ---------------------------------------------------------------

    struct FakeEmbedder {
        vector: Option<Vec<f32>>,
        calls: Arc<AtomicUsize>,
    }

    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.vector
                .clone()
                .ok_or_else(|| ProviderError::EmptyResponse("no data".to_string()))
        }

        fn model_name(&self) -> &str {
            "fake-embedder"
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    struct FakeSearch {
        hits: Result<Vec<RetrievedPassage>, String>,
        calls: Arc<AtomicUsize>,
    }

    impl VectorSearchProvider for FakeSearch {
        async fn search(
            &self,
            _query_vector: &[f32],
            _limit: usize,
            _score_threshold: f32,
        ) -> Result<Vec<RetrievedPassage>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.hits.clone().map_err(ProviderError::Http)
        }

        fn name(&self) -> &str {
            "fake-search"
        }
    }

    struct FakeGenerator {
        answer: Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl GenerationProvider for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answer.clone().map_err(|body| ProviderError::Status { status: 503, body })
        }

        fn name(&self) -> &str {
            "fake-generator"
        }

        fn model(&self) -> &str {
            "fake-model"
        }
    }

    struct UnreachableStore;

    impl ConversationStore for UnreachableStore {
        async fn append(&self, _session_id: &SessionId, _turn: &Turn) -> Result<(), StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        async fn list(&self, _session_id: &SessionId) -> Result<Vec<Turn>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        async fn clear(&self, _session_id: &SessionId) -> Result<(), StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        async fn list_session_ids(&self) -> Result<Vec<SessionId>, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }

        async fn purge_expired(&self) -> Result<u64, StoreError> {
            Err(StoreError::Connection("connection refused".to_string()))
        }
    }

    // -- Harness ------------------------------------------------------------

    struct Harness {
        orchestrator: ChatOrchestrator,
        embed_calls: Arc<AtomicUsize>,
        search_calls: Arc<AtomicUsize>,
        prompts: Arc<Mutex<Vec<String>>>,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn generation_calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    fn harness(
        vector: Option<Vec<f32>>,
        hits: Result<Vec<RetrievedPassage>, String>,
        answer: Result<String, String>,
    ) -> Harness {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 11, 6, 8, 0, 0).unwrap(),
        ));
        let store = InMemoryConversationStore::with_clock(DEFAULT_SESSION_TTL, clock.clone());
        harness_with_store(BoxConversationStore::new(store), clock, vector, hits, answer)
    }

    fn harness_with_store(
        store: BoxConversationStore,
        clock: Arc<ManualClock>,
        vector: Option<Vec<f32>>,
        hits: Result<Vec<RetrievedPassage>, String>,
        answer: Result<String, String>,
    ) -> Harness {
        let embed_calls = Arc::new(AtomicUsize::new(0));
        let search_calls = Arc::new(AtomicUsize::new(0));
        let prompts = Arc::new(Mutex::new(Vec::new()));

        let orchestrator = ChatOrchestrator::new(
            BoxEmbeddingProvider::new(FakeEmbedder {
                vector,
                calls: Arc::clone(&embed_calls),
            }),
            BoxVectorSearchProvider::new(FakeSearch {
                hits,
                calls: Arc::clone(&search_calls),
            }),
            BoxGenerationProvider::new(FakeGenerator {
                answer,
                prompts: Arc::clone(&prompts),
            }),
            Arc::new(store),
            RetrievalSettings::default(),
        )
        .with_clock(clock.clone())
        .with_welcome_message("Hello from the newsroom");

        Harness {
            orchestrator,
            embed_calls,
            search_calls,
            prompts,
            clock,
        }
    }

    fn vector() -> Option<Vec<f32>> {
        Some(vec![0.1, 0.2, 0.3])
    }

    fn passage(text: &str, score: f32) -> RetrievedPassage {
        RetrievedPassage::new(text, score)
    }

    // -- Pipeline -----------------------------------------------------------

    #[tokio::test]
    async fn test_relevant_passages_are_used_for_generation() {
        let h = harness(
            vector(),
            Ok(vec![
                passage("Turnout hit a record high.", 0.91),
                passage("The incumbent conceded on Wednesday.", 0.75),
                passage("Recounts were requested in two counties.", 0.62),
            ]),
            Ok("The incumbent conceded after record turnout.".to_string()),
        );
        let session = SessionId::new();

        let reply = h
            .orchestrator
            .send_message(&session, "What happened in the election?")
            .await
            .unwrap();

        assert_eq!(reply, "The incumbent conceded after record turnout.");
        assert_eq!(h.generation_calls(), 1);

        let prompt = h.last_prompt();
        let expected_context = [
            "Turnout hit a record high.",
            "The incumbent conceded on Wednesday.",
            "Recounts were requested in two counties.",
        ]
        .join(CONTEXT_SEPARATOR);
        assert!(prompt.contains(&expected_context));
        assert!(prompt.contains("What happened in the election?"));

        let history = h.orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user, "What happened in the election?");
        assert_eq!(history[0].bot, reply);
        assert_eq!(history[0].timestamp, h.clock.now());
    }

    #[tokio::test]
    async fn test_low_scores_bypass_generation() {
        let h = harness(
            vector(),
            Ok(vec![passage("Unrelated weather report.", 0.3)]),
            Ok("should never be returned".to_string()),
        );
        let session = SessionId::new();

        let reply = h
            .orchestrator
            .send_message(&session, "asdkjasdkj nonsense")
            .await
            .unwrap();

        assert_eq!(reply, FALLBACK_REPLY);
        assert_eq!(h.generation_calls(), 0);

        let history = h.orchestrator.history(&session).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user, "asdkjasdkj nonsense");
        assert_eq!(history[0].bot, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_search_bypasses_generation() {
        let h = harness(vector(), Ok(Vec::new()), Ok("unused".to_string()));
        let session = SessionId::new();

        let reply = h.orchestrator.send_message(&session, "anything?").await.unwrap();

        assert_eq!(reply, FALLBACK_REPLY);
        assert_eq!(h.generation_calls(), 0);
        assert_eq!(h.search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive_and_filters_mixed_results() {
        let h = harness(
            vector(),
            Ok(vec![
                passage("exactly at threshold", 0.6),
                passage("just below", 0.59),
            ]),
            Ok("answer".to_string()),
        );

        h.orchestrator
            .send_message(&SessionId::new(), "question")
            .await
            .unwrap();

        let prompt = h.last_prompt();
        assert!(prompt.contains("exactly at threshold"));
        assert!(!prompt.contains("just below"));
    }

    #[tokio::test]
    async fn test_passages_keep_search_order() {
        // Deliberately not sorted by score: the orchestrator must not re-rank.
        let h = harness(
            vector(),
            Ok(vec![passage("alpha", 0.7), passage("bravo", 0.95)]),
            Ok("answer".to_string()),
        );

        h.orchestrator
            .send_message(&SessionId::new(), "question")
            .await
            .unwrap();

        let prompt = h.last_prompt();
        assert!(prompt.contains(&format!("alpha{CONTEXT_SEPARATOR}bravo")));
    }

    #[tokio::test]
    async fn test_passages_capped_at_limit() {
        let h = harness(
            vector(),
            Ok(vec![
                passage("p1", 0.99),
                passage("p2", 0.98),
                passage("p3", 0.97),
                passage("p4", 0.96),
            ]),
            Ok("answer".to_string()),
        );

        h.orchestrator
            .send_message(&SessionId::new(), "question")
            .await
            .unwrap();

        let prompt = h.last_prompt();
        assert!(prompt.contains("p3"));
        assert!(!prompt.contains("p4"));
    }

    // -- Failures -----------------------------------------------------------

    #[tokio::test]
    async fn test_blank_message_rejected_before_any_provider_call() {
        let h = harness(vector(), Ok(Vec::new()), Ok("unused".to_string()));

        let err = h
            .orchestrator
            .send_message(&SessionId::new(), "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::InvalidInput(_)));
        assert_eq!(h.embed_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let h = harness(None, Ok(vec![passage("x", 0.9)]), Ok("unused".to_string()));
        let session = SessionId::new();

        let err = h
            .orchestrator
            .send_message(&session, "question")
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::EmbeddingUnavailable(_)));
        assert_eq!(h.search_calls.load(Ordering::SeqCst), 0);
        assert!(h.orchestrator.history(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_embedding_is_not_searched() {
        let h = harness(Some(Vec::new()), Ok(Vec::new()), Ok("unused".to_string()));

        let err = h
            .orchestrator
            .send_message(&SessionId::new(), "question")
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::EmbeddingUnavailable(_)));
        assert_eq!(h.search_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let h = harness(vector(), Err("index offline".to_string()), Ok("unused".to_string()));
        let session = SessionId::new();

        let err = h
            .orchestrator
            .send_message(&session, "question")
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::SearchUnavailable(_)));
        assert_eq!(h.generation_calls(), 0);
        assert!(h.orchestrator.history(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_persists_nothing() {
        let h = harness(
            vector(),
            Ok(vec![passage("context", 0.9)]),
            Err("model overloaded".to_string()),
        );
        let session = SessionId::new();

        let err = h
            .orchestrator
            .send_message(&session, "question")
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::GenerationUnavailable(_)));
        assert!(h.orchestrator.history(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_generation_is_an_error() {
        let h = harness(vector(), Ok(vec![passage("context", 0.9)]), Ok("  \n".to_string()));
        let session = SessionId::new();

        let err = h
            .orchestrator
            .send_message(&session, "question")
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::GenerationUnavailable(_)));
        assert!(h.orchestrator.history(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_surfaces_as_store_unavailable() {
        let clock = Arc::new(ManualClock::default());
        let h = harness_with_store(
            BoxConversationStore::new(UnreachableStore),
            clock,
            vector(),
            Ok(vec![passage("context", 0.9)]),
            Ok("answer".to_string()),
        );
        let session = SessionId::new();

        let err = h
            .orchestrator
            .send_message(&session, "question")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::StoreUnavailable(_)));

        // Unreachable storage must not look like an empty history.
        let err = h.orchestrator.history(&session).await.unwrap_err();
        assert!(matches!(err, ChatError::StoreUnavailable(_)));
    }

    // -- History operations -------------------------------------------------

    #[tokio::test]
    async fn test_history_accumulates_oldest_first() {
        let h = harness(vector(), Ok(vec![passage("context", 0.8)]), Ok("answer".to_string()));
        let session = SessionId::new();

        for question in ["first", "second", "third"] {
            h.orchestrator.send_message(&session, question).await.unwrap();
            h.clock.advance(chrono::Duration::seconds(30));
        }

        let users: Vec<String> = h
            .orchestrator
            .history(&session)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.user)
            .collect();
        assert_eq!(users, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_clear_and_all_sessions() {
        let h = harness(vector(), Ok(vec![passage("context", 0.8)]), Ok("answer".to_string()));
        let a = SessionId::new();
        let b = SessionId::new();

        h.orchestrator.send_message(&a, "from a").await.unwrap();
        h.orchestrator.send_message(&b, "from b").await.unwrap();
        assert_eq!(h.orchestrator.all_sessions().await.unwrap().len(), 2);

        h.orchestrator.clear_history(&a).await.unwrap();
        h.orchestrator.clear_history(&a).await.unwrap();
        assert!(h.orchestrator.history(&a).await.unwrap().is_empty());

        let all = h.orchestrator.all_sessions().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].session_id, b);
        assert_eq!(all[0].history[0].user, "from b");
    }

    #[tokio::test]
    async fn test_history_expires_with_session_ttl() {
        let h = harness(vector(), Ok(Vec::new()), Ok("unused".to_string()));
        let session = SessionId::new();

        h.orchestrator.send_message(&session, "hello").await.unwrap();
        h.clock.advance(chrono::Duration::seconds(3601));

        assert!(h.orchestrator.history(&session).await.unwrap().is_empty());
        assert!(h.orchestrator.all_sessions().await.unwrap().is_empty());
    }

    #[test]
    fn test_welcome_message() {
        let h = harness(vector(), Ok(Vec::new()), Ok("unused".to_string()));
        assert_eq!(h.orchestrator.welcome_message(), "Hello from the newsroom");
    }

    #[test]
    fn test_select_passages_preserves_order() {
        let settings = RetrievalSettings {
            limit: 2,
            score_threshold: 0.5,
        };
        let selected = select_passages(
            vec![
                passage("low", 0.1),
                passage("b", 0.6),
                passage("a", 0.9),
                passage("c", 0.7),
            ],
            &settings,
        );
        let texts: Vec<&str> = selected.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a"]);
    }
}
