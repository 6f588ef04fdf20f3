//! BoxConversationStore -- object-safe dynamic dispatch wrapper for ConversationStore.
//!
//! Follows the same blanket-impl pattern as the provider wrappers:
//! 1. Define an object-safe `ConversationStoreDyn` trait with boxed futures
//! 2. Blanket-impl `ConversationStoreDyn` for all `T: ConversationStore`
//! 3. `BoxConversationStore` wraps `Box<dyn ConversationStoreDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use newsbot_types::chat::{SessionHistory, SessionId, Turn};
use newsbot_types::error::StoreError;

use super::store::ConversationStore;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Object-safe version of [`ConversationStore`] with boxed futures.
pub trait ConversationStoreDyn: Send + Sync {
    fn append_boxed<'a>(&'a self, session_id: &'a SessionId, turn: &'a Turn) -> BoxFuture<'a, ()>;

    fn list_boxed<'a>(&'a self, session_id: &'a SessionId) -> BoxFuture<'a, Vec<Turn>>;

    fn clear_boxed<'a>(&'a self, session_id: &'a SessionId) -> BoxFuture<'a, ()>;

    fn list_session_ids_boxed(&self) -> BoxFuture<'_, Vec<SessionId>>;

    fn purge_expired_boxed(&self) -> BoxFuture<'_, u64>;

    fn all_sessions_boxed(&self) -> BoxFuture<'_, Vec<SessionHistory>>;
}

impl<T: ConversationStore> ConversationStoreDyn for T {
    fn append_boxed<'a>(&'a self, session_id: &'a SessionId, turn: &'a Turn) -> BoxFuture<'a, ()> {
        Box::pin(self.append(session_id, turn))
    }

    fn list_boxed<'a>(&'a self, session_id: &'a SessionId) -> BoxFuture<'a, Vec<Turn>> {
        Box::pin(self.list(session_id))
    }

    fn clear_boxed<'a>(&'a self, session_id: &'a SessionId) -> BoxFuture<'a, ()> {
        Box::pin(self.clear(session_id))
    }

    fn list_session_ids_boxed(&self) -> BoxFuture<'_, Vec<SessionId>> {
        Box::pin(self.list_session_ids())
    }

    fn purge_expired_boxed(&self) -> BoxFuture<'_, u64> {
        Box::pin(self.purge_expired())
    }

    fn all_sessions_boxed(&self) -> BoxFuture<'_, Vec<SessionHistory>> {
        Box::pin(self.all_sessions())
    }
}

/// Type-erased conversation store, so the history backend can be chosen
/// from configuration at startup.
pub struct BoxConversationStore {
    inner: Box<dyn ConversationStoreDyn + Send + Sync>,
}

impl BoxConversationStore {
    /// Wrap a concrete `ConversationStore` in a type-erased box.
    pub fn new<T: ConversationStore + 'static>(store: T) -> Self {
        Self {
            inner: Box::new(store),
        }
    }

    pub async fn append(&self, session_id: &SessionId, turn: &Turn) -> Result<(), StoreError> {
        self.inner.append_boxed(session_id, turn).await
    }

    pub async fn list(&self, session_id: &SessionId) -> Result<Vec<Turn>, StoreError> {
        self.inner.list_boxed(session_id).await
    }

    pub async fn clear(&self, session_id: &SessionId) -> Result<(), StoreError> {
        self.inner.clear_boxed(session_id).await
    }

    pub async fn list_session_ids(&self) -> Result<Vec<SessionId>, StoreError> {
        self.inner.list_session_ids_boxed().await
    }

    pub async fn purge_expired(&self) -> Result<u64, StoreError> {
        self.inner.purge_expired_boxed().await
    }

    pub async fn all_sessions(&self) -> Result<Vec<SessionHistory>, StoreError> {
        self.inner.all_sessions_boxed().await
    }
}
