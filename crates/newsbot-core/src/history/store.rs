//! ConversationStore trait definition.

use futures_util::future::try_join_all;
use newsbot_types::chat::{SessionHistory, SessionId, Turn};
use newsbot_types::error::StoreError;

/// Per-session turn history with a rolling expiry.
///
/// Implementations must:
/// - make each `append` atomic and reset the session's TTL from "now";
/// - never surface expired turns, even before they are physically removed;
/// - return an empty history (not an error) for unknown or expired sessions,
///   but fail loudly when the backing store cannot be reached.
///
/// Implementations live in newsbot-core (in-memory) and newsbot-infra (SQLite).
pub trait ConversationStore: Send + Sync {
    /// Insert `turn` as the newest entry of the session and reset its TTL.
    fn append(
        &self,
        session_id: &SessionId,
        turn: &Turn,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// All non-expired turns of the session, oldest first.
    fn list(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, StoreError>> + Send;

    /// Remove every turn of the session. Clearing an unknown session succeeds.
    fn clear(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Sessions currently holding at least one non-expired turn, sorted.
    fn list_session_ids(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionId>, StoreError>> + Send;

    /// Physically remove expired sessions. Returns how many were removed.
    fn purge_expired(&self) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Every active session with its full history.
    ///
    /// Reads each discovered session separately. A session that is cleared
    /// or expires between enumeration and read is omitted.
    fn all_sessions(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<SessionHistory>, StoreError>> + Send {
        async move {
            let ids = self.list_session_ids().await?;
            let histories = try_join_all(ids.iter().map(|id| self.list(id))).await?;

            Ok(ids
                .into_iter()
                .zip(histories)
                .filter(|(_, history)| !history.is_empty())
                .map(|(session_id, history)| SessionHistory {
                    session_id,
                    history,
                })
                .collect())
        }
    }
}
