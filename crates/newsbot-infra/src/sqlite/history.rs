//! SQLite conversation store.
//!
//! Implements `ConversationStore` from `newsbot-core` on top of the
//! `conversation_sessions` / `conversation_turns` tables. Expiry is stored
//! as epoch milliseconds; reads join against sessions that have not yet
//! expired, so stale turns stay invisible until `purge_expired` deletes them.

use std::sync::Arc;
use std::time::Duration;

use sqlx::Row;

use newsbot_core::clock::{Clock, SystemClock};
use newsbot_core::history::store::ConversationStore;
use newsbot_core::history::{ttl_as_chrono, DEFAULT_SESSION_TTL};
use newsbot_types::chat::{SessionId, Turn};
use newsbot_types::error::StoreError;

use super::pool::DatabasePool;
use super::store_error;

/// SQLite-backed implementation of `ConversationStore`.
pub struct SqliteConversationStore {
    pool: DatabasePool,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl SqliteConversationStore {
    /// Create a store with the default one-hour TTL and the system clock.
    pub fn new(pool: DatabasePool) -> Self {
        Self::with_clock(pool, DEFAULT_SESSION_TTL, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: DatabasePool, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            ttl_ms: ttl_as_chrono(ttl).num_milliseconds(),
            clock,
        }
    }

    fn now_ms(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }
}

fn encode_turn(turn: &Turn) -> Result<String, StoreError> {
    serde_json::to_string(turn).map_err(|e| StoreError::Query(format!("failed to serialize turn: {e}")))
}

fn decode_turn(payload: &str) -> Result<Turn, StoreError> {
    serde_json::from_str(payload).map_err(|e| StoreError::Corrupt(format!("invalid turn payload: {e}")))
}

impl ConversationStore for SqliteConversationStore {
    async fn append(&self, session_id: &SessionId, turn: &Turn) -> Result<(), StoreError> {
        let now = self.now_ms();
        let id = session_id.to_string();
        let payload = encode_turn(turn)?;

        let mut tx = self.pool.writer.begin().await.map_err(store_error)?;

        // An expired session that has not been swept yet starts over.
        sqlx::query(
            r#"DELETE FROM conversation_turns
               WHERE session_id = ?
                 AND EXISTS (SELECT 1 FROM conversation_sessions
                             WHERE session_id = ? AND expires_at_ms <= ?)"#,
        )
        .bind(&id)
        .bind(&id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        sqlx::query(
            r#"INSERT INTO conversation_sessions (session_id, expires_at_ms)
               VALUES (?, ?)
               ON CONFLICT (session_id) DO UPDATE SET expires_at_ms = excluded.expires_at_ms"#,
        )
        .bind(&id)
        .bind(now.saturating_add(self.ttl_ms))
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        sqlx::query("INSERT INTO conversation_turns (session_id, payload) VALUES (?, ?)")
            .bind(&id)
            .bind(&payload)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        Ok(())
    }

    async fn list(&self, session_id: &SessionId) -> Result<Vec<Turn>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT t.payload
               FROM conversation_turns t
               JOIN conversation_sessions s ON s.session_id = t.session_id
               WHERE t.session_id = ? AND s.expires_at_ms > ?
               ORDER BY t.seq ASC"#,
        )
        .bind(session_id.to_string())
        .bind(self.now_ms())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(store_error)?;

        rows.iter()
            .map(|row| {
                let payload: String = row.try_get("payload").map_err(store_error)?;
                decode_turn(&payload)
            })
            .collect()
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), StoreError> {
        // Turns go with the session via ON DELETE CASCADE.
        sqlx::query("DELETE FROM conversation_sessions WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn list_session_ids(&self) -> Result<Vec<SessionId>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT s.session_id
               FROM conversation_sessions s
               WHERE s.expires_at_ms > ?
                 AND EXISTS (SELECT 1 FROM conversation_turns t WHERE t.session_id = s.session_id)"#,
        )
        .bind(self.now_ms())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(store_error)?;

        let mut ids = rows
            .iter()
            .map(|row| {
                let raw: String = row.try_get("session_id").map_err(store_error)?;
                raw.parse::<SessionId>()
                    .map_err(|e| StoreError::Corrupt(format!("invalid session id {raw:?}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ids.sort();
        Ok(ids)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM conversation_sessions WHERE expires_at_ms <= ?")
            .bind(self.now_ms())
            .execute(&self.pool.writer)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use newsbot_core::clock::ManualClock;

    async fn test_pool() -> (DatabasePool, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("history.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (pool, dir)
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 5, 18, 0, 0).unwrap()
    }

    async fn store_with_clock() -> (SqliteConversationStore, Arc<ManualClock>, tempfile::TempDir) {
        let (pool, dir) = test_pool().await;
        let clock = Arc::new(ManualClock::new(start()));
        let store = SqliteConversationStore::with_clock(pool, DEFAULT_SESSION_TTL, clock.clone());
        (store, clock, dir)
    }

    fn turn(n: usize, clock: &ManualClock) -> Turn {
        Turn::new(format!("question {n}"), format!("answer {n}"), clock.now())
    }

    #[tokio::test]
    async fn test_append_list_roundtrip_oldest_first() {
        let (store, clock, _dir) = store_with_clock().await;
        let session = SessionId::new();

        let mut expected = Vec::new();
        for n in 0..4 {
            let t = turn(n, &clock);
            store.append(&session, &t).await.unwrap();
            expected.push(t);
            clock.advance(chrono::Duration::seconds(5));
        }

        assert_eq!(store.list(&session).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_payload_is_turn_json() {
        let (store, clock, _dir) = store_with_clock().await;
        let session = SessionId::new();
        store.append(&session, &turn(7, &clock)).await.unwrap();

        let (payload,): (String,) =
            sqlx::query_as("SELECT payload FROM conversation_turns WHERE session_id = ?")
                .bind(session.to_string())
                .fetch_one(&store.pool.reader)
                .await
                .unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["user"], "question 7");
        assert_eq!(value["bot"], "answer 7");
        assert_eq!(value["timestamp"], "2024-11-05T18:00:00Z");
    }

    #[tokio::test]
    async fn test_expiry_and_ttl_reset() {
        let (store, clock, _dir) = store_with_clock().await;
        let session = SessionId::new();
        store.append(&session, &turn(0, &clock)).await.unwrap();

        clock.advance(chrono::Duration::seconds(3000));
        store.append(&session, &turn(1, &clock)).await.unwrap();

        clock.advance(chrono::Duration::seconds(3599));
        assert_eq!(store.list(&session).await.unwrap().len(), 2);

        clock.advance(chrono::Duration::seconds(2));
        assert!(store.list(&session).await.unwrap().is_empty());
        assert!(store.list_session_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reads_do_not_renew_ttl() {
        let (store, clock, _dir) = store_with_clock().await;
        let session = SessionId::new();
        store.append(&session, &turn(0, &clock)).await.unwrap();

        clock.advance(chrono::Duration::seconds(3500));
        assert_eq!(store.list(&session).await.unwrap().len(), 1);
        clock.advance(chrono::Duration::seconds(101));

        assert!(store.list(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_after_expiry_starts_fresh() {
        let (store, clock, _dir) = store_with_clock().await;
        let session = SessionId::new();
        store.append(&session, &turn(0, &clock)).await.unwrap();

        clock.advance(chrono::Duration::hours(2));
        let fresh = turn(1, &clock);
        store.append(&session, &fresh).await.unwrap();

        assert_eq!(store.list(&session).await.unwrap(), vec![fresh]);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent_and_isolated() {
        let (store, clock, _dir) = store_with_clock().await;
        let a = SessionId::new();
        let b = SessionId::new();

        store.clear(&a).await.unwrap();
        store.append(&a, &turn(0, &clock)).await.unwrap();
        store.append(&b, &turn(1, &clock)).await.unwrap();
        store.clear(&a).await.unwrap();
        store.clear(&a).await.unwrap();

        assert!(store.list(&a).await.unwrap().is_empty());
        assert_eq!(store.list(&b).await.unwrap().len(), 1);
        assert_eq!(store.list_session_ids().await.unwrap(), vec![b]);

        let (orphans,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM conversation_turns WHERE session_id = ?")
                .bind(a.to_string())
                .fetch_one(&store.pool.reader)
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_list_session_ids_sorted() {
        let (store, clock, _dir) = store_with_clock().await;
        let mut ids: Vec<SessionId> = (0..5).map(|_| SessionId::new()).collect();
        for (n, id) in ids.iter().enumerate() {
            store.append(id, &turn(n, &clock)).await.unwrap();
        }

        ids.sort();
        assert_eq!(store.list_session_ids().await.unwrap(), ids);
    }

    #[tokio::test]
    async fn test_all_sessions_skips_expired() {
        let (store, clock, _dir) = store_with_clock().await;
        let stale = SessionId::new();
        let live = SessionId::new();

        store.append(&stale, &turn(0, &clock)).await.unwrap();
        clock.advance(chrono::Duration::seconds(2000));
        store.append(&live, &turn(1, &clock)).await.unwrap();
        clock.advance(chrono::Duration::seconds(2000));

        let all = store.all_sessions().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].session_id, live);
        assert_eq!(all[0].history.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_expired_removes_sessions_and_turns() {
        let (store, clock, _dir) = store_with_clock().await;
        let stale = SessionId::new();
        let live = SessionId::new();

        store.append(&stale, &turn(0, &clock)).await.unwrap();
        store.append(&stale, &turn(1, &clock)).await.unwrap();
        clock.advance(chrono::Duration::seconds(3000));
        store.append(&live, &turn(2, &clock)).await.unwrap();
        clock.advance(chrono::Duration::seconds(700));

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert_eq!(store.purge_expired().await.unwrap(), 0);

        let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversation_turns")
            .fetch_one(&store.pool.reader)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
        assert_eq!(store.list(&live).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("durable.db").display());
        let clock = Arc::new(ManualClock::new(start()));
        let session = SessionId::new();

        let pool = DatabasePool::new(&url).await.unwrap();
        let store = SqliteConversationStore::with_clock(pool.clone(), DEFAULT_SESSION_TTL, clock.clone());
        store.append(&session, &turn(0, &clock)).await.unwrap();
        pool.close().await;

        let pool = DatabasePool::new(&url).await.unwrap();
        let store = SqliteConversationStore::with_clock(pool, DEFAULT_SESSION_TTL, clock.clone());
        assert_eq!(store.list(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_all_land() {
        let (store, clock, _dir) = store_with_clock().await;
        let store = Arc::new(store);
        let busy = SessionId::new();
        let other = SessionId::new();

        let mut handles = Vec::new();
        for n in 0..16 {
            let store = Arc::clone(&store);
            let session = if n % 4 == 0 { other.clone() } else { busy.clone() };
            let t = turn(n, &clock);
            handles.push(tokio::spawn(async move {
                store.append(&session, &t).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let busy_turns = store.list(&busy).await.unwrap();
        assert_eq!(busy_turns.len(), 12);
        assert_eq!(store.list(&other).await.unwrap().len(), 4);

        let mut questions: Vec<&str> = busy_turns.iter().map(|t| t.user.as_str()).collect();
        questions.sort();
        questions.dedup();
        assert_eq!(questions.len(), 12);
        assert_eq!(store.list_session_ids().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_reported() {
        let (store, clock, _dir) = store_with_clock().await;
        let session = SessionId::new();
        store.append(&session, &turn(0, &clock)).await.unwrap();

        sqlx::query("UPDATE conversation_turns SET payload = 'not json'")
            .execute(&store.pool.writer)
            .await
            .unwrap();

        let err = store.list(&session).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_closed_pool_is_connection_error() {
        let (store, clock, _dir) = store_with_clock().await;
        store.pool.close().await;

        let err = store.append(&SessionId::new(), &turn(0, &clock)).await.unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
