//! In-process conversation store.
//!
//! Keeps each session as a newest-first deque of turns plus an expiry
//! instant in a `DashMap`, so appends to different sessions never contend
//! and each append is atomic under the per-key shard lock.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use newsbot_types::chat::{SessionId, Turn};
use newsbot_types::error::StoreError;

use super::store::ConversationStore;
use super::{ttl_as_chrono, DEFAULT_SESSION_TTL};
use crate::clock::{Clock, SystemClock};

struct SessionEntry {
    /// Newest turn at the front.
    turns: VecDeque<Turn>,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now && !self.turns.is_empty()
    }
}

/// `ConversationStore` backed by process memory.
///
/// History does not survive a restart. Expired sessions stay in memory
/// (invisible to reads) until [`ConversationStore::purge_expired`] runs.
pub struct InMemoryConversationStore {
    sessions: DashMap<SessionId, SessionEntry>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryConversationStore {
    /// Create a store with the default one-hour TTL and the system clock.
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_SESSION_TTL, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: ttl_as_chrono(ttl),
            clock,
        }
    }

    /// Number of sessions physically held, including expired ones.
    pub fn stored_sessions(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore for InMemoryConversationStore {
    async fn append(&self, session_id: &SessionId, turn: &Turn) -> Result<(), StoreError> {
        let now = self.clock.now();
        let mut entry = self
            .sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionEntry {
                turns: VecDeque::new(),
                expires_at: now,
            });

        // An expired session that has not been swept yet starts over.
        if entry.expires_at <= now {
            entry.turns.clear();
        }
        entry.turns.push_front(turn.clone());
        entry.expires_at = now + self.ttl;
        Ok(())
    }

    async fn list(&self, session_id: &SessionId) -> Result<Vec<Turn>, StoreError> {
        let now = self.clock.now();
        let turns = match self.sessions.get(session_id) {
            Some(entry) if entry.expires_at > now => entry.turns.iter().rev().cloned().collect(),
            _ => Vec::new(),
        };
        Ok(turns)
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), StoreError> {
        self.sessions.remove(session_id);
        Ok(())
    }

    async fn list_session_ids(&self) -> Result<Vec<SessionId>, StoreError> {
        let now = self.clock.now();
        let mut ids: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_live(now))
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let now = self.clock.now();
        let mut purged = 0u64;
        self.sessions.retain(|_, entry| {
            let keep = entry.is_live(now);
            if !keep {
                purged += 1;
            }
            keep
        });
        Ok(purged)
    }
}
