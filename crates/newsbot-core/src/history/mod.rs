//! Conversation history persistence.
//!
//! Defines the `ConversationStore` port, its boxed wrapper, an in-memory
//! implementation and the background sweeper that reclaims expired sessions.

pub mod box_store;
pub mod memory;
pub mod store;
pub mod sweeper;

use std::time::Duration;

/// Default rolling time-to-live of a session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

/// Convert a store TTL into a `chrono::Duration`, capping absurd values
/// so `now + ttl` can never overflow.
pub fn ttl_as_chrono(ttl: Duration) -> chrono::Duration {
    const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);
    chrono::Duration::from_std(ttl.min(MAX_TTL)).unwrap_or_else(|_| chrono::Duration::days(36_500))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_as_chrono() {
        assert_eq!(ttl_as_chrono(DEFAULT_SESSION_TTL), chrono::Duration::seconds(3600));
        assert_eq!(ttl_as_chrono(Duration::MAX), chrono::Duration::days(36_500));
    }
}
