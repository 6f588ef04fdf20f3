//! SQLite storage layer.
//!
//! The conversation store backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod history;
pub mod pool;

use newsbot_types::error::StoreError;

/// Classify a sqlx error: pool/IO failures mean the store is unreachable,
/// anything else is a failed statement.
pub(crate) fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection(err.to_string())
        }
        other => StoreError::Query(other.to_string()),
    }
}
