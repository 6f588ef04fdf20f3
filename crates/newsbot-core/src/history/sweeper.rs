//! Background reclamation of expired sessions.
//!
//! Reads already hide expired turns; the sweeper only frees the storage
//! they occupy.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::box_store::BoxConversationStore;

/// Spawn a task that calls `purge_expired` every `every` until `cancel` fires.
///
/// Purge failures are logged and retried on the next tick.
pub fn spawn_expiry_sweeper(
    store: Arc<BoxConversationStore>,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("expiry sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match store.purge_expired().await {
                        Ok(0) => {}
                        Ok(purged) => info!(purged, "purged expired sessions"),
                        Err(e) => warn!(error = %e, "failed to purge expired sessions"),
                    }
                }
            }
        }
    })
}
