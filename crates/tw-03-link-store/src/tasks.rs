//! # Cleanup Sweep
//!
//! Periodic purge of expired links, run as its own tokio task so request
//! handling never waits on it.

use crate::ports::LinkStoreApi;
use shared_types::TimeSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Default sweep period.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Spawn the sweep. It runs every `interval` until `shutdown` flips to
/// `true` or its sender is dropped.
pub fn spawn_cleanup_task(
    store: Arc<dyn LinkStoreApi>,
    time_source: Arc<dyn TimeSource>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        info!(interval_secs = interval.as_secs(), "Link cleanup task started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = store.cleanup_expired(time_source.now()).await {
                        warn!(error = %e, "Link cleanup sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Link cleanup task stopping");
                        break;
                    }
                }
            }
        }
    })
}
