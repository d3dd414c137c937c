// Optional periodic sweep of expired presence entries.
//
// Lazy eviction on read already guarantees that expired entries are never
// returned. The sweeper only reclaims memory held by rooms nobody queries.

use std::sync::Arc;
use std::time::Duration;

use roomwatch_common::clock::Clock;
use tokio::sync::watch;
use tracing::debug;

use super::PresenceRegistry;

/// Handle for the sweeper task. Dropping it stops the sweep.
pub struct SweeperHandle {
    task: Option<tokio::task::JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl SweeperHandle {
    /// Stop sweeping and wait for the task to exit.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawn a task that evicts entries older than `ttl` every `interval`.
pub fn start_sweeper<C: Clock>(
    registry: Arc<PresenceRegistry<C>>,
    ttl: Duration,
    interval: Duration,
) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown_rx.changed() => {
                    debug!("presence sweeper shutting down");
                    break;
                }
            }

            let evicted = registry.evict_expired(ttl);
            if evicted > 0 {
                debug!(evicted, rooms = registry.room_count(), "presence sweep evicted entries");
            }
        }
    });

    SweeperHandle { task: Some(task), shutdown_tx }
}
