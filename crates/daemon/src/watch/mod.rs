// Status-change watcher.
//
// Polls the actor's entities on a fixed interval and emits one alert per
// (entity, status) the first time an entity is seen in a watched status
// with an assignee. Keys are remembered in a `NotifiedSet` for the lifetime
// of the loop, so a restart may re-announce current statuses. The set is
// trimmed back to `max_notified_keys` after each cycle, but keys for entities
// in the latest fetch are never forgotten.

pub mod actor;
pub mod alerts;
pub mod notified;

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use roomwatch_common::entity::WatchedEntity;

use crate::sink::AlertSink;
use crate::source::WatchSource;

pub use actor::{Actor, ActorProvider, EligibilityPolicy};
pub use notified::NotifiedSet;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5_000);
pub const DEFAULT_MAX_NOTIFIED_KEYS: usize = 10_000;

// ── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Delay between the end of one cycle and the start of the next.
    pub poll_interval: Duration,
    /// Soft capacity of the notified set; keys still reported by the source
    /// are kept beyond it. Zero keeps every key.
    pub max_notified_keys: usize,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL, max_notified_keys: DEFAULT_MAX_NOTIFIED_KEYS }
    }
}

// ── Cycle outcome ───────────────────────────────────────────────────

/// What a single poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Actor absent or no longer eligible; nothing fetched.
    Skipped,
    /// Fetch failed; retried on the next tick.
    FetchFailed,
    Completed { fetched: usize, emitted: usize },
}

// ── Handle ──────────────────────────────────────────────────────────

/// Cancellation handle for a watch loop. Dropping the handle cancels it.
pub struct WatchHandle {
    task: Option<JoinHandle<()>>,
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl WatchHandle {
    fn inert() -> Self {
        Self { task: None, shutdown_tx: None }
    }

    /// `true` while a loop was started and has not been cancelled.
    pub fn is_active(&self) -> bool {
        let cancelled = self.shutdown_tx.as_ref().is_none_or(|tx| *tx.borrow());
        let finished = self.task.as_ref().is_none_or(JoinHandle::is_finished);
        !cancelled && !finished
    }

    /// Stop scheduling cycles. A cycle already running finishes; no later
    /// cycle starts. Safe to call repeatedly and on an inert handle.
    pub fn cancel(&self) {
        if let Some(tx) = &self.shutdown_tx {
            tx.send_replace(true);
        }
    }

    /// Wait for the loop task to exit. Only returns once the loop is
    /// cancelled (or the handle was inert).
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(join_error) = task.await {
                error!(?join_error, "watch loop task failed");
            }
        }
    }

    /// Cancel, then wait for the loop to exit.
    pub async fn shutdown(self) {
        self.cancel();
        self.join().await;
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ── Loop ────────────────────────────────────────────────────────────

struct WatchInner<A, S, K> {
    config: WatchConfig,
    actors: A,
    policy: EligibilityPolicy,
    source: S,
    sink: K,
    notified: Mutex<NotifiedSet>,
}

/// Start watching for the current actor.
///
/// Eligibility is evaluated once here: if there is no actor, or the actor's
/// role is not eligible, nothing is spawned and the returned handle is inert.
/// Otherwise the first cycle runs immediately and later cycles follow every
/// `poll_interval` until the handle is cancelled or dropped.
pub fn start_watching<A, S, K>(
    config: WatchConfig,
    actors: A,
    policy: EligibilityPolicy,
    source: S,
    sink: K,
) -> WatchHandle
where
    A: ActorProvider,
    S: WatchSource,
    K: AlertSink,
{
    let actor = match actors.current() {
        Some(actor) if policy.is_eligible(&actor) => actor,
        Some(actor) => {
            debug!(actor = %actor.id, role = %actor.role, "actor not eligible; watch not started");
            return WatchHandle::inert();
        }
        None => {
            debug!("no actor; watch not started");
            return WatchHandle::inert();
        }
    };

    info!(
        actor = %actor.id,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "starting status watch"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let inner = Arc::new(WatchInner {
        notified: Mutex::new(NotifiedSet::new(config.max_notified_keys)),
        config,
        actors,
        policy,
        source,
        sink,
    });
    let task = tokio::spawn(watch_loop(inner, shutdown_rx));

    WatchHandle { task: Some(task), shutdown_tx: Some(shutdown_tx) }
}

async fn watch_loop<A, S, K>(inner: Arc<WatchInner<A, S, K>>, mut shutdown_rx: watch::Receiver<bool>)
where
    A: ActorProvider,
    S: WatchSource,
    K: AlertSink,
{
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        // Run each cycle in its own task so a panicking source or sink
        // costs one tick, not the loop. Recorded keys survive in `inner`.
        let cycle = tokio::spawn(run_cycle(Arc::clone(&inner)));
        match cycle.await {
            Ok(outcome) => debug!(?outcome, "watch cycle finished"),
            Err(join_error) => error!(?join_error, "watch cycle panicked"),
        }

        tokio::select! {
            biased;
            _ = shutdown_rx.changed() => break,
            _ = tokio::time::sleep(inner.config.poll_interval) => {}
        }
    }
    debug!("status watch stopped");
}

async fn run_cycle<A, S, K>(inner: Arc<WatchInner<A, S, K>>) -> CycleOutcome
where
    A: ActorProvider,
    S: WatchSource,
    K: AlertSink,
{
    let Some(actor) = inner.actors.current() else {
        debug!("no actor; skipping tick");
        return CycleOutcome::Skipped;
    };
    if !inner.policy.is_eligible(&actor) {
        debug!(actor = %actor.id, role = %actor.role, "actor not eligible; skipping tick");
        return CycleOutcome::Skipped;
    }

    let entities = match inner.source.fetch(&actor).await {
        Ok(entities) => entities,
        Err(error) => {
            warn!(actor = %actor.id, %error, "failed to fetch watched entities");
            return CycleOutcome::FetchFailed;
        }
    };

    let mut notified = inner.notified.lock().unwrap_or_else(PoisonError::into_inner);
    let mut emitted = 0;
    for entity in &entities {
        let key = entity.notified_key();
        if notified.contains(&key) {
            continue;
        }
        if let Some(alert) = alerts::alert_for(entity) {
            match inner.sink.emit(alert) {
                Ok(()) => {
                    emitted += 1;
                    info!(actor = %actor.id, entity = %entity.id, status = %entity.status, "status alert emitted");
                }
                Err(error) => {
                    warn!(actor = %actor.id, entity = %entity.id, %error, "failed to emit status alert");
                }
            }
        }
        notified.insert(key);
    }

    let visible: HashSet<_> = entities.iter().map(WatchedEntity::notified_key).collect();
    let forgotten = notified.trim(|key| visible.contains(key));
    if forgotten > 0 {
        debug!(forgotten, remembered = notified.len(), "trimmed notified keys");
    }

    CycleOutcome::Completed { fetched: entities.len(), emitted }
}

// ── Tests ───────────────────────────────────────────────────────────
