//! Bet event monitor
//!
//! Polls the state of watched bets and fires callbacks once they resolve.
//! The upstream API has no push mechanism, so every event kind gets its own
//! task that re-fetches the watched ids on a fixed interval.

use super::callbacks::{Callback, CallbackRegistry};
use super::kind::EventKind;
use super::source::BetSource;
use super::subscriptions::SubscriptionSet;
use crate::client::{ApiError, Bet, BetId};
use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use futures::future::join_all;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("Monitor pollers are already running")]
    AlreadyRunning,
}

/// Result of a single poll of one event kind
#[derive(Debug)]
pub enum TickOutcome {
    /// Nothing watched, no request sent
    Idle,
    /// The fetch failed, watch set left untouched
    FetchFailed(ApiError),
    /// Fetch succeeded
    Polled {
        /// Records returned by the source
        fetched: usize,
        /// Ids observed in the terminal state and removed from the watch set
        resolved: Vec<BetId>,
        /// Callbacks run to completion during this tick
        dispatched: usize,
    },
}

/// Watches bets for state changes and dispatches callbacks
///
/// Cloning is cheap and every clone shares the same subscriptions and
/// callbacks, so a callback may capture a clone and subscribe more ids.
pub struct BetsMonitor<S: BetSource> {
    inner: Arc<MonitorInner<S>>,
}

struct MonitorInner<S> {
    source: S,
    subscriptions: SubscriptionSet,
    callbacks: CallbackRegistry,
    interval: Duration,
    running: AtomicBool,
}

impl<S: BetSource> Clone for BetsMonitor<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: BetSource> BetsMonitor<S> {
    /// Monitor polling every 10 seconds
    pub fn new(source: S) -> Self {
        Self::with_interval(source, Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS))
    }

    pub fn with_interval(source: S, interval: Duration) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                source,
                subscriptions: SubscriptionSet::new(),
                callbacks: CallbackRegistry::new(),
                interval,
                running: AtomicBool::new(false),
            }),
        }
    }

    pub fn source(&self) -> &S {
        &self.inner.source
    }

    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Start watching `ids` for `kind`
    ///
    /// Already watched ids are ignored. Returns how many ids were added.
    pub fn subscribe(&self, kind: EventKind, ids: impl IntoIterator<Item = BetId>) -> usize {
        let added = self.inner.subscriptions.subscribe(kind, ids);
        if added > 0 {
            debug!(
                "[{}] Subscribed {} bets ({} watched)",
                kind,
                added,
                self.inner.subscriptions.len(kind)
            );
        }
        added
    }

    /// Stop watching `ids` for `kind`
    pub fn unsubscribe(&self, kind: EventKind, ids: impl IntoIterator<Item = BetId>) -> usize {
        self.inner.subscriptions.remove(kind, ids).len()
    }

    /// Ids currently watched for `kind`
    pub fn watched(&self, kind: EventKind) -> HashSet<BetId> {
        self.inner.subscriptions.watched(kind)
    }

    /// Set the callback for `kind`, replacing any previous one
    ///
    /// The callback receives the bet that changed.
    pub fn set_callback<F, Fut>(&self, kind: EventKind, callback: F)
    where
        F: Fn(Bet) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.inner.callbacks.set(kind, callback);
    }

    pub fn clear_callback(&self, kind: EventKind) -> bool {
        self.inner.callbacks.clear(kind)
    }

    /// Run one poll of `kind` without sleeping
    ///
    /// Only records of ids this tick took out of the watch set are
    /// dispatched, one callback per id, so an id unsubscribed while the fetch
    /// was in flight gets none. Ids missing from the response stay watched.
    /// Returns after every callback of this tick has finished.
    pub async fn poll_once(&self, kind: EventKind) -> TickOutcome {
        let ids = self.inner.subscriptions.snapshot(kind);
        if ids.is_empty() {
            return TickOutcome::Idle;
        }

        let bets = match self.inner.source.fetch_by_ids(&ids).await {
            Ok(bets) => bets,
            Err(e) => {
                warn!("[{}] Failed to fetch {} watched bets: {}", kind, ids.len(), e);
                return TickOutcome::FetchFailed(e);
            }
        };

        let fetched = bets.len();
        let candidates: Vec<BetId> = bets
            .iter()
            .filter(|b| kind.is_resolved(b))
            .map(|b| b.id)
            .collect();
        let mut removed: HashSet<BetId> = self
            .inner
            .subscriptions
            .remove(kind, candidates)
            .into_iter()
            .collect();

        let resolved: Vec<Bet> = bets
            .into_iter()
            .filter(|b| kind.is_resolved(b) && removed.remove(&b.id))
            .collect();
        let resolved_ids: Vec<BetId> = resolved.iter().map(|b| b.id).collect();

        if !resolved_ids.is_empty() {
            info!("[{}] Resolved bets: {:?}", kind, resolved_ids);
        }

        let dispatched = match self.inner.callbacks.get(kind) {
            Some(callback) => dispatch(kind, &callback, resolved).await,
            None => 0,
        };

        TickOutcome::Polled {
            fetched,
            resolved: resolved_ids,
            dispatched,
        }
    }

    /// Whether pollers started from this monitor or a clone are still alive
    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Spawn one poller task per event kind
    pub fn start(&self) -> Result<MonitorHandle, MonitorError> {
        self.start_with_token(CancellationToken::new())
    }

    /// Spawn the pollers, stopping when `token` is cancelled
    ///
    /// Fails with [`MonitorError::AlreadyRunning`] until every poller of a
    /// previous start has exited.
    pub fn start_with_token(&self, token: CancellationToken) -> Result<MonitorHandle, MonitorError> {
        if self
            .inner
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(MonitorError::AlreadyRunning);
        }

        let guard = Arc::new(RunningGuard {
            monitor: self.clone(),
        });

        let tasks = EventKind::ALL
            .iter()
            .map(|&kind| {
                let monitor = self.clone();
                let token = token.clone();
                let guard = Arc::clone(&guard);
                let task = tokio::spawn(async move {
                    let _running = guard;
                    monitor.run(kind, token).await
                });
                (kind, task)
            })
            .collect();

        Ok(MonitorHandle { token, tasks })
    }

    async fn run(self, kind: EventKind, token: CancellationToken) {
        info!("[{}] Poller started (interval {:?})", kind, self.inner.interval);
        let mut polling = false;

        loop {
            // Cancelling mid-tick drops the join on running callbacks,
            // the callbacks themselves finish on their own.
            let outcome = tokio::select! {
                outcome = self.poll_once(kind) => outcome,
                _ = token.cancelled() => break,
            };

            if let TickOutcome::Polled {
                fetched,
                ref resolved,
                dispatched,
            } = outcome
            {
                debug!(
                    "[{}] Tick: fetched={}, resolved={}, dispatched={}",
                    kind,
                    fetched,
                    resolved.len(),
                    dispatched
                );
            }

            let now_polling = !self.inner.subscriptions.is_empty(kind);
            if now_polling != polling {
                if now_polling {
                    info!("[{}] Polling {} watched bets", kind, self.inner.subscriptions.len(kind));
                } else {
                    info!("[{}] No watched bets left, idle", kind);
                }
                polling = now_polling;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.inner.interval) => {}
                _ = token.cancelled() => break,
            }
        }

        info!("[{}] Poller stopped", kind);
    }
}

/// Clears the running flag once the last poller holding it is dropped
struct RunningGuard<S: BetSource> {
    monitor: BetsMonitor<S>,
}

impl<S: BetSource> Drop for RunningGuard<S> {
    fn drop(&mut self) {
        self.monitor.inner.running.store(false, Ordering::SeqCst);
    }
}

/// Run `callback` for every bet concurrently and wait for all of them
async fn dispatch(kind: EventKind, callback: &Callback, bets: Vec<Bet>) -> usize {
    let handles: Vec<JoinHandle<()>> = bets
        .into_iter()
        .map(|bet| tokio::spawn(callback(bet)))
        .collect();

    let count = handles.len();
    for result in join_all(handles).await {
        if let Err(e) = result {
            error!("[{}] Callback failed: {}", kind, e);
        }
    }
    count
}

/// Running pollers of a monitor
#[derive(Debug)]
pub struct MonitorHandle {
    token: CancellationToken,
    tasks: Vec<(EventKind, JoinHandle<()>)>,
}

impl MonitorHandle {
    /// Token that stops every poller of this handle
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.tasks.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(|(_, task)| task.is_finished())
    }

    /// Cancel the pollers and wait for them to exit
    pub async fn stop(self) {
        self.token.cancel();
        self.join().await;
    }

    /// Wait for the pollers to exit
    pub async fn join(self) {
        for (kind, task) in self.tasks {
            match task.await {
                Ok(()) => {}
                Err(e) if e.is_cancelled() => info!("[{}] Poller was cancelled", kind),
                Err(e) => error!("[{}] Poller panicked: {:?}", kind, e),
            }
        }
    }

    /// Hand the spawned tasks over to the caller
    pub fn into_tasks(self) -> Vec<JoinHandle<()>> {
        self.tasks.into_iter().map(|(_, task)| task).collect()
    }
}
