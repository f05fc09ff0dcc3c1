//! Single-flight background refresher.
//!
//! [`Refresher::spawn`] starts one task that re-fetches a snapshot on a
//! fixed interval and whenever [`RefreshHandle::request_refresh`] is
//! called. Only one fetch runs at a time; any number of requests made while
//! a fetch is in flight collapse into a single follow-up fetch.
//!
//! The task stops when the parent [`CancellationToken`] is cancelled, when
//! [`RefreshHandle::cancel`] is called, or when the last handle is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::CoreError;

/// Default interval between periodic refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Something that can produce a fresh snapshot on demand.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    type Snapshot: Send + Sync + 'static;

    async fn fetch(&self) -> Result<Self::Snapshot, CoreError>;
}

/// State shared between the refresh task and its handles.
struct Shared<T> {
    trigger: Notify,
    snapshot: watch::Sender<Option<Arc<T>>>,
    refreshes: AtomicU64,
    /// Cleared when the task exits, including by panic.
    running: AtomicBool,
    cancel: CancellationToken,
}

/// Clears the running flag when dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Handle to a running refresher. Cheap to clone.
pub struct RefreshHandle<T> {
    shared: Arc<Shared<T>>,
    _guard: Arc<DropGuard>,
}

impl<T> Clone for RefreshHandle<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _guard: Arc::clone(&self._guard),
        }
    }
}

impl<T> RefreshHandle<T> {
    /// Ask for a refresh as soon as possible. Never blocks.
    pub fn request_refresh(&self) {
        self.shared.trigger.notify_one();
    }

    /// The most recent successful snapshot, if any.
    pub fn latest(&self) -> Option<Arc<T>> {
        self.shared.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.shared.snapshot.subscribe()
    }

    /// Number of successful refreshes so far.
    pub fn refresh_count(&self) -> u64 {
        self.shared.refreshes.load(Ordering::Relaxed)
    }

    /// Stop the refresh task.
    pub fn cancel(&self) {
        self.shared.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Whether the refresh task is alive and has not been told to stop.
    ///
    /// Turns false once the task exits for any reason, a panicking source
    /// included.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire) && !self.is_cancelled()
    }
}

/// Spawns refresh tasks.
pub struct Refresher;

impl Refresher {
    /// Start refreshing `source` every `interval`, beginning immediately.
    ///
    /// Must be called from within a tokio runtime. The returned
    /// [`JoinHandle`] resolves once the task has stopped.
    pub fn spawn<S: SnapshotSource>(
        source: S,
        interval: Duration,
        parent: &CancellationToken,
    ) -> (RefreshHandle<S::Snapshot>, JoinHandle<()>) {
        let cancel = parent.child_token();
        let (snapshot, _) = watch::channel(None);

        let shared = Arc::new(Shared {
            trigger: Notify::new(),
            snapshot,
            refreshes: AtomicU64::new(0),
            running: AtomicBool::new(true),
            cancel: cancel.clone(),
        });

        let task = tokio::spawn(run(source, Arc::clone(&shared), interval));

        let handle = RefreshHandle {
            shared,
            _guard: Arc::new(cancel.drop_guard()),
        };
        (handle, task)
    }
}

async fn run<S: SnapshotSource>(source: S, shared: Arc<Shared<S::Snapshot>>, interval: Duration) {
    let _running = RunningGuard(&shared.running);
    let cancel = shared.cancel.clone();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::debug!(interval_secs = interval.as_secs(), "Refresher started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = shared.trigger.notified() => {
                tracing::trace!("On-demand refresh");
            }
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = source.fetch() => result,
        };

        match result {
            Ok(snapshot) => {
                shared.refreshes.fetch_add(1, Ordering::Relaxed);
                shared.snapshot.send_replace(Some(Arc::new(snapshot)));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Refresh failed, keeping previous snapshot");
            }
        }

        // An on-demand refresh postpones the next periodic one.
        ticker.reset();
    }

    tracing::debug!("Refresher stopped");
}
