//! Reindex job tracking.
//!
//! The tracker owns the bookkeeping that maps reindex work to queue handles:
//! a single cache entry (`"<plugin>_reindex_jobs"`) holding a `TrackedJobSet`.
//!
//! ## Consistency
//!
//! Every mutation is a read-modify-write of that one entry with no locking.
//! Two concurrent writers resolve last-write-wins; a handle dropped that way
//! still runs, it just can no longer be cancelled by `clear_all`. Completion of
//! a job is never observed, so the set may hold stale handles; cancelling one
//! is treated like a successful cancellation.

use tracing::{debug, info, warn};

use reindexer_core::{JobHandle, TrackedJobSet};

use crate::cache::ExpiringCache;
use crate::config::ReindexConfig;
use crate::error::{ReindexError, ReindexResult};
use crate::queue::{QueueError, WorkQueue};

/// Cancellation primitive used against the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelMode {
    /// Hard delete (backend keeps durable execution history)
    Delete,
    /// Mark the pending job released
    Release,
}

impl CancelMode {
    /// Probe the backend capability. Release unless delete is supported.
    pub fn for_queue<Q: WorkQueue + ?Sized>(queue: &Q) -> Self {
        if queue.supports_durable_delete() {
            CancelMode::Delete
        } else {
            CancelMode::Release
        }
    }
}

/// What happened to a cancelled handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// The job was already gone (executed or removed)
    Stale,
}

/// Result of `QueueTracker::clear_all`.
#[derive(Debug, Clone, Default)]
pub struct ClearSummary {
    /// Cancellation attempts issued (one per tracked handle)
    pub attempted: usize,
    pub cancelled: usize,
    pub stale: usize,
    /// Swallowed failures, for inspection
    pub failed: Vec<(JobHandle, QueueError)>,
}

/// Tracks the handles of queued reindex jobs and mediates their cancellation.
///
/// Stateless apart from the cache entry; cheap to construct per call.
#[derive(Debug)]
pub struct QueueTracker<Q, C> {
    queue: Q,
    cache: C,
    config: ReindexConfig,
    cache_key: String,
    cancel_mode: CancelMode,
}

impl<Q, C> QueueTracker<Q, C>
where
    Q: WorkQueue,
    C: ExpiringCache,
{
    /// Build a tracker. The cancellation primitive is decided here, once.
    pub fn new(queue: Q, cache: C, config: ReindexConfig) -> ReindexResult<Self> {
        config.validate()?;
        let cancel_mode = CancelMode::for_queue(&queue);
        let cache_key = config.cache_key();
        debug!(cache_key = %cache_key, ?cancel_mode, "queue tracker ready");

        Ok(Self {
            queue,
            cache,
            config,
            cache_key,
            cancel_mode,
        })
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn config(&self) -> &ReindexConfig {
        &self.config
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn cancel_mode(&self) -> CancelMode {
        self.cancel_mode
    }

    /// Current tracked set. Absent, expired or malformed entries are empty.
    pub fn tracked(&self) -> ReindexResult<TrackedJobSet> {
        let value = self.cache.get(&self.cache_key)?;
        Ok(TrackedJobSet::from_cache_value(value))
    }

    /// Track one handle, refreshing the TTL.
    pub fn add_handle(&self, handle: JobHandle) -> ReindexResult<()> {
        let mut set = self.tracked()?;
        if !set.insert(handle.clone()) {
            debug!(handle = %handle, "handle already tracked");
        }
        self.write(&set)
    }

    /// Track a batch of handles with a single cache write.
    ///
    /// An empty batch does not touch the cache.
    pub fn add_handles<I>(&self, handles: I) -> ReindexResult<()>
    where
        I: IntoIterator<Item = JobHandle>,
    {
        let mut handles = handles.into_iter().peekable();
        if handles.peek().is_none() {
            return Ok(());
        }

        let mut set = self.tracked()?;
        let added = set.union(handles);
        debug!(added, total = set.len(), "tracking reindex jobs");
        self.write(&set)
    }

    /// Cancel the job behind `handle` and stop tracking it.
    ///
    /// The queue is asked to cancel even if the handle is not tracked. A job
    /// that is already gone counts as cancelled. Returns whether the handle was
    /// tracked.
    pub fn remove_handle(&self, handle: &JobHandle) -> ReindexResult<bool> {
        match self.cancel(handle) {
            Ok(outcome) => debug!(handle = %handle, ?outcome, "job cancelled"),
            Err(source) => {
                return Err(match source {
                    QueueError::Unavailable(msg) => ReindexError::Configuration(msg),
                    source => ReindexError::Cancellation {
                        handle: handle.clone(),
                        source,
                    },
                });
            }
        }

        let mut set = self.tracked()?;
        let was_tracked = set.remove(handle);
        self.write(&set)?;
        Ok(was_tracked)
    }

    /// Cancel every tracked job, then delete the cache entry.
    ///
    /// Per-job cancellation failures are logged, collected in the summary and
    /// never stop the loop. An unreachable queue aborts the clear with a
    /// configuration error and leaves the cache entry in place.
    pub fn clear_all(&self) -> ReindexResult<ClearSummary> {
        let set = self.tracked()?;
        let mut summary = ClearSummary::default();

        for handle in set {
            summary.attempted += 1;
            match self.cancel(&handle) {
                Ok(CancelOutcome::Cancelled) => summary.cancelled += 1,
                Ok(CancelOutcome::Stale) => summary.stale += 1,
                Err(QueueError::Unavailable(msg)) => {
                    warn!(handle = %handle, error = %msg, "queue unreachable, keeping tracked jobs");
                    return Err(ReindexError::Configuration(msg));
                }
                Err(e) => {
                    warn!(handle = %handle, error = %e, "failed to cancel reindex job, skipping");
                    summary.failed.push((handle, e));
                }
            }
        }

        self.cache.delete(&self.cache_key)?;

        info!(
            attempted = summary.attempted,
            cancelled = summary.cancelled,
            stale = summary.stale,
            failed = summary.failed.len(),
            "cleared reindex jobs"
        );
        Ok(summary)
    }

    /// Issue the configured cancellation primitive. No fallback to the other one.
    pub(crate) fn cancel(&self, handle: &JobHandle) -> Result<CancelOutcome, QueueError> {
        let result = match self.cancel_mode {
            CancelMode::Delete => self.queue.delete(handle),
            CancelMode::Release => self.queue.release(handle),
        };

        match result {
            Ok(()) => Ok(CancelOutcome::Cancelled),
            Err(QueueError::NotFound(_)) => Ok(CancelOutcome::Stale),
            Err(e) => Err(e),
        }
    }

    fn write(&self, set: &TrackedJobSet) -> ReindexResult<()> {
        self.cache
            .set(&self.cache_key, set.to_cache_value(), self.config.jobs_ttl)?;
        Ok(())
    }
}
