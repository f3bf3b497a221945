//! Job dispatch: one queue job per indexable item.
//!
//! Handles returned by the queue are handed to the `QueueTracker` so the jobs
//! stay cancellable. A batch dispatch records all of its handles with a single
//! cache write.
//!
//! ## Partial failure
//!
//! A push failure is reported for that item and the remaining items are still
//! attempted. Handles of the items that did make it onto the queue are tracked
//! regardless: those jobs are real and will run, so leaving them untracked
//! would make them uncancellable. If recording the handles fails instead, the
//! error is `ReindexError::Untracked` and carries them.

use tracing::{debug, info, warn};

use reindexer_core::{ElementId, IndexableItem, ItemType, JobHandle, SiteId};

use crate::cache::ExpiringCache;
use crate::error::{ReindexError, ReindexResult};
use crate::queue::{JobPayload, WorkQueue};
use crate::tracker::QueueTracker;

/// An item whose job could not be enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushFailure {
    pub item: IndexableItem,
    /// `ReindexError::Push`, or `ReindexError::Configuration` if the queue was unreachable
    pub error: ReindexError,
}

/// Outcome of `JobDispatcher::dispatch_all`.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    /// Items enqueued, in input order, with their handles
    pub dispatched: Vec<(IndexableItem, JobHandle)>,
    pub failures: Vec<PushFailure>,
}

impl DispatchReport {
    pub fn handles(&self) -> Vec<JobHandle> {
        self.dispatched.iter().map(|(_, h)| h.clone()).collect()
    }

    /// True when every item was enqueued.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Turns indexable items into queue jobs and tracks their handles.
#[derive(Debug)]
pub struct JobDispatcher<Q, C> {
    tracker: QueueTracker<Q, C>,
}

impl<Q, C> JobDispatcher<Q, C>
where
    Q: WorkQueue,
    C: ExpiringCache,
{
    pub fn new(tracker: QueueTracker<Q, C>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &QueueTracker<Q, C> {
        &self.tracker
    }

    /// Enqueue a reindex job for one element and track it.
    pub fn dispatch_one(
        &self,
        element_id: ElementId,
        site_id: SiteId,
        item_type: ItemType,
    ) -> ReindexResult<JobHandle> {
        self.dispatch_item(&IndexableItem::new(site_id, element_id, item_type))
    }

    /// Enqueue a reindex job for `item` and track it.
    pub fn dispatch_item(&self, item: &IndexableItem) -> ReindexResult<JobHandle> {
        let handle = self.push(item)?;

        if let Err(e) = self.tracker.add_handle(handle.clone()) {
            warn!(handle = %handle, error = %e, "job enqueued but not tracked");
            return Err(ReindexError::untracked(vec![handle], e));
        }

        debug!(handle = %handle, item = %item, "reindex job dispatched");
        Ok(handle)
    }

    /// Enqueue one job per item, then track every new handle in one write.
    ///
    /// An empty input pushes nothing and leaves the cache untouched.
    pub fn dispatch_all<I>(&self, items: I) -> ReindexResult<DispatchReport>
    where
        I: IntoIterator<Item = IndexableItem>,
    {
        let mut report = DispatchReport::default();

        for item in items {
            match self.push(&item) {
                Ok(handle) => report.dispatched.push((item, handle)),
                Err(error) => {
                    warn!(item = %item, error = %error, "failed to enqueue reindex job");
                    report.failures.push(PushFailure { item, error });
                }
            }
        }

        if let Err(e) = self.tracker.add_handles(report.handles()) {
            warn!(
                untracked = report.dispatched.len(),
                error = %e,
                "reindex jobs enqueued but not tracked"
            );
            return Err(ReindexError::untracked(report.handles(), e));
        }

        info!(
            dispatched = report.dispatched.len(),
            failed = report.failures.len(),
            "reindex jobs dispatched"
        );
        Ok(report)
    }

    fn push(&self, item: &IndexableItem) -> ReindexResult<JobHandle> {
        self.tracker
            .queue()
            .push(JobPayload::index_element(item))
            .map_err(|e| ReindexError::push(item, e))
    }
}
