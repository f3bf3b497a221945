//! Full-reindex orchestration.
//!
//! ```text
//! reindex_all
//!   ↓
//! 1. clear_all: cancel every tracked job, delete the cache entry
//!   ↓
//! 2. list items fresh from the source
//!   ↓
//! 3. dispatch_all: one job per item, handles tracked in one write
//! ```
//!
//! The clear must finish before anything new is queued: old jobs may carry a
//! snapshot of the index state that the fresh items supersede.
//!
//! A full reindex can also be deferred: `schedule_full_reindex` pushes a single
//! `BulkIndex` job, and the worker that picks it up calls `execute`.

use tracing::{info, warn};

use reindexer_core::{IndexableItem, JobHandle, TrackedJobSet};

use crate::cache::ExpiringCache;
use crate::dispatcher::{DispatchReport, JobDispatcher};
use crate::error::{ReindexError, ReindexResult};
use crate::queue::{JobKind, JobPayload, WorkQueue};
use crate::source::IndexableItemSource;
use crate::tracker::{ClearSummary, QueueTracker};

/// Outcome of a full reindex.
#[derive(Debug, Clone, Default)]
pub struct FullReindexReport {
    pub cleared: ClearSummary,
    pub dispatch: DispatchReport,
}

/// Composes the tracker, the dispatcher and an item source.
#[derive(Debug)]
pub struct Reindexer<Q, C, S> {
    dispatcher: JobDispatcher<Q, C>,
    source: S,
}

impl<Q, C, S> Reindexer<Q, C, S>
where
    Q: WorkQueue,
    C: ExpiringCache,
    S: IndexableItemSource,
{
    pub fn new(tracker: QueueTracker<Q, C>, source: S) -> Self {
        Self {
            dispatcher: JobDispatcher::new(tracker),
            source,
        }
    }

    pub fn tracker(&self) -> &QueueTracker<Q, C> {
        self.dispatcher.tracker()
    }

    pub fn dispatcher(&self) -> &JobDispatcher<Q, C> {
        &self.dispatcher
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Cancel all tracked jobs, then enqueue a fresh job per indexable item.
    pub fn reindex_all(&self) -> ReindexResult<FullReindexReport> {
        let cleared = self.tracker().clear_all()?;

        let items = self.source.list_all_indexable_items()?;
        info!(items = items.len(), "starting full reindex");

        let dispatch = self.dispatcher.dispatch_all(items)?;
        if !dispatch.is_complete() {
            warn!(
                failed = dispatch.failures.len(),
                "full reindex finished with push failures"
            );
        }

        Ok(FullReindexReport { cleared, dispatch })
    }

    /// Enqueue and track a reindex job for one item.
    pub fn reindex_one(&self, item: &IndexableItem) -> ReindexResult<JobHandle> {
        self.dispatcher.dispatch_item(item)
    }

    /// Cancel one job and stop tracking it.
    pub fn cancel(&self, handle: &JobHandle) -> ReindexResult<bool> {
        self.tracker().remove_handle(handle)
    }

    pub fn tracked(&self) -> ReindexResult<TrackedJobSet> {
        self.tracker().tracked()
    }

    /// Push a `BulkIndex` job that performs `reindex_all` when executed.
    ///
    /// The bulk job itself is not tracked; `clear_all` only cancels the
    /// per-item work it produces.
    pub fn schedule_full_reindex(&self) -> ReindexResult<JobHandle> {
        let handle = self.tracker().queue().push(JobPayload::bulk_index())?;
        info!(handle = %handle, "full reindex scheduled");
        Ok(handle)
    }

    /// Run a job pushed by this crate. Only `BulkIndex` is executed here;
    /// indexing a single element is the indexing side's job.
    pub fn execute(&self, payload: &JobPayload) -> ReindexResult<FullReindexReport> {
        match payload.kind {
            JobKind::BulkIndex => self.reindex_all(),
            JobKind::IndexElement => Err(ReindexError::UnsupportedJob(
                JobKind::IndexElement.type_name().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reindexer_core::{ElementId, ItemType, SiteId};

    use super::*;
    use crate::cache::InMemoryCache;
    use crate::config::ReindexConfig;
    use crate::queue::{InMemoryWorkQueue, QueuedJobStatus};
    use crate::source::{SourceError, StaticItemSource};
    use crate::test_support::{Call, RecordingCache, RecordingQueue};

    fn item(element: u64) -> IndexableItem {
        IndexableItem::new(
            SiteId::new(1),
            ElementId::new(element),
            ItemType::new("entry").unwrap(),
        )
    }

    fn in_memory(
        queue: Arc<InMemoryWorkQueue>,
        items: Vec<IndexableItem>,
    ) -> Reindexer<Arc<InMemoryWorkQueue>, InMemoryCache, Arc<StaticItemSource>> {
        reindexer_observability::init_for_tests();
        let tracker =
            QueueTracker::new(queue, InMemoryCache::new(), ReindexConfig::default()).unwrap();
        Reindexer::new(tracker, Arc::new(StaticItemSource::new(items)))
    }

    struct BrokenSource;

    impl IndexableItemSource for BrokenSource {
        fn list_all_indexable_items(&self) -> Result<Vec<IndexableItem>, SourceError> {
            Err(SourceError::Unavailable("index offline".into()))
        }
    }

    #[test]
    fn clear_delete_happens_before_dispatch_write() {
        let queue = Arc::new(RecordingQueue::durable());
        let cache = Arc::new(RecordingCache::new(queue.log()));
        let tracker =
            QueueTracker::new(queue.clone(), cache.clone(), ReindexConfig::default()).unwrap();
        cache.seed(tracker.cache_key(), serde_json::json!([1, 2]));
        let reindexer = Reindexer::new(tracker, StaticItemSource::new(vec![item(1), item(2)]));

        reindexer.reindex_all().unwrap();

        let log = queue.log();
        let delete_at = log
            .position(|c| matches!(c, Call::CacheDelete { .. }))
            .unwrap();
        let first_push = log.position(|c| matches!(c, Call::Push { .. })).unwrap();
        let write_at = log.position(|c| matches!(c, Call::CacheSet { .. })).unwrap();
        assert!(delete_at < first_push);
        assert!(delete_at < write_at);

        assert_eq!(log.cancellations(), vec![JobHandle::id(1), JobHandle::id(2)]);
        assert_eq!(log.cache_sets(), vec![serde_json::json!([100, 101])]);
    }

    #[test]
    fn second_full_reindex_supersedes_the_first() {
        let queue = Arc::new(InMemoryWorkQueue::durable());
        let reindexer = in_memory(queue.clone(), vec![item(1), item(2), item(3)]);

        let first = reindexer.reindex_all().unwrap();
        reindexer.source().replace(vec![item(1), item(2)]);
        let second = reindexer.reindex_all().unwrap();

        assert_eq!(second.cleared.cancelled, 3);
        let pending: Vec<JobHandle> = queue
            .pending()
            .unwrap()
            .into_iter()
            .map(|j| j.handle)
            .collect();
        assert_eq!(pending, second.dispatch.handles());
        assert!(first
            .dispatch
            .handles()
            .iter()
            .all(|h| !pending.contains(h)));
        assert_eq!(reindexer.tracked().unwrap().into_vec(), pending);
    }

    #[test]
    fn executed_jobs_are_stale_on_next_clear() {
        let queue = Arc::new(InMemoryWorkQueue::release_only());
        let reindexer = in_memory(queue.clone(), vec![item(1), item(2)]);

        let report = reindexer.reindex_all().unwrap();
        queue.complete(&report.dispatch.handles()[0]).unwrap();

        let again = reindexer.reindex_all().unwrap();
        assert_eq!(again.cleared.stale, 1);
        assert_eq!(again.cleared.cancelled, 1);
        assert!(again.cleared.failed.is_empty());

        let released = queue
            .get(&report.dispatch.handles()[1])
            .unwrap()
            .unwrap();
        assert_eq!(released.status, QueuedJobStatus::Released);
    }

    #[test]
    fn reindex_one_and_cancel() {
        let queue = Arc::new(InMemoryWorkQueue::durable());
        let reindexer = in_memory(queue.clone(), Vec::new());

        let handle = reindexer.reindex_one(&item(5)).unwrap();
        assert!(reindexer.tracked().unwrap().contains(&handle));

        assert!(reindexer.cancel(&handle).unwrap());
        assert!(reindexer.tracked().unwrap().is_empty());
        assert!(queue.get(&handle).unwrap().is_none());
    }

    #[test]
    fn scheduled_bulk_job_runs_full_reindex() {
        let queue = Arc::new(InMemoryWorkQueue::durable());
        let reindexer = in_memory(queue.clone(), vec![item(1), item(2)]);

        let bulk = reindexer.schedule_full_reindex().unwrap();
        assert!(reindexer.tracked().unwrap().is_empty());

        let job = queue.complete(&bulk).unwrap();
        let report = reindexer.execute(&job.payload).unwrap();

        assert_eq!(report.dispatch.dispatched.len(), 2);
        assert_eq!(reindexer.tracked().unwrap().len(), 2);
    }

    #[test]
    fn execute_rejects_single_element_jobs() {
        let reindexer = in_memory(Arc::new(InMemoryWorkQueue::durable()), Vec::new());

        let err = reindexer
            .execute(&JobPayload::index_element(&item(1)))
            .unwrap_err();
        assert!(matches!(err, ReindexError::UnsupportedJob(_)));
    }

    #[test]
    fn source_failure_after_clear_is_surfaced() {
        let queue = Arc::new(InMemoryWorkQueue::durable());
        let tracker =
            QueueTracker::new(queue.clone(), InMemoryCache::new(), ReindexConfig::default())
                .unwrap();
        let stale = queue.push(JobPayload::index_element(&item(1))).unwrap();
        tracker.add_handle(stale.clone()).unwrap();
        let reindexer = Reindexer::new(tracker, BrokenSource);

        let err = reindexer.reindex_all().unwrap_err();

        assert!(matches!(err, ReindexError::Source(_)));
        assert!(queue.get(&stale).unwrap().is_none());
        assert!(reindexer.tracked().unwrap().is_empty());
    }
}
