//! Work queue abstraction and in-memory backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use reindexer_core::JobHandle;

use super::types::{JobPayload, QueuedJob, QueuedJobStatus};

/// Work queue abstraction.
///
/// Only the push/cancel contract is modelled here; executing the jobs is the
/// backend's business.
pub trait WorkQueue: Send + Sync {
    /// Enqueue a job, returning the handle the backend assigned to it.
    fn push(&self, payload: JobPayload) -> Result<JobHandle, QueueError>;

    /// Remove a job and its history. Only meaningful when
    /// `supports_durable_delete` is true.
    fn delete(&self, handle: &JobHandle) -> Result<(), QueueError>;

    /// Mark a pending job as released so it never runs.
    fn release(&self, handle: &JobHandle) -> Result<(), QueueError>;

    /// Whether `delete` is supported by this backend.
    fn supports_durable_delete(&self) -> bool {
        false
    }
}

/// Work queue error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue unavailable: {0}")]
    Unavailable(String),
    #[error("job not found: {0}")]
    NotFound(JobHandle),
    #[error("operation not supported by queue backend: {0}")]
    Unsupported(&'static str),
    #[error("queue backend error: {0}")]
    Backend(String),
}

impl<Q> WorkQueue for Arc<Q>
where
    Q: WorkQueue + ?Sized,
{
    fn push(&self, payload: JobPayload) -> Result<JobHandle, QueueError> {
        (**self).push(payload)
    }

    fn delete(&self, handle: &JobHandle) -> Result<(), QueueError> {
        (**self).delete(handle)
    }

    fn release(&self, handle: &JobHandle) -> Result<(), QueueError> {
        (**self).release(handle)
    }

    fn supports_durable_delete(&self) -> bool {
        (**self).supports_durable_delete()
    }
}

/// Which cancellation primitive the in-memory backend offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueBackend {
    /// Numeric handles; `delete` drops the job and its history
    Durable,
    /// String handles; jobs can only be released
    ReleaseOnly,
}

/// In-memory work queue for tests/dev.
#[derive(Debug)]
pub struct InMemoryWorkQueue {
    backend: QueueBackend,
    jobs: RwLock<BTreeMap<JobHandle, QueuedJob>>,
    next_id: AtomicU64,
    closed: AtomicBool,
}

impl InMemoryWorkQueue {
    pub fn new(backend: QueueBackend) -> Self {
        Self {
            backend,
            jobs: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            closed: AtomicBool::new(false),
        }
    }

    pub fn durable() -> Self {
        Self::new(QueueBackend::Durable)
    }

    pub fn release_only() -> Self {
        Self::new(QueueBackend::ReleaseOnly)
    }

    pub fn arc(backend: QueueBackend) -> Arc<Self> {
        Arc::new(Self::new(backend))
    }

    /// Stop accepting pushes (simulates an unreachable backend).
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn reopen(&self) {
        self.closed.store(false, Ordering::SeqCst);
    }

    pub fn get(&self, handle: &JobHandle) -> Result<Option<QueuedJob>, QueueError> {
        let jobs = self.jobs.read().map_err(|_| poisoned())?;
        Ok(jobs.get(handle).cloned())
    }

    /// All jobs, in handle order.
    pub fn jobs(&self) -> Result<Vec<QueuedJob>, QueueError> {
        let jobs = self.jobs.read().map_err(|_| poisoned())?;
        Ok(jobs.values().cloned().collect())
    }

    /// Jobs still waiting for a worker.
    pub fn pending(&self) -> Result<Vec<QueuedJob>, QueueError> {
        let jobs = self.jobs.read().map_err(|_| poisoned())?;
        Ok(jobs.values().filter(|j| j.is_pending()).cloned().collect())
    }

    /// Simulate a worker finishing a job: it disappears from the queue.
    pub fn complete(&self, handle: &JobHandle) -> Result<QueuedJob, QueueError> {
        let mut jobs = self.jobs.write().map_err(|_| poisoned())?;
        jobs.remove(handle)
            .ok_or_else(|| QueueError::NotFound(handle.clone()))
    }

    fn next_handle(&self) -> JobHandle {
        match self.backend {
            QueueBackend::Durable => JobHandle::Id(self.next_id.fetch_add(1, Ordering::SeqCst)),
            QueueBackend::ReleaseOnly => JobHandle::Key(Uuid::now_v7().to_string()),
        }
    }
}

impl Default for InMemoryWorkQueue {
    fn default() -> Self {
        Self::durable()
    }
}

fn poisoned() -> QueueError {
    QueueError::Backend("queue lock poisoned".to_string())
}

impl WorkQueue for InMemoryWorkQueue {
    fn push(&self, payload: JobPayload) -> Result<JobHandle, QueueError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable("queue is closed".to_string()));
        }
        let mut jobs = self.jobs.write().map_err(|_| poisoned())?;
        let handle = self.next_handle();
        jobs.insert(handle.clone(), QueuedJob::new(handle.clone(), payload));
        Ok(handle)
    }

    fn delete(&self, handle: &JobHandle) -> Result<(), QueueError> {
        if self.backend != QueueBackend::Durable {
            return Err(QueueError::Unsupported("delete"));
        }
        let mut jobs = self.jobs.write().map_err(|_| poisoned())?;
        jobs.remove(handle)
            .map(|_| ())
            .ok_or_else(|| QueueError::NotFound(handle.clone()))
    }

    fn release(&self, handle: &JobHandle) -> Result<(), QueueError> {
        let mut jobs = self.jobs.write().map_err(|_| poisoned())?;
        let job = jobs
            .get_mut(handle)
            .ok_or_else(|| QueueError::NotFound(handle.clone()))?;

        if job.status == QueuedJobStatus::Pending {
            job.mark_released();
        }
        Ok(())
    }

    fn supports_durable_delete(&self) -> bool {
        self.backend == QueueBackend::Durable
    }
}
