//! Errors surfaced by the tracker, the dispatcher and the orchestration.

use reindexer_core::{CoreError, IndexableItem, JobHandle};

use crate::cache::CacheError;
use crate::queue::QueueError;
use crate::source::SourceError;

pub type ReindexResult<T> = Result<T, ReindexError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReindexError {
    /// Queue or cache missing/unreachable/misconfigured. Fatal, never retried.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A job failed to enqueue.
    #[error("failed to push job for {item}: {source}")]
    Push {
        item: Box<IndexableItem>,
        #[source]
        source: QueueError,
    },
    /// An explicitly requested cancellation failed.
    #[error("failed to cancel job {handle}: {source}")]
    Cancellation {
        handle: JobHandle,
        #[source]
        source: QueueError,
    },
    /// Jobs made it onto the queue but recording their handles failed. The
    /// handles are the only way left to cancel them.
    #[error("{} enqueued job(s) not tracked: {source}", .handles.len())]
    Untracked {
        handles: Vec<JobHandle>,
        #[source]
        source: Box<ReindexError>,
    },
    #[error("queue error: {0}")]
    Queue(QueueError),
    #[error("cache error: {0}")]
    Cache(CacheError),
    #[error("item source error: {0}")]
    Source(SourceError),
    /// The payload is not something this crate executes.
    #[error("unsupported job: {0}")]
    UnsupportedJob(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ReindexError {
    /// Map a push failure for `item`. An unreachable queue is a configuration
    /// problem, not an item problem.
    pub fn push(item: &IndexableItem, source: QueueError) -> Self {
        match source {
            QueueError::Unavailable(msg) => ReindexError::Configuration(msg),
            source => ReindexError::Push {
                item: Box::new(item.clone()),
                source,
            },
        }
    }

    /// Wrap a tracking failure that happened after `handles` were pushed.
    pub fn untracked(handles: Vec<JobHandle>, source: ReindexError) -> Self {
        ReindexError::Untracked {
            handles,
            source: Box::new(source),
        }
    }

    pub fn is_configuration(&self) -> bool {
        match self {
            ReindexError::Configuration(_) => true,
            ReindexError::Untracked { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

impl From<QueueError> for ReindexError {
    fn from(value: QueueError) -> Self {
        match value {
            QueueError::Unavailable(msg) => ReindexError::Configuration(msg),
            other => ReindexError::Queue(other),
        }
    }
}

impl From<CacheError> for ReindexError {
    fn from(value: CacheError) -> Self {
        match value {
            CacheError::Unavailable(msg) => ReindexError::Configuration(msg),
            other => ReindexError::Cache(other),
        }
    }
}

impl From<SourceError> for ReindexError {
    fn from(value: SourceError) -> Self {
        ReindexError::Source(value)
    }
}
