//! Queue job types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reindexer_core::{CoreResult, IndexableItem, JobHandle};

/// Job kind for routing on the worker side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Reindex a single element
    IndexElement,
    /// Clear tracked jobs and enqueue one `IndexElement` job per indexable item
    BulkIndex,
}

impl JobKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            JobKind::IndexElement => "index_element",
            JobKind::BulkIndex => "bulk_index",
        }
    }

    pub fn default_description(&self) -> &'static str {
        match self {
            JobKind::IndexElement => "Indexing element",
            JobKind::BulkIndex => "Building bulk of indexing jobs",
        }
    }
}

/// Payload pushed onto the work queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub kind: JobKind,
    pub description: String,
    pub data: serde_json::Value,
}

impl JobPayload {
    /// Single-element reindex job.
    pub fn index_element(item: &IndexableItem) -> Self {
        Self {
            kind: JobKind::IndexElement,
            description: JobKind::IndexElement.default_description().to_string(),
            data: item.to_payload(),
        }
    }

    /// Full-reindex trigger job.
    pub fn bulk_index() -> Self {
        Self {
            kind: JobKind::BulkIndex,
            description: JobKind::BulkIndex.default_description().to_string(),
            data: serde_json::Value::Null,
        }
    }

    /// The item carried by an `IndexElement` payload.
    pub fn item(&self) -> Option<CoreResult<IndexableItem>> {
        match self.kind {
            JobKind::IndexElement => Some(IndexableItem::from_payload(&self.data)),
            JobKind::BulkIndex => None,
        }
    }
}

/// Status of a job held by the in-memory queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueuedJobStatus {
    /// Waiting for a worker
    Pending,
    /// Released; kept for history, never executed
    Released,
}

/// A job as seen by the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedJob {
    pub handle: JobHandle,
    pub payload: JobPayload,
    pub status: QueuedJobStatus,
    pub enqueued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QueuedJob {
    pub fn new(handle: JobHandle, payload: JobPayload) -> Self {
        let now = Utc::now();
        Self {
            handle,
            payload,
            status: QueuedJobStatus::Pending,
            enqueued_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == QueuedJobStatus::Pending
    }

    pub fn mark_released(&mut self) {
        self.status = QueuedJobStatus::Released;
        self.updated_at = Utc::now();
    }
}
