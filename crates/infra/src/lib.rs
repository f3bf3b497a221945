//! Infrastructure layer: work queue and cache seams, reindex job tracking.
//!
//! ## Components
//!
//! - `WorkQueue`: push/delete/release contract of the queue backend
//! - `ExpiringCache`: key/value cache with per-entry TTL
//! - `IndexableItemSource`: lists every item a full reindex must cover
//! - `QueueTracker`: the tracked handle set and all cancellation
//! - `JobDispatcher`: one queue job per item, handles recorded in batch
//! - `Reindexer`: full-reindex orchestration (clear, then dispatch)

pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod reindexer;
pub mod source;
pub mod tracker;

#[cfg(test)]
mod test_support;

pub use cache::{CacheError, ExpiringCache, InMemoryCache};
pub use config::ReindexConfig;
pub use dispatcher::{DispatchReport, JobDispatcher, PushFailure};
pub use error::{ReindexError, ReindexResult};
pub use queue::{InMemoryWorkQueue, JobKind, JobPayload, QueueError, QueuedJob, WorkQueue};
pub use reindexer::{FullReindexReport, Reindexer};
pub use source::{IndexableItemSource, SourceError, StaticItemSource};
pub use tracker::{CancelMode, CancelOutcome, ClearSummary, QueueTracker};
