//! Work queue seam.
//!
//! ## Design
//!
//! - Jobs are pushed with a typed payload and identified by an opaque handle
//! - Cancellation is either a hard delete or a release, per backend capability
//! - Execution, retry and backoff belong to the queue, not to this crate
//!
//! ## Components
//!
//! - `JobPayload`: what gets pushed (kind + description + JSON data)
//! - `WorkQueue`: push/delete/release contract
//! - `InMemoryWorkQueue`: durable or release-only backend for tests/dev

pub mod store;
pub mod types;

pub use store::{InMemoryWorkQueue, QueueBackend, QueueError, WorkQueue};
pub use types::{JobKind, JobPayload, QueuedJob, QueuedJobStatus};
