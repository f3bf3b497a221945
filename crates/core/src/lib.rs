//! `reindexer-core` — building blocks for reindex queue bookkeeping.
//!
//! This crate contains **pure** primitives (no queue or cache access): job
//! handles, indexable item descriptors, the tracked handle set and the clock
//! abstraction used for TTL arithmetic.

pub mod clock;
pub mod error;
pub mod id;
pub mod item;
pub mod tracked;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use id::{ElementId, JobHandle, SiteId};
pub use item::{IndexableItem, ItemType};
pub use tracked::TrackedJobSet;
