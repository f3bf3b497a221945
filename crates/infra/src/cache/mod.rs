//! Expiring key/value cache seam.

mod in_memory;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;

pub use in_memory::InMemoryCache;

/// Key/value cache with per-entry time-to-live.
///
/// An expired entry must read as absent.
pub trait ExpiringCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, CacheError>;

    /// Store `value`, replacing any previous entry, expiring after `ttl`.
    fn set(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<(), CacheError>;

    /// Drop the entry. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Cache error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl<C> ExpiringCache for Arc<C>
where
    C: ExpiringCache + ?Sized,
{
    fn get(&self, key: &str) -> Result<Option<JsonValue>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<(), CacheError> {
        (**self).set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }
}
