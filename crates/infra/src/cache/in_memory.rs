//! In-memory expiring cache for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use reindexer_core::{Clock, SystemClock};

use super::{CacheError, ExpiringCache};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: JsonValue,
    /// `None` when the TTL does not fit in a timestamp
    expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory cache.
///
/// - No IO
/// - Expiry is evaluated lazily against the injected clock; expired entries
///   are purged when read
#[derive(Debug)]
pub struct InMemoryCache<C = SystemClock> {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: C,
}

impl InMemoryCache<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// When `key` expires, if it is present and live.
    pub fn expires_at(&self, key: &str) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;
        entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.expires_at)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        match self.entries.read() {
            Ok(entries) => entries.values().filter(|e| !e.is_expired(now)).count(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> CacheError {
    CacheError::Backend("cache lock poisoned".to_string())
}

impl<C: Clock> ExpiringCache for InMemoryCache<C> {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, CacheError> {
        let now = self.clock.now();
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<(), CacheError> {
        let now = self.clock.now();
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl));

        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}
