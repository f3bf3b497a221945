//! The set of job handles tracked for reindex work.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::id::JobHandle;

/// Ordered collection of job handles with set semantics.
///
/// Insertion order is preserved (cancellation walks handles oldest first);
/// duplicates collapse. The set is persisted wholesale as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<JobHandle>", into = "Vec<JobHandle>")]
pub struct TrackedJobSet {
    order: Vec<JobHandle>,
    index: HashSet<JobHandle>,
}

impl TrackedJobSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a cache value.
    ///
    /// An absent or malformed value is the empty set, never an error.
    pub fn from_cache_value(value: Option<JsonValue>) -> Self {
        match value {
            None => Self::new(),
            Some(value) => match serde_json::from_value::<Vec<JobHandle>>(value) {
                Ok(handles) => Self::from(handles),
                Err(e) => {
                    tracing::debug!(error = %e, "malformed tracked job set, treating as empty");
                    Self::new()
                }
            },
        }
    }

    pub fn to_cache_value(&self) -> JsonValue {
        JsonValue::Array(
            self.order
                .iter()
                .map(|handle| match handle {
                    JobHandle::Id(id) => JsonValue::from(*id),
                    JobHandle::Key(key) => JsonValue::from(key.as_str()),
                })
                .collect(),
        )
    }

    /// Add a handle. Returns `false` if it was already tracked.
    pub fn insert(&mut self, handle: JobHandle) -> bool {
        if !self.index.insert(handle.clone()) {
            return false;
        }
        self.order.push(handle);
        true
    }

    /// Union with `handles`. Returns how many were new.
    pub fn union<I>(&mut self, handles: I) -> usize
    where
        I: IntoIterator<Item = JobHandle>,
    {
        handles
            .into_iter()
            .filter(|h| self.insert(h.clone()))
            .count()
    }

    /// Remove a handle. Returns `false` if it was not tracked.
    pub fn remove(&mut self, handle: &JobHandle) -> bool {
        if !self.index.remove(handle) {
            return false;
        }
        self.order.retain(|h| h != handle);
        true
    }

    pub fn contains(&self, handle: &JobHandle) -> bool {
        self.index.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobHandle> {
        self.order.iter()
    }

    pub fn into_vec(self) -> Vec<JobHandle> {
        self.order
    }
}

impl From<Vec<JobHandle>> for TrackedJobSet {
    fn from(handles: Vec<JobHandle>) -> Self {
        let mut set = Self::new();
        set.union(handles);
        set
    }
}

impl From<TrackedJobSet> for Vec<JobHandle> {
    fn from(set: TrackedJobSet) -> Self {
        set.order
    }
}

impl FromIterator<JobHandle> for TrackedJobSet {
    fn from_iter<T: IntoIterator<Item = JobHandle>>(iter: T) -> Self {
        let mut set = Self::new();
        set.union(iter);
        set
    }
}

impl Extend<JobHandle> for TrackedJobSet {
    fn extend<T: IntoIterator<Item = JobHandle>>(&mut self, iter: T) {
        self.union(iter);
    }
}

impl IntoIterator for TrackedJobSet {
    type Item = JobHandle;
    type IntoIter = std::vec::IntoIter<JobHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

impl<'a> IntoIterator for &'a TrackedJobSet {
    type Item = &'a JobHandle;
    type IntoIter = std::slice::Iter<'a, JobHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}
