//! Call-recording queue and cache fakes for unit tests.
//!
//! Both fakes append to one shared `CallLog`, so tests can assert on the
//! relative order of queue and cache calls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value as JsonValue;

use reindexer_core::JobHandle;

use crate::cache::{CacheError, ExpiringCache};
use crate::queue::{JobKind, JobPayload, QueueError, WorkQueue};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Push { kind: JobKind, handle: JobHandle },
    Delete(JobHandle),
    Release(JobHandle),
    CacheGet { key: String },
    CacheSet { key: String, value: JsonValue, ttl: Duration },
    CacheDelete { key: String },
}

#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls().iter().position(pred)
    }

    pub fn cancellations(&self) -> Vec<JobHandle> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(h) | Call::Release(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    pub fn pushes(&self) -> Vec<JobHandle> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Push { handle, .. } => Some(handle),
                _ => None,
            })
            .collect()
    }

    pub fn cache_sets(&self) -> Vec<JsonValue> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::CacheSet { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }
}

/// Queue fake: hands out numeric handles, cancels anything unless told to fail.
#[derive(Debug)]
pub struct RecordingQueue {
    durable: bool,
    log: CallLog,
    next_id: AtomicU64,
    push_failures: Mutex<HashMap<u64, QueueError>>,
    cancel_failures: Mutex<HashMap<JobHandle, QueueError>>,
}

impl RecordingQueue {
    fn new(durable: bool) -> Self {
        Self {
            durable,
            log: CallLog::default(),
            next_id: AtomicU64::new(100),
            push_failures: Mutex::new(HashMap::new()),
            cancel_failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn durable() -> Self {
        Self::new(true)
    }

    pub fn release_only() -> Self {
        Self::new(false)
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Fail pushes of `IndexElement` jobs for this element id.
    pub fn fail_push(&self, element_id: u64, error: QueueError) {
        self.push_failures.lock().unwrap().insert(element_id, error);
    }

    pub fn fail_cancel(&self, handle: JobHandle, error: QueueError) {
        self.cancel_failures.lock().unwrap().insert(handle, error);
    }

    fn cancel(&self, handle: &JobHandle) -> Result<(), QueueError> {
        match self.cancel_failures.lock().unwrap().get(handle) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl WorkQueue for RecordingQueue {
    fn push(&self, payload: JobPayload) -> Result<JobHandle, QueueError> {
        if let Some(Ok(item)) = payload.item() {
            if let Some(err) = self.push_failures.lock().unwrap().get(&item.element_id.get()) {
                return Err(err.clone());
            }
        }
        let handle = JobHandle::id(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.log.record(Call::Push {
            kind: payload.kind,
            handle: handle.clone(),
        });
        Ok(handle)
    }

    fn delete(&self, handle: &JobHandle) -> Result<(), QueueError> {
        self.log.record(Call::Delete(handle.clone()));
        self.cancel(handle)
    }

    fn release(&self, handle: &JobHandle) -> Result<(), QueueError> {
        self.log.record(Call::Release(handle.clone()));
        self.cancel(handle)
    }

    fn supports_durable_delete(&self) -> bool {
        self.durable
    }
}

/// Cache fake: plain map (TTL recorded, never enforced).
#[derive(Debug)]
pub struct RecordingCache {
    log: CallLog,
    entries: Mutex<HashMap<String, JsonValue>>,
    fail_next: Mutex<Option<CacheError>>,
}

impl RecordingCache {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            entries: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Put a value in place without recording a call.
    pub fn seed(&self, key: &str, value: JsonValue) {
        self.entries.lock().unwrap().insert(key.to_string(), value);
    }

    /// Peek at a value without recording a call.
    pub fn raw(&self, key: &str) -> Option<JsonValue> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Make the next cache call fail.
    pub fn fail_next(&self, error: CacheError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    fn take_failure(&self) -> Result<(), CacheError> {
        match self.fail_next.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ExpiringCache for RecordingCache {
    fn get(&self, key: &str) -> Result<Option<JsonValue>, CacheError> {
        self.log.record(Call::CacheGet { key: key.to_string() });
        self.take_failure()?;
        Ok(self.raw(key))
    }

    fn set(&self, key: &str, value: JsonValue, ttl: Duration) -> Result<(), CacheError> {
        self.log.record(Call::CacheSet {
            key: key.to_string(),
            value: value.clone(),
            ttl,
        });
        self.take_failure()?;
        self.seed(key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.log.record(Call::CacheDelete { key: key.to_string() });
        self.take_failure()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
