//! Reindex tracking configuration.

use std::time::Duration;

use crate::error::{ReindexError, ReindexResult};

/// Default plugin namespace for the cache key.
pub const DEFAULT_PLUGIN_HANDLE: &str = "elasticsearch";

/// Default lifetime of the tracked job set.
pub const DEFAULT_JOBS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub const PLUGIN_HANDLE_VAR: &str = "REINDEX_PLUGIN_HANDLE";
pub const JOBS_TTL_VAR: &str = "REINDEX_JOBS_TTL_SECS";

/// Configuration shared by the tracker and the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReindexConfig {
    /// Namespace of the cache key (`"<plugin_handle>_reindex_jobs"`)
    pub plugin_handle: String,
    /// TTL applied on every write of the tracked job set
    pub jobs_ttl: Duration,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            plugin_handle: DEFAULT_PLUGIN_HANDLE.to_string(),
            jobs_ttl: DEFAULT_JOBS_TTL,
        }
    }
}

impl ReindexConfig {
    pub fn new(plugin_handle: impl Into<String>) -> Self {
        Self {
            plugin_handle: plugin_handle.into(),
            ..Default::default()
        }
    }

    pub fn with_jobs_ttl(mut self, ttl: Duration) -> Self {
        self.jobs_ttl = ttl;
        self
    }

    /// Read `REINDEX_PLUGIN_HANDLE` and `REINDEX_JOBS_TTL_SECS`, falling back
    /// to defaults when unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let plugin_handle = lookup(PLUGIN_HANDLE_VAR)
            .unwrap_or_else(|| DEFAULT_PLUGIN_HANDLE.to_string());
        let jobs_ttl = lookup(JOBS_TTL_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_JOBS_TTL);

        Self {
            plugin_handle,
            jobs_ttl,
        }
    }

    pub fn cache_key(&self) -> String {
        format!("{}_reindex_jobs", self.plugin_handle)
    }

    pub fn validate(&self) -> ReindexResult<()> {
        if self.plugin_handle.trim().is_empty() {
            return Err(ReindexError::Configuration(
                "plugin handle must not be empty".to_string(),
            ));
        }
        if self.jobs_ttl.is_zero() {
            return Err(ReindexError::Configuration(
                "jobs TTL must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
