//! Strongly-typed identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Opaque identifier returned by a work queue when a job is pushed.
///
/// Backends hand out either numeric ids (database-backed queues) or string
/// keys. The core never interprets a handle; it only compares, stores and
/// hands it back to the queue that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobHandle {
    Id(u64),
    Key(String),
}

impl JobHandle {
    pub fn id(id: u64) -> Self {
        Self::Id(id)
    }

    pub fn key(key: impl Into<String>) -> Self {
        Self::Key(key.into())
    }
}

impl core::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            JobHandle::Id(id) => write!(f, "{id}"),
            JobHandle::Key(key) => f.write_str(key),
        }
    }
}

impl FromStr for JobHandle {
    type Err = CoreError;

    /// Numeric strings become `Id`, anything else non-empty becomes `Key`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CoreError::invalid_id("JobHandle: empty"));
        }
        Ok(s.parse::<u64>()
            .map(JobHandle::Id)
            .unwrap_or_else(|_| JobHandle::Key(s.to_string())))
    }
}

/// Identifier of a site (content is indexed per site).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(u64);

/// Identifier of an indexable element.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

macro_rules! impl_int_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<u64> for $t {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| CoreError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(value))
            }
        }
    };
}

impl_int_newtype!(SiteId, "SiteId");
impl_int_newtype!(ElementId, "ElementId");
