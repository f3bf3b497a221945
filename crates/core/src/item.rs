//! Indexable item descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{CoreError, CoreResult};
use crate::id::{ElementId, SiteId};

/// Kind of element being indexed (e.g. `"entry"`, `"asset"`, `"product"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemType(String);

impl ItemType {
    pub fn new(value: impl Into<String>) -> CoreResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::validation("item type must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemType {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItemType> for String {
    fn from(value: ItemType) -> Self {
        value.0
    }
}

impl core::fmt::Display for ItemType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Minimal description of one unit of reindex work.
///
/// Produced by the indexing side; the queue core only attaches it to a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexableItem {
    pub site_id: SiteId,
    pub element_id: ElementId,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

impl IndexableItem {
    pub fn new(site_id: SiteId, element_id: ElementId, item_type: ItemType) -> Self {
        Self {
            site_id,
            element_id,
            item_type,
        }
    }

    /// JSON payload attached to the queued job.
    pub fn to_payload(&self) -> JsonValue {
        serde_json::json!({
            "siteId": self.site_id.get(),
            "elementId": self.element_id.get(),
            "type": self.item_type.as_str(),
        })
    }

    /// Read a descriptor back out of a job payload.
    pub fn from_payload(payload: &JsonValue) -> CoreResult<Self> {
        Self::deserialize(payload)
            .map_err(|e| CoreError::validation(format!("indexable item payload: {e}")))
    }
}

impl core::fmt::Display for IndexableItem {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}#{} (site {})",
            self.item_type, self.element_id, self.site_id
        )
    }
}
