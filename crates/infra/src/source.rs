//! Source of indexable items for a full reindex.

use std::sync::{Arc, RwLock};

use reindexer_core::IndexableItem;

/// Lists every item a full reindex must cover.
///
/// Items are read fresh on each call; the orchestration never caches them.
pub trait IndexableItemSource: Send + Sync {
    fn list_all_indexable_items(&self) -> Result<Vec<IndexableItem>, SourceError>;
}

/// Item source error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("item source unavailable: {0}")]
    Unavailable(String),
    #[error("item source error: {0}")]
    Backend(String),
}

impl<S> IndexableItemSource for Arc<S>
where
    S: IndexableItemSource + ?Sized,
{
    fn list_all_indexable_items(&self) -> Result<Vec<IndexableItem>, SourceError> {
        (**self).list_all_indexable_items()
    }
}

/// Fixed list of items for tests/dev. The list can be swapped between runs.
#[derive(Debug, Default)]
pub struct StaticItemSource {
    items: RwLock<Vec<IndexableItem>>,
}

impl StaticItemSource {
    pub fn new(items: Vec<IndexableItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn replace(&self, items: Vec<IndexableItem>) {
        if let Ok(mut current) = self.items.write() {
            *current = items;
        }
    }
}

impl IndexableItemSource for StaticItemSource {
    fn list_all_indexable_items(&self) -> Result<Vec<IndexableItem>, SourceError> {
        self.items
            .read()
            .map(|items| items.clone())
            .map_err(|_| SourceError::Backend("item source lock poisoned".to_string()))
    }
}
