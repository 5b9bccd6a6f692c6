//! Queue of optimistic edits awaiting confirmation

use std::collections::HashMap;
use tabula_core::{CellKey, CellUpdate};

/// At most one pending edit per cell; a newer edit replaces the older one
#[derive(Debug, Clone, Default)]
pub struct PendingUpdates {
    entries: HashMap<CellKey, CellUpdate>,
}

impl PendingUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an edit, returning the entry it replaced
    pub fn queue(&mut self, update: CellUpdate) -> Option<CellUpdate> {
        self.entries.insert(update.key(), update)
    }

    pub fn take(&mut self, key: &CellKey) -> Option<CellUpdate> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &CellKey) -> Option<&CellUpdate> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CellUpdate> {
        self.entries.values()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn drop_column(&mut self, column_id: &str) {
        self.entries.retain(|key, _| key.column_id != column_id);
    }

    pub(crate) fn drop_row(&mut self, row_id: &str) {
        self.entries.retain(|key, _| key.row_id != row_id);
    }
}
