//! Table rows

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CellValue, ColumnId, RowId};

/// One record: a value per column plus the default-order key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    /// Persisted default order, also the final sort tiebreaker
    pub position: f64,
    #[serde(default)]
    pub data: HashMap<ColumnId, CellValue>,
}

impl Row {
    pub fn new(id: impl Into<RowId>, position: f64) -> Self {
        Self {
            id: id.into(),
            position,
            data: HashMap::new(),
        }
    }

    /// Builder: set a cell value
    pub fn with(mut self, column_id: impl Into<ColumnId>, value: CellValue) -> Self {
        self.data.insert(column_id.into(), value);
        self
    }

    /// Cell value for a column; `None` when the key is absent
    pub fn get(&self, column_id: &str) -> Option<&CellValue> {
        self.data.get(column_id)
    }

    /// Write a cell, returning what was there before (`Null` when absent)
    pub fn set(&mut self, column_id: impl Into<ColumnId>, value: CellValue) -> CellValue {
        self.data.insert(column_id.into(), value).unwrap_or_default()
    }

    pub fn remove(&mut self, column_id: &str) -> Option<CellValue> {
        self.data.remove(column_id)
    }
}
