//! Saved table views

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ColumnId, Filter, Sort, ViewId};

/// A named, saveable snapshot of query and presentation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub id: ViewId,
    pub name: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sorts: Vec<Sort>,
    /// Visible column ids in display order; empty means all columns
    #[serde(default)]
    pub visible_columns: Vec<ColumnId>,
    #[serde(default)]
    pub column_widths: HashMap<ColumnId, f32>,
    /// Applied automatically when the table is opened
    #[serde(default)]
    pub is_default: bool,
}

impl TableView {
    pub fn new(id: impl Into<ViewId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            filters: Vec::new(),
            sorts: Vec::new(),
            visible_columns: Vec::new(),
            column_widths: HashMap::new(),
            is_default: false,
        }
    }
}
