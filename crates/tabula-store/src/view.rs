//! Presentation state of the active table

use std::collections::HashMap;
use tabula_core::{Column, ColumnId, Filter, Sort, TableView};

/// Filters, sorts, visibility and widths, replaced as one unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub filters: Vec<Filter>,
    pub sorts: Vec<Sort>,
    /// Ids of the columns currently shown
    pub visible_column_ids: Vec<ColumnId>,
    pub column_widths: HashMap<ColumnId, f32>,
}

impl ViewState {
    /// Everything visible, nothing filtered or sorted
    pub fn all_columns(columns: &[Column]) -> Self {
        Self {
            visible_column_ids: columns.iter().map(|c| c.id.clone()).collect(),
            ..Self::default()
        }
    }

    /// State a view asks for, resolved against the current columns
    ///
    /// A view whose visible list is empty, or names none of the current
    /// columns, shows every column.
    pub fn from_view(view: &TableView, columns: &[Column]) -> Self {
        let known: Vec<ColumnId> = view
            .visible_columns
            .iter()
            .filter(|id| columns.iter().any(|c| &c.id == *id))
            .cloned()
            .collect();
        let visible_column_ids = if known.is_empty() {
            columns.iter().map(|c| c.id.clone()).collect()
        } else {
            known
        };

        Self {
            filters: view.filters.clone(),
            sorts: view.sorts.clone(),
            visible_column_ids,
            column_widths: view.column_widths.clone(),
        }
    }

    /// Snapshot the state as a new, non-default view
    pub fn capture(&self, name: impl Into<String>) -> TableView {
        TableView {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            filters: self.filters.clone(),
            sorts: self.sorts.clone(),
            visible_columns: self.visible_column_ids.clone(),
            column_widths: self.column_widths.clone(),
            is_default: false,
        }
    }

    pub fn is_visible(&self, column_id: &str) -> bool {
        self.visible_column_ids.iter().any(|id| id == column_id)
    }

    /// Forget every reference to a column
    pub(crate) fn drop_column(&mut self, column_id: &str) {
        self.filters.retain(|f| f.column_id != column_id);
        self.sorts.retain(|s| s.column_id != column_id);
        self.visible_column_ids.retain(|id| id != column_id);
        self.column_widths.remove(column_id);
    }
}
