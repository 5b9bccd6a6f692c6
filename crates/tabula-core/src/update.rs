//! Optimistic cell update bookkeeping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CellValue, ColumnId, RowId};

/// Composite key of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellKey {
    pub row_id: RowId,
    pub column_id: ColumnId,
}

impl CellKey {
    pub fn new(row_id: impl Into<RowId>, column_id: impl Into<ColumnId>) -> Self {
        Self {
            row_id: row_id.into(),
            column_id: column_id.into(),
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row_id, self.column_id)
    }
}

/// An edit applied locally but not yet confirmed durable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub row_id: RowId,
    pub column_id: ColumnId,
    pub value: CellValue,
    /// Cell content immediately before this edit
    pub previous_value: CellValue,
    pub timestamp: DateTime<Utc>,
}

impl CellUpdate {
    pub fn new(
        row_id: impl Into<RowId>,
        column_id: impl Into<ColumnId>,
        value: CellValue,
        previous_value: CellValue,
    ) -> Self {
        Self {
            row_id: row_id.into(),
            column_id: column_id.into(),
            value,
            previous_value,
            timestamp: Utc::now(),
        }
    }

    pub fn key(&self) -> CellKey {
        CellKey::new(self.row_id.clone(), self.column_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn keys_with_delimiters_do_not_collide() {
        // "a:b" + "c" and "a" + "b:c" render the same but are distinct keys
        let left = CellKey::new("a:b", "c");
        let right = CellKey::new("a", "b:c");
        assert_eq!(left.to_string(), right.to_string());
        assert_ne!(left, right);

        let mut map = HashMap::new();
        map.insert(left.clone(), 1);
        map.insert(right.clone(), 2);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&left], 1);
    }
}
