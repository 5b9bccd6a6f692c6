//! Sort list editing helpers

use tabula_core::{Sort, SortDirection};

/// Cycle a column through none, ascending and descending
///
/// The result only ever holds the toggled column.
pub fn toggle_sort(sorts: &[Sort], column_id: &str) -> Vec<Sort> {
    let current = sorts
        .iter()
        .find(|s| s.column_id == column_id)
        .map(|s| s.direction);
    match current {
        None => vec![Sort::asc(column_id)],
        Some(SortDirection::Asc) => vec![Sort::desc(column_id)],
        Some(SortDirection::Desc) => Vec::new(),
    }
}

/// Replace the whole list with one column
pub fn set_single_sort(column_id: &str, direction: SortDirection) -> Vec<Sort> {
    vec![Sort {
        column_id: column_id.to_string(),
        direction,
    }]
}

/// Insert or update a column's sort and make it the lowest-priority key
pub fn add_sort(sorts: &[Sort], column_id: &str, direction: SortDirection) -> Vec<Sort> {
    let mut next = remove_sort(sorts, column_id);
    next.push(Sort {
        column_id: column_id.to_string(),
        direction,
    });
    next
}

pub fn remove_sort(sorts: &[Sort], column_id: &str) -> Vec<Sort> {
    sorts
        .iter()
        .filter(|s| s.column_id != column_id)
        .cloned()
        .collect()
}
