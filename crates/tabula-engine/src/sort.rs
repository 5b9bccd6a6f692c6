//! Type-aware multi-key ordering

use std::cmp::Ordering;
use tabula_core::{CellValue, Column, ColumnType, Row, Sort, SortDirection};

use crate::natural::natural_cmp;
use crate::parse::{checkbox_of, number_of};
use crate::temporal::instant_of;

/// Order rows by the sort list, falling back to `position`
///
/// Returns a new ordering; the input is never reordered. Sorts on unknown
/// columns are skipped.
pub fn sort_rows<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    sorts: &[Sort],
    columns: &[Column],
) -> Vec<&'a Row> {
    let keys: Vec<(&str, ColumnType, SortDirection)> = sorts
        .iter()
        .filter_map(|sort| {
            let Some(column) = columns.iter().find(|c| c.id == sort.column_id) else {
                tracing::debug!(column_id = %sort.column_id, "skipping sort on unknown column");
                return None;
            };
            Some((column.id.as_str(), column.column_type, sort.direction))
        })
        .collect();

    let mut sorted: Vec<&'a Row> = rows.into_iter().collect();
    sorted.sort_by(|a, b| {
        keys.iter()
            .map(|(column_id, column_type, direction)| {
                let ord = compare_values(a.get(column_id), b.get(column_id), *column_type);
                match direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or_else(|| a.position.total_cmp(&b.position))
    });
    sorted
}

/// Compare two cells of a column of the given type
///
/// Absent and null values order after everything else.
pub fn compare_values(a: Option<&CellValue>, b: Option<&CellValue>, column_type: ColumnType) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    match column_type {
        ColumnType::Number => parsed_first(number_of(a), number_of(b), |x, y| x.total_cmp(y))
            .unwrap_or_else(|| compare_text(&a.display_text(), &b.display_text())),
        ColumnType::Date | ColumnType::DateTime => {
            parsed_first(instant_of(a), instant_of(b), |x, y| x.cmp(y))
                .unwrap_or_else(|| compare_text(&a.display_text(), &b.display_text()))
        }
        // true before false
        ColumnType::Checkbox => parsed_first(checkbox_of(a), checkbox_of(b), |x, y| y.cmp(x))
            .unwrap_or(Ordering::Equal),
        ColumnType::MultiSelect => compare_multi(a, b),
        ColumnType::Text | ColumnType::Select | ColumnType::UserLink | ColumnType::TableLink => {
            compare_text(&a.display_text(), &b.display_text())
        }
    }
}

/// Parsed values first; `None` when neither side parses
fn parsed_first<T>(
    a: Option<T>,
    b: Option<T>,
    cmp: impl FnOnce(&T, &T) -> Ordering,
) -> Option<Ordering> {
    match (a, b) {
        (Some(a), Some(b)) => Some(cmp(&a, &b)),
        (Some(_), None) => Some(Ordering::Less),
        (None, Some(_)) => Some(Ordering::Greater),
        (None, None) => None,
    }
}

/// Empty strings after non-empty ones, then natural order
fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => natural_cmp(a, b),
    }
}

fn compare_multi(a: &CellValue, b: &CellValue) -> Ordering {
    let items = |v: &CellValue| match v {
        CellValue::MultiSelect(items) => items.clone(),
        other => vec![other.display_text()],
    };
    let (a, b) = (items(a), items(b));
    let first_a = a.first().map(String::as_str).unwrap_or("");
    let first_b = b.first().map(String::as_str).unwrap_or("");
    compare_text(first_a, first_b).then_with(|| a.len().cmp(&b.len()))
}
