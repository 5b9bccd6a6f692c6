use tabula_core::{CellValue, Column, ColumnType, Row};

/// Rows where any text, select or multi-select cell contains `query`
///
/// Matching is case-insensitive; select cells also match on their option
/// label. A blank query returns every row.
pub fn search_rows<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    query: &str,
    columns: &[Column],
) -> Vec<&'a Row> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows.into_iter().collect();
    }

    let searchable: Vec<&Column> = columns
        .iter()
        .filter(|c| {
            matches!(
                c.column_type,
                ColumnType::Text | ColumnType::Select | ColumnType::MultiSelect
            )
        })
        .collect();

    rows.into_iter()
        .filter(|row| {
            searchable.iter().any(|column| {
                row.get(&column.id)
                    .is_some_and(|value| cell_matches(value, column, &needle))
            })
        })
        .collect()
}

fn cell_matches(value: &CellValue, column: &Column, needle: &str) -> bool {
    let hit = |text: &str| text.to_lowercase().contains(needle);
    match value {
        CellValue::Select(id) => hit(id) || column.option_label(id).is_some_and(hit),
        CellValue::MultiSelect(ids) => ids
            .iter()
            .any(|id| hit(id) || column.option_label(id).is_some_and(hit)),
        other => hit(&other.display_text()),
    }
}
