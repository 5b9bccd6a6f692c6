//! Terminal rendering of rows

use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use tabula_core::{CellValue, Column, ColumnType, Row};

/// Text shown for one cell; option ids render as their labels
pub fn cell_text(column: &Column, value: Option<&CellValue>) -> String {
    match value {
        Some(CellValue::Select(id)) => column.option_label(id).unwrap_or(id).to_string(),
        Some(CellValue::MultiSelect(ids)) => ids
            .iter()
            .map(|id| column.option_label(id).unwrap_or(id))
            .collect::<Vec<_>>()
            .join(", "),
        Some(CellValue::Checkbox(true)) => "✓".to_string(),
        Some(CellValue::Checkbox(false)) => String::new(),
        Some(other) => other.display_text(),
        None => String::new(),
    }
}

/// Render rows as a table with one column per visible column
pub fn render_rows(columns: &[&Column], rows: &[&Row]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(|c| Cell::new(&c.name)));

    for row in rows {
        table.add_row(columns.iter().map(|column| {
            let cell = Cell::new(cell_text(column, row.get(&column.id)));
            match column.column_type {
                ColumnType::Number => cell.set_alignment(CellAlignment::Right),
                ColumnType::Checkbox => cell.set_alignment(CellAlignment::Center),
                _ => cell,
            }
        }));
    }

    table.to_string()
}

/// Two-column table of free-form findings
pub fn render_pairs(header: [&str; 2], pairs: &[(String, String)]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for (left, right) in pairs {
        table.add_row([left, right]);
    }
    table.to_string()
}
