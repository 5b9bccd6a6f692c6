//! Tests for the command implementations

use super::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use tabula_core::CellValue;

const BOARD: &str = indoc! {r#"
    {
      "id": "board",
      "name": "Board",
      "columns": [
        {"id": "title", "name": "Title", "type": "text", "is_required": true},
        {"id": "status", "name": "Status", "type": "select",
         "config": {"options": [{"id": "todo", "label": "To do"}, {"id": "done", "label": "Done"}]}},
        {"id": "points", "name": "Points", "type": "text"},
        {"id": "notes", "name": "Notes", "type": "text"}
      ],
      "rows": [
        {"id": "r1", "data": {"title": "Write parser", "status": "todo", "points": "3", "notes": "needs tests"}},
        {"id": "r2", "data": {"title": "Ship release", "status": "done", "points": "8"}},
        {"id": "r3", "data": {"title": "Fix docs", "status": "todo", "points": "2"}}
      ],
      "views": [
        {"id": "v-open", "name": "Open",
         "filters": [{"id": "f1", "column_id": "status", "operator": "equals", "value": "todo"}],
         "visible_columns": ["title", "status"]}
      ]
    }
"#};

fn board_file() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.json");
    std::fs::write(&path, BOARD).unwrap();
    (dir, path)
}

fn order_of(output: &str, titles: &[&str]) -> Vec<usize> {
    titles
        .iter()
        .map(|t| output.find(t).unwrap_or_else(|| panic!("{} missing from\n{}", t, output)))
        .collect()
}

// ============================================================================
// show
// ============================================================================

#[tokio::test]
async fn test_show_lists_rows_in_position_order() {
    let (_dir, path) = board_file();
    let output = show(&path, TabulaSettings::default(), &ShowOptions::default())
        .await
        .unwrap();

    let positions = order_of(&output, &["Write parser", "Ship release", "Fix docs"]);
    assert!(positions.is_sorted());
    assert!(output.contains("To do"), "select ids render as labels");
    assert!(output.ends_with("3 of 3 rows"));
}

#[tokio::test]
async fn test_show_filters_sorts_and_limits() {
    let (_dir, path) = board_file();
    let options = ShowOptions {
        filters: vec!["Status:equals:todo".into()],
        sorts: vec!["points:desc".into()],
        limit: Some(1),
        ..Default::default()
    };
    let output = show(&path, TabulaSettings::default(), &options).await.unwrap();

    assert!(output.contains("Write parser"));
    assert!(!output.contains("Fix docs"));
    assert!(!output.contains("Ship release"));
    assert!(output.ends_with("1 of 3 rows (2 matched)"));
}

#[tokio::test]
async fn test_show_applies_named_view() {
    let (_dir, path) = board_file();
    let options = ShowOptions {
        view: Some("open".into()),
        ..Default::default()
    };
    let output = show(&path, TabulaSettings::default(), &options).await.unwrap();

    assert!(!output.contains("Ship release"));
    assert!(!output.contains("Points"), "view hides the points column");
    assert!(output.ends_with("2 of 3 rows"));

    let missing = ShowOptions {
        view: Some("Archive".into()),
        ..Default::default()
    };
    assert!(show(&path, TabulaSettings::default(), &missing).await.is_err());
}

#[tokio::test]
async fn test_show_search_respects_minimum_length() {
    let (_dir, path) = board_file();
    let options = ShowOptions {
        search: Some("ship".into()),
        ..Default::default()
    };
    let output = show(&path, TabulaSettings::default(), &options).await.unwrap();
    assert!(output.ends_with("1 of 3 rows"));

    let mut settings = TabulaSettings::default();
    settings.search.min_query_length = 5;
    let output = show(&path, settings, &options).await.unwrap();
    assert!(output.ends_with("3 of 3 rows"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn test_validate_clean_file() {
    let (_dir, path) = board_file();
    let report = validate(&path).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.render(), "3 rows checked, no problems found");
}

#[test]
fn test_validate_reports_each_bad_cell() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(
        &path,
        indoc! {r#"
            {
              "columns": [
                {"id": "title", "name": "Title", "type": "text", "is_required": true},
                {"id": "due", "name": "Due", "type": "date"}
              ],
              "rows": [
                {"id": "r1", "data": {"title": "", "due": "someday"}},
                {"id": "r2", "data": {"title": "ok", "due": "2024-05-01"}}
              ]
            }
        "#},
    )
    .unwrap();

    let report = validate(&path).unwrap();
    assert_eq!(
        report.problems,
        vec![
            ("r1".to_string(), "Title: Title is required".to_string()),
            ("r1".to_string(), "Due: must be a valid date".to_string()),
        ]
    );
    assert!(report.render().contains("2 problems in 2 rows checked"));
}

// ============================================================================
// convert and set
// ============================================================================

#[tokio::test]
async fn test_convert_dry_run_leaves_file_untouched() {
    let (_dir, path) = board_file();
    let message = convert(&path, TabulaSettings::default(), "Points", ColumnType::Number, false)
        .await
        .unwrap();
    assert_eq!(message, "Converted 3 values in Points to number (dry run, pass --write to save)");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), BOARD);
}

#[tokio::test]
async fn test_convert_with_write_saves_converted_values() {
    let (_dir, path) = board_file();
    convert(&path, TabulaSettings::default(), "points", ColumnType::Number, true)
        .await
        .unwrap();

    let saved = TableFile::read(&path).unwrap();
    assert_eq!(saved.columns[2].column_type, ColumnType::Number);
    assert_eq!(saved.rows[1].data["points"], serde_json::json!(8.0));
}

#[tokio::test]
async fn test_convert_reports_blocking_rows() {
    let (_dir, path) = board_file();
    let err = convert(&path, TabulaSettings::default(), "notes", ColumnType::Number, true)
        .await
        .unwrap_err()
        .to_string();
    assert!(err.contains("r1"), "{}", err);
    assert!(err.contains("1 values do not convert"), "{}", err);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), BOARD);
}

#[tokio::test]
async fn test_set_cell_commits_and_saves() {
    let (_dir, path) = board_file();
    let message = set_cell(&path, TabulaSettings::default(), "r3", "Status", "done", true)
        .await
        .unwrap();
    assert_eq!(message, "r3.status = done");

    let session = Session::open(&path, TabulaSettings::default()).await.unwrap();
    let store = session.store();
    assert_eq!(
        store.lock().row("r3").and_then(|r| r.get("status")).cloned(),
        Some(CellValue::Select("done".into()))
    );
}

#[tokio::test]
async fn test_set_cell_rejects_invalid_input() {
    let (_dir, path) = board_file();
    let err = set_cell(&path, TabulaSettings::default(), "r1", "status", "blocked", true)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("'blocked' is not a valid option"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), BOARD);
}
