//! Table backend over a single JSON file
//!
//! The file holds columns, views and rows whose cell data is raw JSON.
//! Rows are coerced through the cell validator on load; edits and column
//! migrations are applied to the in-memory document and reach disk only
//! through [`JsonFileBackend::save`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::path::{Path, PathBuf};
use tabula_core::{
    CellValue, CellWriter, Column, ColumnMigrationWriter, ColumnType, Result, Row, RowId,
    TableLoader, TableSnapshot, TableSummary, TableView, TabulaError,
};
use tabula_engine::{validate_row_data, RowValidation};

/// On-disk shape of a table file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<RawRow>,
    #[serde(default)]
    pub views: Vec<TableView>,
}

/// A row whose cells have not been validated yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    pub id: RowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(default)]
    pub data: Map<String, Json>,
}

impl TableFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate every row, pairing each with its result
    pub fn validate(&self) -> Vec<(&RawRow, RowValidation)> {
        self.rows
            .iter()
            .map(|row| (row, validate_row_data(&row.data, &self.columns)))
            .collect()
    }
}

pub struct JsonFileBackend {
    path: PathBuf,
    table_id: String,
    table_name: String,
    document: Mutex<TableFile>,
}

impl JsonFileBackend {
    /// Open a table file; the file stem names the table unless the file does
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = TableFile::read(&path)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("table")
            .to_string();
        let table_id = document.id.clone().unwrap_or_else(|| stem.clone());
        let table_name = document.name.clone().unwrap_or(stem);
        tracing::debug!(path = %path.display(), table_id = %table_id, "opened table file");
        Ok(Self {
            path,
            table_id,
            table_name,
            document: Mutex::new(document),
        })
    }

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Write the in-memory document back to its file
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&*self.document.lock())?;
        std::fs::write(&self.path, content)?;
        tracing::info!(path = %self.path.display(), "saved table file");
        Ok(())
    }
}

#[async_trait]
impl TableLoader for JsonFileBackend {
    async fn list_tables(&self) -> Result<Vec<TableSummary>> {
        let mut summary = TableSummary::new(self.table_id.clone(), self.table_name.clone());
        if let Ok(modified) = std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            summary.updated_at = modified.into();
        }
        Ok(vec![summary])
    }

    async fn load_table(&self, table_id: &str) -> Result<TableSnapshot> {
        if table_id != self.table_id {
            return Err(TabulaError::NotFound(table_id.to_string()));
        }
        let document = self.document.lock();

        let mut rows = Vec::with_capacity(document.rows.len());
        for (index, (raw, validation)) in document.validate().into_iter().enumerate() {
            if let Some((_, err)) = validation.errors.iter().next() {
                return Err(TabulaError::Persistence(format!(
                    "row {} has invalid data ({}); run `tabula validate` for details",
                    raw.id, err
                )));
            }
            let mut row = Row::new(raw.id.clone(), raw.position.unwrap_or((index + 1) as f64));
            row.data = validation.coerced;
            row.data.retain(|_, value| !value.is_null());
            rows.push(row);
        }

        Ok(TableSnapshot {
            columns: document.columns.clone(),
            rows,
            views: document.views.clone(),
        })
    }
}

fn store_raw(data: &mut Map<String, Json>, column_id: &str, value: &CellValue) {
    if value.is_null() {
        data.remove(column_id);
    } else {
        data.insert(column_id.to_string(), value.to_json());
    }
}

#[async_trait]
impl CellWriter for JsonFileBackend {
    async fn write_cell(&self, row_id: &str, column_id: &str, value: &CellValue) -> Result<()> {
        let mut document = self.document.lock();
        let row = document
            .rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| TabulaError::NotFound(format!("row {}", row_id)))?;
        store_raw(&mut row.data, column_id, value);
        Ok(())
    }
}

#[async_trait]
impl ColumnMigrationWriter for JsonFileBackend {
    async fn migrate_column(
        &self,
        column_id: &str,
        to: ColumnType,
        values: &[(RowId, CellValue)],
    ) -> Result<()> {
        let mut document = self.document.lock();
        let column = document
            .columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| TabulaError::NotFound(format!("column {}", column_id)))?;
        column.column_type = to;

        for (row_id, value) in values {
            if let Some(row) = document.rows.iter_mut().find(|r| &r.id == row_id) {
                store_raw(&mut row.data, column_id, value);
            }
        }
        tracing::debug!(column_id = %column_id, to = %to, "migrated column in document");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    const TASKS: &str = indoc! {r#"
        {
          "name": "Tasks",
          "columns": [
            {"id": "title", "name": "Title", "type": "text", "is_required": true},
            {"id": "done", "name": "Done", "type": "checkbox"},
            {"id": "estimate", "name": "Estimate", "type": "text"}
          ],
          "rows": [
            {"id": "r1", "data": {"title": "Plan", "done": "yes", "estimate": "2"}},
            {"id": "r2", "position": 0.5, "data": {"title": "Build", "estimate": ""}}
          ]
        }
    "#};

    fn write_file(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn test_load_coerces_raw_cells() {
        let (_dir, path) = write_file(TASKS);
        let backend = JsonFileBackend::open(&path).unwrap();
        assert_eq!(backend.table_id(), "tasks");

        let tables = backend.list_tables().await.unwrap();
        assert_eq!(tables[0].name, "Tasks");

        let snapshot = backend.load_table("tasks").await.unwrap();
        assert_eq!(snapshot.rows[0].get("done"), Some(&CellValue::Checkbox(true)));
        assert_eq!(snapshot.rows[0].position, 1.0);
        assert_eq!(snapshot.rows[1].position, 0.5);
        assert_eq!(snapshot.rows[1].get("estimate"), None);
        assert!(backend.load_table("other").await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_rows_fail_the_load() {
        let (_dir, path) = write_file(indoc! {r#"
            {
              "columns": [{"id": "done", "name": "Done", "type": "checkbox"}],
              "rows": [{"id": "r1", "data": {"done": "perhaps"}}]
            }
        "#});
        let backend = JsonFileBackend::open(&path).unwrap();
        let err = backend.load_table("tasks").await.unwrap_err();
        assert!(err.to_string().contains("row r1"), "{}", err);
    }

    #[tokio::test]
    async fn test_migration_and_writes_reach_disk_on_save() {
        let (_dir, path) = write_file(TASKS);
        let backend = JsonFileBackend::open(&path).unwrap();

        backend
            .migrate_column(
                "estimate",
                ColumnType::Number,
                &[("r1".into(), CellValue::Number(2.0)), ("r2".into(), CellValue::Null)],
            )
            .await
            .unwrap();
        backend
            .write_cell("r2", "done", &CellValue::Checkbox(false))
            .await
            .unwrap();
        assert!(backend.write_cell("r9", "done", &CellValue::Null).await.is_err());

        // Nothing written until saved
        assert_eq!(TableFile::read(&path).unwrap().columns[2].column_type, ColumnType::Text);
        backend.save().unwrap();

        let saved = TableFile::read(&path).unwrap();
        assert_eq!(saved.columns[2].column_type, ColumnType::Number);
        assert_eq!(saved.rows[0].data["estimate"], serde_json::json!(2.0));
        assert!(!saved.rows[1].data.contains_key("estimate"));
        assert_eq!(saved.rows[1].data["done"], serde_json::json!(false));
    }
}
