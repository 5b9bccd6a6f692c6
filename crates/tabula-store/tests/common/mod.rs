//! Common test utilities and mocks

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_core::{
    CellValue, CellWriter, Column, ColumnMigrationWriter, ColumnType, Result, Row, RowId,
    SelectOption, TableLoader, TableSnapshot, TableSummary, TabulaError,
};
use tokio::sync::Notify;

/// A recorded call to `migrate_column`
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationCall {
    pub column_id: String,
    pub to: ColumnType,
    pub values: Vec<(RowId, CellValue)>,
}

/// In-memory backend for testing the edit service without real storage.
///
/// Writes and migrations are logged for assertions; failures are switched
/// on with the `with_*_failure` builders. Write and migration gates hold
/// every matching call until the test releases it.
pub struct MockBackend {
    pub tables: Vec<TableSummary>,
    pub snapshots: HashMap<String, TableSnapshot>,
    pub fail_writes: bool,
    pub fail_migrations: bool,
    pub write_gate: Option<Arc<Notify>>,
    pub migration_gate: Option<Arc<Notify>>,
    pub write_log: Arc<Mutex<Vec<(String, String, CellValue)>>>,
    pub migration_log: Arc<Mutex<Vec<MigrationCall>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            snapshots: HashMap::new(),
            fail_writes: false,
            fail_migrations: false,
            write_gate: None,
            migration_gate: None,
            write_log: Arc::new(Mutex::new(Vec::new())),
            migration_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_table(mut self, table: TableSummary, snapshot: TableSnapshot) -> Self {
        self.snapshots.insert(table.id.clone(), snapshot);
        self.tables.push(table);
        self
    }

    pub fn with_write_failure(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn with_migration_failure(mut self) -> Self {
        self.fail_migrations = true;
        self
    }

    pub fn with_write_gate(mut self, gate: Arc<Notify>) -> Self {
        self.write_gate = Some(gate);
        self
    }

    pub fn with_migration_gate(mut self, gate: Arc<Notify>) -> Self {
        self.migration_gate = Some(gate);
        self
    }

    pub fn writes(&self) -> Vec<(String, String, CellValue)> {
        self.write_log.lock().clone()
    }

    pub fn migrations(&self) -> Vec<MigrationCall> {
        self.migration_log.lock().clone()
    }
}

#[async_trait]
impl TableLoader for MockBackend {
    async fn list_tables(&self) -> Result<Vec<TableSummary>> {
        Ok(self.tables.clone())
    }

    async fn load_table(&self, table_id: &str) -> Result<TableSnapshot> {
        self.snapshots
            .get(table_id)
            .cloned()
            .ok_or_else(|| TabulaError::NotFound(table_id.to_string()))
    }
}

#[async_trait]
impl CellWriter for MockBackend {
    async fn write_cell(&self, row_id: &str, column_id: &str, value: &CellValue) -> Result<()> {
        if let Some(gate) = &self.write_gate {
            gate.notified().await;
        }
        self.write_log
            .lock()
            .push((row_id.to_string(), column_id.to_string(), value.clone()));
        if self.fail_writes {
            return Err(TabulaError::Persistence("write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ColumnMigrationWriter for MockBackend {
    async fn migrate_column(
        &self,
        column_id: &str,
        to: ColumnType,
        values: &[(RowId, CellValue)],
    ) -> Result<()> {
        if let Some(gate) = &self.migration_gate {
            gate.notified().await;
        }
        if self.fail_migrations {
            return Err(TabulaError::Persistence("migration rejected".to_string()));
        }
        self.migration_log.lock().push(MigrationCall {
            column_id: column_id.to_string(),
            to,
            values: values.to_vec(),
        });
        Ok(())
    }
}

/// A small task table: title, priority (select), estimate (text)
pub fn tasks_snapshot() -> TableSnapshot {
    TableSnapshot {
        columns: vec![
            Column::new("title", "Title", ColumnType::Text).required(),
            Column::new("priority", "Priority", ColumnType::Select).with_options(vec![
                SelectOption::new("low", "Low"),
                SelectOption::new("medium", "Medium"),
                SelectOption::new("high", "High"),
            ]),
            Column::new("estimate", "Estimate", ColumnType::Text),
        ],
        rows: vec![
            Row::new("r1", 1.0)
                .with("title", CellValue::Text("Write tests".into()))
                .with("priority", CellValue::Select("high".into()))
                .with("estimate", CellValue::Text("3".into())),
            Row::new("r2", 2.0).with("title", CellValue::Text("Review".into())),
            Row::new("r3", 3.0)
                .with("title", CellValue::Text("Ship".into()))
                .with("priority", CellValue::Select("low".into()))
                .with("estimate", CellValue::Text("1,500".into())),
        ],
        views: Vec::new(),
    }
}

pub fn other_snapshot() -> TableSnapshot {
    TableSnapshot {
        columns: vec![Column::new("name", "Name", ColumnType::Text)],
        rows: vec![Row::new("x1", 1.0).with("name", CellValue::Text("only".into()))],
        views: Vec::new(),
    }
}

pub fn backend() -> MockBackend {
    MockBackend::new()
        .with_table(TableSummary::new("tasks", "Tasks"), tasks_snapshot())
        .with_table(TableSummary::new("other", "Other"), other_snapshot())
}
