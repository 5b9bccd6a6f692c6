//! Persistence contracts
//!
//! The engine never talks to a database itself. These traits describe the
//! collaborators that load a table, commit single-cell edits, and persist
//! column type migrations. Implementations decide transport and storage.

use async_trait::async_trait;

use crate::{CellValue, ColumnType, Result, RowId, TableSnapshot, TableSummary};

/// Loads tables from durable storage
#[async_trait]
pub trait TableLoader: Send + Sync {
    /// List the tables available to the current workspace
    async fn list_tables(&self) -> Result<Vec<TableSummary>>;

    /// Load a table's columns, rows and views
    ///
    /// The returned snapshot is the sole source of truth at load time.
    async fn load_table(&self, table_id: &str) -> Result<TableSnapshot>;
}

/// Commits single-cell edits
#[async_trait]
pub trait CellWriter: Send + Sync {
    /// Durably write one cell
    ///
    /// Only success or failure matters to the caller; the error reason is
    /// logged but never inspected.
    async fn write_cell(&self, row_id: &str, column_id: &str, value: &CellValue) -> Result<()>;
}

/// Persists a column type change together with every converted value
#[async_trait]
pub trait ColumnMigrationWriter: Send + Sync {
    /// Persist the new column type and the converted cell values
    ///
    /// Callers guarantee every value in `values` was produced by a permitted
    /// conversion; the set covers every row of the table.
    async fn migrate_column(
        &self,
        column_id: &str,
        to: ColumnType,
        values: &[(RowId, CellValue)],
    ) -> Result<()>;
}

/// A backend that implements every persistence contract
pub trait TableBackend: TableLoader + CellWriter + ColumnMigrationWriter {}

impl<T> TableBackend for T where T: TableLoader + CellWriter + ColumnMigrationWriter {}
