//! Edit service
//!
//! Bridges the store and a persistence backend. Cell edits are applied to
//! the store before the backend confirms them and rolled back when it
//! refuses. Column type changes are checked row by row up front and only
//! reach the backend when every value converts.

use parking_lot::Mutex;
use serde_json::Value as Json;
use std::sync::Arc;
use tabula_core::{CellKey, CellValue, ColumnType, TableBackend};
use tabula_engine::{plan_column_conversion, validate_cell_value, ColumnConversionError};

use crate::error::{StoreError, StoreResult};
use crate::store::TableStore;

/// How an optimistic edit ended
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// The backend accepted the value
    Committed(CellValue),
    /// The backend refused; the cell holds its previous value again
    Reverted(CellValue),
    /// The active table changed before the backend answered
    Discarded,
    /// A later edit of the same cell was queued before the backend answered;
    /// that edit's outcome decides the cell
    Superseded,
}

/// Service for edits that must reach durable storage
///
/// Handles:
/// - Loading the tables list and the active table
/// - Optimistic cell edits with rollback on failure
/// - All-or-nothing column type migrations
pub struct TableEditService {
    store: Arc<Mutex<TableStore>>,
    backend: Arc<dyn TableBackend>,
}

impl TableEditService {
    pub fn new(store: Arc<Mutex<TableStore>>, backend: Arc<dyn TableBackend>) -> Self {
        Self { store, backend }
    }

    /// Shared handle to the store this service mutates
    pub fn store(&self) -> Arc<Mutex<TableStore>> {
        Arc::clone(&self.store)
    }

    /// Reload the tables list from the backend
    #[tracing::instrument(skip(self))]
    pub async fn refresh_tables(&self) -> StoreResult<usize> {
        let tables = self.backend.list_tables().await?;
        let count = tables.len();
        self.store.lock().set_tables(tables);
        tracing::info!(count, "refreshed tables list");
        Ok(count)
    }

    /// Make a table active and install its snapshot
    ///
    /// Returns `false` when another table was opened while this one loaded.
    #[tracing::instrument(skip(self))]
    pub async fn open_table(&self, table_id: &str) -> StoreResult<bool> {
        let generation = {
            let mut store = self.store.lock();
            store.set_active_table(table_id);
            store.generation()
        };

        let snapshot = self.backend.load_table(table_id).await?;

        let mut store = self.store.lock();
        if store.generation() != generation {
            tracing::warn!(table_id = %table_id, "discarding snapshot for a table that is no longer active");
            return Ok(false);
        }
        store.load_snapshot(snapshot)?;
        Ok(true)
    }

    /// Validate, apply optimistically, then commit a single cell
    ///
    /// Invalid input fails with [`StoreError::InvalidValue`] and leaves the
    /// store untouched.
    #[tracing::instrument(skip(self, raw))]
    pub async fn edit_cell(
        &self,
        row_id: &str,
        column_id: &str,
        raw: &Json,
    ) -> StoreResult<EditOutcome> {
        let (value, queued, generation) = {
            let mut store = self.store.lock();
            if store.active_table_id().is_none() {
                return Err(StoreError::NoActiveTable);
            }
            let column = store
                .column(column_id)
                .cloned()
                .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))?;
            if store.row(row_id).is_none() {
                return Err(StoreError::RowNotFound(row_id.to_string()));
            }
            if store.is_column_migrating(column_id) {
                return Err(StoreError::ColumnBusy(column_id.to_string()));
            }
            let value = validate_cell_value(raw, &column)
                .into_result()
                .map_err(StoreError::InvalidValue)?;

            let previous = store.update_cell(row_id, column_id, value.clone())?;
            let key = store.queue_cell_update(row_id, column_id, value.clone(), previous);
            let queued = store.pending_update(&key).cloned();
            (value, queued, store.generation())
        };

        let result = self.backend.write_cell(row_id, column_id, &value).await;

        let mut store = self.store.lock();
        if store.generation() != generation {
            tracing::warn!("discarding commit outcome for a table that is no longer active");
            return Ok(EditOutcome::Discarded);
        }

        let key = CellKey::new(row_id, column_id);
        if store.pending_update(&key).cloned() != queued {
            // A later edit of the same cell owns the queue entry now
            tracing::debug!(committed = result.is_ok(), "outcome superseded by a later edit");
            return Ok(EditOutcome::Superseded);
        }

        match result {
            Ok(()) => {
                store.complete_cell_update(&key);
                tracing::info!("committed cell update");
                Ok(EditOutcome::Committed(value))
            }
            Err(err) => {
                tracing::warn!(error = %err, "cell update failed");
                let restored = store
                    .revert_cell_update(&key)
                    .map(|u| u.previous_value)
                    .unwrap_or_default();
                Ok(EditOutcome::Reverted(restored))
            }
        }
    }

    /// Change a column's type, converting every value or none
    #[tracing::instrument(skip(self))]
    pub async fn change_column_type(&self, column_id: &str, to: ColumnType) -> StoreResult<usize> {
        let (plan, generation) = {
            let mut store = self.store.lock();
            if store.active_table_id().is_none() {
                return Err(StoreError::NoActiveTable);
            }
            let column = store
                .column(column_id)
                .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))?;
            let from = column.column_type;

            let plan = plan_column_conversion(store.rows(), column_id, from, to).map_err(|err| {
                let rows = match err {
                    ColumnConversionError::NotPermitted(_) => Vec::new(),
                    ColumnConversionError::Blocked(rows) => rows,
                };
                tracing::warn!(from = %from, blocked = rows.len(), "column conversion refused");
                StoreError::ConversionNotPermitted {
                    column_id: column_id.to_string(),
                    from,
                    to,
                    rows,
                }
            })?;
            // Edits to the column are refused until the migration settles
            store.begin_column_migration(column_id)?;
            (plan, store.generation())
        };

        let result = self.backend.migrate_column(column_id, to, &plan.values).await;

        let mut store = self.store.lock();
        if let Err(err) = result {
            if store.generation() == generation {
                store.end_column_migration(column_id);
            }
            return Err(err.into());
        }
        if store.generation() != generation {
            tracing::warn!("discarding column migration for a table that is no longer active");
            return Ok(0);
        }
        store.apply_column_migration(&plan)?;
        Ok(plan.values.len())
    }
}
