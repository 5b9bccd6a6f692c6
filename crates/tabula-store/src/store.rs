//! Table state store
//!
//! The only stateful component of the engine. It holds the tables list and
//! the active table's columns, rows, views and presentation state, plus the
//! queue of optimistic edits. Everything it derives goes through the pure
//! functions of `tabula_engine`.

use indexmap::IndexSet;
use tabula_core::{
    CellKey, CellUpdate, CellValue, Column, ColumnId, Filter, Row, RowId, SelectOption, Sort,
    SortDirection, TableId, TableSnapshot, TableSummary, TableView, ViewId,
};
use tabula_engine::{filter_rows_at, search_rows, sort_rows, ConversionPlan, FilterContext};

use crate::error::{StoreError, StoreResult};
use crate::pending::PendingUpdates;
use crate::settings::TabulaSettings;
use crate::view::ViewState;

/// In-memory state of the tables list and the active table
#[derive(Debug, Default)]
pub struct TableStore {
    settings: TabulaSettings,
    tables: Vec<TableSummary>,

    active_table_id: Option<TableId>,
    generation: u64,
    columns: Vec<Column>,
    rows: Vec<Row>,
    views: Vec<TableView>,
    active_view_id: Option<ViewId>,
    view_state: ViewState,
    search_query: String,
    selection: IndexSet<RowId>,
    editing_cell: Option<CellKey>,
    pending: PendingUpdates,
    /// Columns whose type change is waiting on the backend
    migrating: IndexSet<ColumnId>,
}

impl TableStore {
    pub fn new(settings: TabulaSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &TabulaSettings {
        &self.settings
    }

    // ========================================================================
    // Tables list
    // ========================================================================

    pub fn tables(&self) -> &[TableSummary] {
        &self.tables
    }

    pub fn table(&self, table_id: &str) -> Option<&TableSummary> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    pub fn set_tables(&mut self, tables: Vec<TableSummary>) {
        tracing::debug!(count = tables.len(), "replacing tables list");
        self.tables = tables;
    }

    pub fn add_table(&mut self, table: TableSummary) -> StoreResult<()> {
        if self.table(&table.id).is_some() {
            return Err(StoreError::DuplicateId(table.id));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn update_table(&mut self, table: TableSummary) -> StoreResult<()> {
        let slot = self
            .tables
            .iter_mut()
            .find(|t| t.id == table.id)
            .ok_or_else(|| StoreError::TableNotFound(table.id.clone()))?;
        *slot = table;
        Ok(())
    }

    /// Remove a table from the list; removing the active table resets it
    pub fn remove_table(&mut self, table_id: &str) -> StoreResult<TableSummary> {
        let index = self
            .tables
            .iter()
            .position(|t| t.id == table_id)
            .ok_or_else(|| StoreError::TableNotFound(table_id.to_string()))?;
        if self.active_table_id.as_deref() == Some(table_id) {
            self.reset_active_table();
        }
        Ok(self.tables.remove(index))
    }

    // ========================================================================
    // Active table
    // ========================================================================

    pub fn active_table_id(&self) -> Option<&str> {
        self.active_table_id.as_deref()
    }

    /// Counter bumped by every reset
    ///
    /// Asynchronous callers record it before awaiting and drop their result
    /// if it changed in the meantime.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch the active table; a different id resets all table-scoped state
    pub fn set_active_table(&mut self, table_id: impl Into<TableId>) {
        let table_id = table_id.into();
        if self.active_table_id.as_deref() == Some(table_id.as_str()) {
            return;
        }
        self.reset_active_table();
        tracing::debug!(table_id = %table_id, "active table changed");
        self.active_table_id = Some(table_id);
    }

    /// Install a freshly loaded snapshot as the active table's data
    ///
    /// Every column starts visible; a view flagged as default is applied.
    pub fn load_snapshot(&mut self, snapshot: TableSnapshot) -> StoreResult<()> {
        let table_id = self.active_table_id.clone().ok_or(StoreError::NoActiveTable)?;
        self.clear_table_state();

        let TableSnapshot {
            columns,
            mut rows,
            views,
        } = snapshot;
        rows.sort_by(|a, b| a.position.total_cmp(&b.position));

        self.view_state = ViewState::all_columns(&columns);
        self.columns = columns;
        self.rows = rows;
        self.views = views;

        if let Some(default_view) = self.views.iter().find(|v| v.is_default).cloned() {
            self.apply_view(&default_view);
        }

        tracing::info!(
            table_id = %table_id,
            columns = self.columns.len(),
            rows = self.rows.len(),
            views = self.views.len(),
            "loaded table"
        );
        Ok(())
    }

    /// Release every piece of table-scoped state at once
    ///
    /// The tables list is kept.
    pub fn reset_active_table(&mut self) {
        self.clear_table_state();
        self.active_table_id = None;
    }

    fn clear_table_state(&mut self) {
        self.generation += 1;
        self.columns.clear();
        self.rows.clear();
        self.views.clear();
        self.active_view_id = None;
        self.view_state = ViewState::default();
        self.search_query.clear();
        self.selection.clear();
        self.editing_cell = None;
        if !self.pending.is_empty() {
            tracing::warn!(
                pending = self.pending.len(),
                "discarding pending cell updates on reset"
            );
        }
        self.pending.clear();
        self.migrating.clear();
    }

    // ========================================================================
    // Columns
    // ========================================================================

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    fn column_mut(&mut self, column_id: &str) -> StoreResult<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.id == column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))
    }

    /// Append a column; it starts visible
    pub fn add_column(&mut self, column: Column) -> StoreResult<()> {
        if self.column(&column.id).is_some() {
            return Err(StoreError::DuplicateId(column.id));
        }
        self.view_state.visible_column_ids.push(column.id.clone());
        self.columns.push(column);
        Ok(())
    }

    pub fn rename_column(&mut self, column_id: &str, name: impl Into<String>) -> StoreResult<()> {
        self.column_mut(column_id)?.name = name.into();
        Ok(())
    }

    pub fn set_column_required(&mut self, column_id: &str, is_required: bool) -> StoreResult<()> {
        self.column_mut(column_id)?.is_required = is_required;
        Ok(())
    }

    /// Replace the option set of a select or multi-select column
    pub fn set_column_options(
        &mut self,
        column_id: &str,
        options: Vec<SelectOption>,
    ) -> StoreResult<()> {
        let column = self.column_mut(column_id)?;
        if !column.column_type.has_options() {
            return Err(StoreError::InvalidValue(tabula_engine::ValidationError::new(
                column.name.clone(),
                format!("{} columns have no options", column.column_type),
            )));
        }
        column.config.get_or_insert_with(Default::default).options = options;
        Ok(())
    }

    /// Remove a column and every reference to it
    pub fn remove_column(&mut self, column_id: &str) -> StoreResult<Column> {
        let index = self
            .columns
            .iter()
            .position(|c| c.id == column_id)
            .ok_or_else(|| StoreError::ColumnNotFound(column_id.to_string()))?;
        let column = self.columns.remove(index);

        self.view_state.drop_column(column_id);
        for row in &mut self.rows {
            row.remove(column_id);
        }
        self.pending.drop_column(column_id);
        self.migrating.shift_remove(column_id);
        if self
            .editing_cell
            .as_ref()
            .is_some_and(|cell| cell.column_id == column_id)
        {
            self.editing_cell = None;
        }
        tracing::debug!(column_id = %column_id, "removed column");
        Ok(column)
    }

    /// Reorder columns to follow `ordered_ids`; unlisted columns keep their
    /// relative order after the listed ones
    pub fn reorder_columns(&mut self, ordered_ids: &[ColumnId]) -> StoreResult<()> {
        if let Some(unknown) = ordered_ids.iter().find(|id| self.column(id).is_none()) {
            return Err(StoreError::ColumnNotFound(unknown.clone()));
        }
        let rank = |id: &str| {
            ordered_ids
                .iter()
                .position(|o| o == id)
                .unwrap_or(ordered_ids.len())
        };
        self.columns.sort_by_key(|c| rank(&c.id));
        Ok(())
    }

    /// Commit a column type change: new type plus every converted value
    ///
    /// This is the only path that changes a column's type.
    /// Claim a column for a type change
    ///
    /// Fails with [`StoreError::ColumnBusy`] while the column has pending
    /// edits or another migration in flight. Until the migration is applied
    /// or abandoned, edits to the column are refused.
    pub fn begin_column_migration(&mut self, column_id: &str) -> StoreResult<()> {
        if self.column(column_id).is_none() {
            return Err(StoreError::ColumnNotFound(column_id.to_string()));
        }
        if self.migrating.contains(column_id)
            || self.pending.iter().any(|u| u.column_id == column_id)
        {
            return Err(StoreError::ColumnBusy(column_id.to_string()));
        }
        self.migrating.insert(column_id.to_string());
        Ok(())
    }

    /// Release a column claimed by [`begin_column_migration`](Self::begin_column_migration)
    pub fn end_column_migration(&mut self, column_id: &str) -> bool {
        self.migrating.shift_remove(column_id)
    }

    pub fn is_column_migrating(&self, column_id: &str) -> bool {
        self.migrating.contains(column_id)
    }

    pub fn apply_column_migration(&mut self, plan: &ConversionPlan) -> StoreResult<()> {
        self.migrating.shift_remove(&plan.column_id);
        let column = self.column_mut(&plan.column_id)?;
        column.column_type = plan.to;

        for (row_id, value) in &plan.values {
            if let Some(row) = self.rows.iter_mut().find(|r| &r.id == row_id) {
                write_cell(row, &plan.column_id, value.clone());
            }
        }
        self.pending.drop_column(&plan.column_id);
        tracing::info!(
            column_id = %plan.column_id,
            from = %plan.from,
            to = %plan.to,
            rows = plan.values.len(),
            "applied column migration"
        );
        Ok(())
    }

    // ========================================================================
    // Rows
    // ========================================================================

    /// Canonical rows, in `position` order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == row_id)
    }

    fn row_mut(&mut self, row_id: &str) -> StoreResult<&mut Row> {
        self.rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| StoreError::RowNotFound(row_id.to_string()))
    }

    pub fn add_row(&mut self, row: Row) -> StoreResult<()> {
        if self.row(&row.id).is_some() {
            return Err(StoreError::DuplicateId(row.id));
        }
        let index = self.rows.partition_point(|r| r.position <= row.position);
        self.rows.insert(index, row);
        Ok(())
    }

    /// Remove rows by id, returning the ones that existed
    pub fn remove_rows(&mut self, row_ids: &[RowId]) -> Vec<Row> {
        let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut self.rows)
            .into_iter()
            .partition(|r| row_ids.contains(&r.id));
        self.rows = kept;

        for row in &removed {
            self.selection.shift_remove(&row.id);
            self.pending.drop_row(&row.id);
            if self
                .editing_cell
                .as_ref()
                .is_some_and(|cell| cell.row_id == row.id)
            {
                self.editing_cell = None;
            }
        }
        removed
    }

    /// Give a row a new default-order position
    pub fn move_row(&mut self, row_id: &str, position: f64) -> StoreResult<()> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id == row_id)
            .ok_or_else(|| StoreError::RowNotFound(row_id.to_string()))?;
        let mut row = self.rows.remove(index);
        row.position = position;
        let index = self.rows.partition_point(|r| r.position <= position);
        self.rows.insert(index, row);
        Ok(())
    }

    /// Write a cell immediately, returning the value it replaced
    pub fn update_cell(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: CellValue,
    ) -> StoreResult<CellValue> {
        if self.column(column_id).is_none() {
            return Err(StoreError::ColumnNotFound(column_id.to_string()));
        }
        let row = self.row_mut(row_id)?;
        Ok(write_cell(row, column_id, value))
    }

    // ========================================================================
    // Filters
    // ========================================================================

    pub fn filters(&self) -> &[Filter] {
        &self.view_state.filters
    }

    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.view_state.filters = filters;
    }

    pub fn add_filter(&mut self, filter: Filter) -> StoreResult<()> {
        if self.view_state.filters.iter().any(|f| f.id == filter.id) {
            return Err(StoreError::DuplicateId(filter.id));
        }
        self.view_state.filters.push(filter);
        Ok(())
    }

    /// Replace the filter with the same id; `false` when there is none
    pub fn update_filter(&mut self, filter: Filter) -> bool {
        match self.view_state.filters.iter_mut().find(|f| f.id == filter.id) {
            Some(slot) => {
                *slot = filter;
                true
            }
            None => false,
        }
    }

    pub fn remove_filter(&mut self, filter_id: &str) -> Option<Filter> {
        let index = self
            .view_state
            .filters
            .iter()
            .position(|f| f.id == filter_id)?;
        Some(self.view_state.filters.remove(index))
    }

    pub fn clear_filters(&mut self) {
        self.view_state.filters.clear();
    }

    // ========================================================================
    // Sorts
    // ========================================================================

    pub fn sorts(&self) -> &[Sort] {
        &self.view_state.sorts
    }

    pub fn set_sorts(&mut self, sorts: Vec<Sort>) {
        self.view_state.sorts = sorts;
    }

    pub fn toggle_sort(&mut self, column_id: &str) {
        self.view_state.sorts = tabula_engine::toggle_sort(&self.view_state.sorts, column_id);
    }

    pub fn set_single_sort(&mut self, column_id: &str, direction: SortDirection) {
        self.view_state.sorts = tabula_engine::set_single_sort(column_id, direction);
    }

    pub fn add_sort(&mut self, column_id: &str, direction: SortDirection) {
        self.view_state.sorts =
            tabula_engine::add_sort(&self.view_state.sorts, column_id, direction);
    }

    pub fn remove_sort(&mut self, column_id: &str) {
        self.view_state.sorts = tabula_engine::remove_sort(&self.view_state.sorts, column_id);
    }

    pub fn clear_sorts(&mut self) {
        self.view_state.sorts.clear();
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    // ========================================================================
    // Visibility and widths
    // ========================================================================

    pub fn visible_column_ids(&self) -> &[ColumnId] {
        &self.view_state.visible_column_ids
    }

    /// Show exactly these columns; unknown ids are dropped
    pub fn set_visible_columns(&mut self, column_ids: Vec<ColumnId>) {
        self.view_state.visible_column_ids = column_ids
            .into_iter()
            .filter(|id| self.columns.iter().any(|c| &c.id == id))
            .collect();
    }

    /// Flip a column's visibility, returning whether it is now visible
    pub fn toggle_column_visibility(&mut self, column_id: &str) -> StoreResult<bool> {
        if self.column(column_id).is_none() {
            return Err(StoreError::ColumnNotFound(column_id.to_string()));
        }
        let visible = &mut self.view_state.visible_column_ids;
        if let Some(index) = visible.iter().position(|id| id == column_id) {
            visible.remove(index);
            Ok(false)
        } else {
            visible.push(column_id.to_string());
            Ok(true)
        }
    }

    /// Width of a column, or the configured default when unset
    pub fn column_width(&self, column_id: &str) -> f32 {
        self.view_state
            .column_widths
            .get(column_id)
            .copied()
            .unwrap_or(self.settings.grid.default_column_width)
    }

    /// Set a column's width, clamped to the configured bounds
    pub fn set_column_width(&mut self, column_id: &str, width: f32) -> StoreResult<f32> {
        if self.column(column_id).is_none() {
            return Err(StoreError::ColumnNotFound(column_id.to_string()));
        }
        let width = self.settings.grid.clamp_width(width);
        self.view_state
            .column_widths
            .insert(column_id.to_string(), width);
        Ok(width)
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn views(&self) -> &[TableView] {
        &self.views
    }

    pub fn view(&self, view_id: &str) -> Option<&TableView> {
        self.views.iter().find(|v| v.id == view_id)
    }

    pub fn set_views(&mut self, views: Vec<TableView>) {
        if let Some(active) = self.active_view_id.as_deref() {
            if !views.iter().any(|v| v.id == active) {
                self.active_view_id = None;
            }
        }
        self.views = views;
    }

    /// Add a view; a new default view takes the flag from any other
    pub fn add_view(&mut self, view: TableView) -> StoreResult<()> {
        if self.view(&view.id).is_some() {
            return Err(StoreError::DuplicateId(view.id));
        }
        if view.is_default {
            self.clear_default_flag();
        }
        self.views.push(view);
        Ok(())
    }

    pub fn update_view(&mut self, view: TableView) -> StoreResult<()> {
        let index = self
            .views
            .iter()
            .position(|v| v.id == view.id)
            .ok_or_else(|| StoreError::ViewNotFound(view.id.clone()))?;
        if view.is_default {
            self.clear_default_flag();
        }
        self.views[index] = view;
        Ok(())
    }

    pub fn remove_view(&mut self, view_id: &str) -> StoreResult<TableView> {
        let index = self
            .views
            .iter()
            .position(|v| v.id == view_id)
            .ok_or_else(|| StoreError::ViewNotFound(view_id.to_string()))?;
        if self.active_view_id.as_deref() == Some(view_id) {
            self.active_view_id = None;
        }
        Ok(self.views.remove(index))
    }

    fn clear_default_flag(&mut self) {
        for view in &mut self.views {
            view.is_default = false;
        }
    }

    /// Replace filters, sorts, visibility and widths in one step
    pub fn apply_view(&mut self, view: &TableView) {
        self.view_state = ViewState::from_view(view, &self.columns);
        self.active_view_id = Some(view.id.clone());
        tracing::debug!(
            view_id = %view.id,
            filters = self.view_state.filters.len(),
            sorts = self.view_state.sorts.len(),
            "applied view"
        );
    }

    pub fn apply_view_by_id(&mut self, view_id: &str) -> StoreResult<()> {
        let view = self
            .view(view_id)
            .cloned()
            .ok_or_else(|| StoreError::ViewNotFound(view_id.to_string()))?;
        self.apply_view(&view);
        Ok(())
    }

    pub fn active_view_id(&self) -> Option<&str> {
        self.active_view_id.as_deref()
    }

    /// Current presentation state as a unit
    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    /// Save the current state as a new view and make it active
    pub fn save_current_as_view(&mut self, name: impl Into<String>) -> TableView {
        let view = self.view_state.capture(name);
        self.active_view_id = Some(view.id.clone());
        self.views.push(view.clone());
        view
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_row(&mut self, row_id: &str) -> StoreResult<()> {
        if self.row(row_id).is_none() {
            return Err(StoreError::RowNotFound(row_id.to_string()));
        }
        self.selection.insert(row_id.to_string());
        Ok(())
    }

    pub fn deselect_row(&mut self, row_id: &str) -> bool {
        self.selection.shift_remove(row_id)
    }

    /// Flip a row's selection, returning whether it is now selected
    pub fn toggle_row_selection(&mut self, row_id: &str) -> StoreResult<bool> {
        if self.deselect_row(row_id) {
            return Ok(false);
        }
        self.select_row(row_id)?;
        Ok(true)
    }

    /// Select every currently visible row, returning how many are selected
    pub fn select_all_visible(&mut self) -> usize {
        let ids: Vec<RowId> = self.visible_rows().iter().map(|r| r.id.clone()).collect();
        self.selection.extend(ids);
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selected row ids, in selection order
    pub fn selected_row_ids(&self) -> impl Iterator<Item = &RowId> {
        self.selection.iter()
    }

    pub fn is_selected(&self, row_id: &str) -> bool {
        self.selection.contains(row_id)
    }

    // ========================================================================
    // Editing
    // ========================================================================

    pub fn start_editing(&mut self, row_id: &str, column_id: &str) -> StoreResult<()> {
        if self.row(row_id).is_none() {
            return Err(StoreError::RowNotFound(row_id.to_string()));
        }
        if self.column(column_id).is_none() {
            return Err(StoreError::ColumnNotFound(column_id.to_string()));
        }
        self.editing_cell = Some(CellKey::new(row_id, column_id));
        Ok(())
    }

    pub fn stop_editing(&mut self) -> Option<CellKey> {
        self.editing_cell.take()
    }

    pub fn editing_cell(&self) -> Option<&CellKey> {
        self.editing_cell.as_ref()
    }

    // ========================================================================
    // Optimistic updates
    // ========================================================================

    /// Record an edit awaiting confirmation, replacing any pending edit of
    /// the same cell
    pub fn queue_cell_update(
        &mut self,
        row_id: &str,
        column_id: &str,
        value: CellValue,
        previous_value: CellValue,
    ) -> CellKey {
        let update = CellUpdate::new(row_id, column_id, value, previous_value);
        let key = update.key();
        if self.pending.queue(update).is_some() {
            tracing::debug!(cell = %key, "replaced pending cell update");
        } else {
            tracing::trace!(cell = %key, "queued cell update");
        }
        key
    }

    /// The edit is durable; drop its queue entry
    pub fn complete_cell_update(&mut self, key: &CellKey) -> Option<CellUpdate> {
        let update = self.pending.take(key);
        if update.is_some() {
            tracing::trace!(cell = %key, "completed cell update");
        }
        update
    }

    /// The edit failed; restore the queued previous value and drop the entry
    pub fn revert_cell_update(&mut self, key: &CellKey) -> Option<CellUpdate> {
        let update = self.pending.take(key)?;
        match self.rows.iter_mut().find(|r| r.id == key.row_id) {
            Some(row) => {
                write_cell(row, &key.column_id, update.previous_value.clone());
            }
            None => tracing::debug!(cell = %key, "reverted cell belongs to a removed row"),
        }
        tracing::warn!(cell = %key, "reverted cell update");
        Some(update)
    }

    pub fn pending_updates(&self) -> impl Iterator<Item = &CellUpdate> {
        self.pending.iter()
    }

    pub fn pending_update(&self, key: &CellKey) -> Option<&CellUpdate> {
        self.pending.get(key)
    }

    pub fn has_pending_updates(&self) -> bool {
        !self.pending.is_empty()
    }

    // ========================================================================
    // Derived
    // ========================================================================

    /// Rows to display: filter, then search, then sort
    pub fn visible_rows(&self) -> Vec<&Row> {
        self.visible_rows_at(&FilterContext::now())
    }

    pub fn visible_rows_at(&self, ctx: &FilterContext) -> Vec<&Row> {
        let filtered = filter_rows_at(&self.rows, &self.view_state.filters, &self.columns, ctx);
        let query = self.search_query.trim();
        let searched = if query.chars().count() >= self.settings.search.min_query_length {
            search_rows(filtered, query, &self.columns)
        } else {
            filtered
        };
        sort_rows(searched, &self.view_state.sorts, &self.columns)
    }

    /// Visible columns, in column order
    pub fn visible_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|c| self.view_state.is_visible(&c.id))
            .collect()
    }
}

/// Write a cell; `Null` clears the key. Returns the replaced value.
fn write_cell(row: &mut Row, column_id: &str, value: CellValue) -> CellValue {
    if value.is_null() {
        row.remove(column_id).unwrap_or_default()
    } else {
        row.set(column_id, value)
    }
}
