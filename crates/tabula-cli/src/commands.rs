//! Command implementations
//!
//! Each command opens the table file through [`JsonFileBackend`], drives the
//! same store and edit service an interactive client would, and returns the
//! text to print.

use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use serde_json::Value as Json;
use std::path::Path;
use std::sync::Arc;
use tabula_core::ColumnType;
use tabula_store::{EditOutcome, StoreError, TableEditService, TableStore, TabulaSettings};

use crate::args::{parse_filter, parse_sort, resolve_column};
use crate::json_backend::{JsonFileBackend, TableFile};
use crate::render::{render_pairs, render_rows};

/// An opened table file with its store and edit service
pub struct Session {
    backend: Arc<JsonFileBackend>,
    service: TableEditService,
}

impl Session {
    pub async fn open(path: &Path, settings: TabulaSettings) -> Result<Self> {
        let backend = Arc::new(
            JsonFileBackend::open(path)
                .with_context(|| format!("Failed to open table file {:?}", path))?,
        );
        let store = Arc::new(Mutex::new(TableStore::new(settings)));
        let service = TableEditService::new(store, backend.clone());

        service.refresh_tables().await?;
        let table_id = service
            .store()
            .lock()
            .tables()
            .first()
            .map(|t| t.id.clone())
            .context("Table file lists no table")?;
        service.open_table(&table_id).await?;

        Ok(Self { backend, service })
    }

    pub fn store(&self) -> Arc<Mutex<TableStore>> {
        self.service.store()
    }

    fn save(&self) -> Result<()> {
        self.backend.save().context("Failed to save table file")
    }
}

/// Query options of the `show` command
#[derive(Debug, Clone, Default)]
pub struct ShowOptions {
    pub view: Option<String>,
    pub search: Option<String>,
    pub filters: Vec<String>,
    pub sorts: Vec<String>,
    pub limit: Option<usize>,
}

/// Print the visible rows after applying a view, filters, search and sorts
pub async fn show(path: &Path, settings: TabulaSettings, options: &ShowOptions) -> Result<String> {
    let session = Session::open(path, settings).await?;
    let store = session.store();
    let mut store = store.lock();

    if let Some(wanted) = &options.view {
        let view = store
            .views()
            .iter()
            .find(|v| v.id == *wanted || v.name.eq_ignore_ascii_case(wanted))
            .cloned()
            .with_context(|| format!("no view named '{}'", wanted))?;
        store.apply_view(&view);
    }

    if !options.filters.is_empty() {
        let filters = options
            .filters
            .iter()
            .enumerate()
            .map(|(i, raw)| parse_filter(i, raw, store.columns()))
            .collect::<Result<Vec<_>>>()?;
        for filter in filters {
            store.add_filter(filter)?;
        }
    }
    if !options.sorts.is_empty() {
        let sorts = options
            .sorts
            .iter()
            .map(|raw| parse_sort(raw, store.columns()))
            .collect::<Result<Vec<_>>>()?;
        store.set_sorts(sorts);
    }
    if let Some(query) = &options.search {
        store.set_search_query(query.as_str());
    }

    let rows = store.visible_rows();
    let total = store.rows().len();
    let matched = rows.len();
    let shown: Vec<_> = match options.limit {
        Some(limit) => rows.into_iter().take(limit).collect(),
        None => rows,
    };
    tracing::debug!(total, matched, shown = shown.len(), "rendering rows");

    let mut output = render_rows(&store.visible_columns(), &shown);
    output.push_str(&format!("\n{} of {} rows", shown.len(), total));
    if shown.len() < matched {
        output.push_str(&format!(" ({} matched)", matched));
    }
    Ok(output)
}

/// Outcome of checking a table file
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub rows_checked: usize,
    pub problems: Vec<(String, String)>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn render(&self) -> String {
        if self.is_clean() {
            return format!("{} rows checked, no problems found", self.rows_checked);
        }
        format!(
            "{}\n{} problems in {} rows checked",
            render_pairs(["Row", "Problem"], &self.problems),
            self.problems.len(),
            self.rows_checked
        )
    }
}

/// Check every stored cell against its column
pub fn validate(path: &Path) -> Result<ValidationReport> {
    let file = TableFile::read(path).with_context(|| format!("Failed to read table file {:?}", path))?;

    let mut problems = Vec::new();
    for (row, validation) in file.validate() {
        // Report in column order so output is stable
        for column in &file.columns {
            if let Some(err) = validation.errors.get(&column.id) {
                problems.push((row.id.clone(), err.to_string()));
            }
        }
    }
    Ok(ValidationReport {
        rows_checked: file.rows.len(),
        problems,
    })
}

/// Change a column's type, converting every value or none
pub async fn convert(
    path: &Path,
    settings: TabulaSettings,
    column: &str,
    to: ColumnType,
    write: bool,
) -> Result<String> {
    let session = Session::open(path, settings).await?;
    let (column_id, column_name) = {
        let store = session.store();
        let store = store.lock();
        let column = resolve_column(store.columns(), column)?;
        (column.id.clone(), column.name.clone())
    };

    let converted = match session.service.change_column_type(&column_id, to).await {
        Ok(count) => count,
        Err(StoreError::ConversionNotPermitted { from, to, rows, .. }) if !rows.is_empty() => {
            let blocked: Vec<_> = rows
                .iter()
                .map(|b| (b.row_id.clone(), b.error.to_string()))
                .collect();
            bail!(
                "{}\nCannot convert {} from {} to {}: {} values do not convert",
                render_pairs(["Row", "Problem"], &blocked),
                column_name,
                from,
                to,
                blocked.len()
            );
        }
        Err(err) => return Err(err.into()),
    };

    if write {
        session.save()?;
    }
    Ok(format!(
        "Converted {} values in {} to {}{}",
        converted,
        column_name,
        to,
        if write { "" } else { " (dry run, pass --write to save)" }
    ))
}

/// Edit one cell through the optimistic edit path
pub async fn set_cell(
    path: &Path,
    settings: TabulaSettings,
    row_id: &str,
    column: &str,
    raw: &str,
    write: bool,
) -> Result<String> {
    let session = Session::open(path, settings).await?;
    let column_id = {
        let store = session.store();
        let store = store.lock();
        let column = resolve_column(store.columns(), column)?;
        column.id.clone()
    };

    // Bare words are taken as strings
    let raw: Json = serde_json::from_str(raw).unwrap_or_else(|_| Json::String(raw.to_string()));

    match session.service.edit_cell(row_id, &column_id, &raw).await? {
        EditOutcome::Committed(value) => {
            if write {
                session.save()?;
            }
            Ok(format!("{}.{} = {}", row_id, column_id, value))
        }
        EditOutcome::Reverted(previous) => {
            bail!("write refused, {}.{} kept {}", row_id, column_id, previous)
        }
        EditOutcome::Discarded => bail!("table changed while the edit was in flight"),
        EditOutcome::Superseded => bail!("a later edit of {}.{} replaced this one", row_id, column_id),
    }
}

#[cfg(test)]
mod tests;
