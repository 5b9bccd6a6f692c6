//! Tabula Core - data model and contracts for the dynamic table engine
//!
//! This crate provides the types every other Tabula crate depends on:
//!
//! - `Column`, `ColumnType`, `ColumnConfig` - typed table schema
//! - `CellValue` - the closed, tagged value space of a cell
//! - `Row` - one record with its default-order key
//! - `Filter`, `Sort`, `TableView` - declarative query and presentation state
//! - `CellKey`, `CellUpdate` - optimistic edit bookkeeping
//! - `TableLoader`, `CellWriter`, `ColumnMigrationWriter` - persistence contracts

mod column;
mod error;
pub mod persistence;
mod query;
mod row;
mod table;
mod update;
mod value;
mod view;

pub use column::*;
pub use error::*;
pub use persistence::{CellWriter, ColumnMigrationWriter, TableBackend, TableLoader};
pub use query::*;
pub use row::*;
pub use table::*;
pub use update::*;
pub use value::*;
pub use view::*;

/// Identifier of a table row
pub type RowId = String;

/// Identifier of a table column
pub type ColumnId = String;

/// Identifier of a table
pub type TableId = String;

/// Identifier of a saved view
pub type ViewId = String;
