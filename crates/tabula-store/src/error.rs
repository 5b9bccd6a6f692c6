use tabula_core::{ColumnId, ColumnType, RowId, TableId, TabulaError, ViewId};
use tabula_engine::{BlockedConversion, ValidationError};
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by store operations and the edit service
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No active table")]
    NoActiveTable,

    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    #[error("Row not found: {0}")]
    RowNotFound(RowId),

    #[error("View not found: {0}")]
    ViewNotFound(ViewId),

    #[error("Invalid value: {0}")]
    InvalidValue(ValidationError),

    /// A column type change was refused; `rows` lists the values that blocked it
    #[error("Cannot convert column {column_id} from {from} to {to}")]
    ConversionNotPermitted {
        column_id: ColumnId,
        from: ColumnType,
        to: ColumnType,
        rows: Vec<BlockedConversion>,
    },

    /// The column has edits or a type change waiting on the backend
    #[error("Column is busy: {0}")]
    ColumnBusy(ColumnId),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error(transparent)]
    Backend(#[from] TabulaError),
}
