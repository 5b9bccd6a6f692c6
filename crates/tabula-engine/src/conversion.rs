//! Column type conversion
//!
//! A column's type only ever changes through an explicit conversion of
//! every value it holds. The matrix below lists which type pairs are
//! permitted at all; within a permitted pair each value must still be
//! individually compatible.

use tabula_core::{CellValue, ColumnId, ColumnType, Row, RowId};
use thiserror::Error;

use crate::parse::{parse_checkbox, parse_number};
use crate::temporal::{midnight_utc, parse_date, parse_instant};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("conversion from {from} to {to} is not permitted")]
    NotPermitted { from: ColumnType, to: ColumnType },

    #[error("value '{value}' cannot be converted from {from} to {to}")]
    Incompatible {
        value: String,
        from: ColumnType,
        to: ColumnType,
    },
}

/// Whether a column of type `from` may be converted to `to` at all
pub fn is_conversion_permitted(from: ColumnType, to: ColumnType) -> bool {
    use ColumnType::*;
    if from == to {
        return true;
    }
    match from {
        Text => matches!(to, Number | Date | DateTime | Checkbox | Select),
        Number => matches!(to, Text | Checkbox),
        Checkbox => matches!(to, Text | Number),
        Date => matches!(to, Text | DateTime),
        DateTime => matches!(to, Text | Date),
        Select => matches!(to, Text | MultiSelect),
        MultiSelect | UserLink | TableLink => to == Text,
    }
}

/// Convert one value between column types
///
/// Empty values convert to `Null` for any permitted pair.
pub fn convert_value(
    value: &CellValue,
    from: ColumnType,
    to: ColumnType,
) -> Result<CellValue, ConversionError> {
    if !is_conversion_permitted(from, to) {
        return Err(ConversionError::NotPermitted { from, to });
    }
    if value.is_empty() {
        return Ok(CellValue::Null);
    }
    if from == to {
        return Ok(value.clone());
    }

    let incompatible = || ConversionError::Incompatible {
        value: value.display_text(),
        from,
        to,
    };

    use ColumnType as T;
    let converted = match (to, value) {
        (T::Text, v) => Some(CellValue::Text(v.display_text())),
        (T::Number, CellValue::Checkbox(b)) => Some(CellValue::Number(if *b { 1.0 } else { 0.0 })),
        (T::Number, CellValue::Text(s)) => parse_number(s).map(CellValue::Number),
        (T::Checkbox, CellValue::Number(n)) if n.is_finite() => Some(CellValue::Checkbox(*n != 0.0)),
        (T::Checkbox, CellValue::Text(s)) => parse_checkbox(s).map(CellValue::Checkbox),
        (T::Date, CellValue::Text(s)) => parse_date(s).map(CellValue::Date),
        (T::Date, CellValue::DateTime(dt)) => Some(CellValue::Date(dt.date_naive())),
        (T::DateTime, CellValue::Text(s)) => parse_instant(s).map(CellValue::DateTime),
        (T::DateTime, CellValue::Date(d)) => midnight_utc(*d).map(CellValue::DateTime),
        (T::Select, CellValue::Text(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| CellValue::Select(trimmed.to_string()))
        }
        (T::MultiSelect, CellValue::Select(id)) => Some(CellValue::MultiSelect(vec![id.clone()])),
        _ => None,
    };
    converted.ok_or_else(incompatible)
}

pub fn can_convert_value(value: &CellValue, from: ColumnType, to: ColumnType) -> bool {
    convert_value(value, from, to).is_ok()
}

/// A row whose value blocks a column conversion
#[derive(Debug, Clone, PartialEq)]
pub struct BlockedConversion {
    pub row_id: RowId,
    pub error: ConversionError,
}

/// The complete converted value set of a column, one entry per row
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionPlan {
    pub column_id: ColumnId,
    pub from: ColumnType,
    pub to: ColumnType,
    pub values: Vec<(RowId, CellValue)>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColumnConversionError {
    #[error(transparent)]
    NotPermitted(ConversionError),

    #[error("{} row(s) cannot be converted", .0.len())]
    Blocked(Vec<BlockedConversion>),
}

/// Check and convert every row's value for one column, all or nothing
///
/// Rows without a value for the column convert as `Null`.
pub fn plan_column_conversion<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    column_id: &str,
    from: ColumnType,
    to: ColumnType,
) -> Result<ConversionPlan, ColumnConversionError> {
    if !is_conversion_permitted(from, to) {
        return Err(ColumnConversionError::NotPermitted(
            ConversionError::NotPermitted { from, to },
        ));
    }

    let mut values = Vec::new();
    let mut blocked = Vec::new();
    for row in rows {
        let current = row.get(column_id).cloned().unwrap_or_default();
        match convert_value(&current, from, to) {
            Ok(converted) => values.push((row.id.clone(), converted)),
            Err(error) => blocked.push(BlockedConversion {
                row_id: row.id.clone(),
                error,
            }),
        }
    }

    if !blocked.is_empty() {
        return Err(ColumnConversionError::Blocked(blocked));
    }
    Ok(ConversionPlan {
        column_id: column_id.to_string(),
        from,
        to,
        values,
    })
}

#[cfg(test)]
mod tests;
