//! Cell validation and coercion
//!
//! Raw input arrives as untyped JSON. Validation either coerces it to the
//! column's [`CellValue`] variant or explains why it cannot. Failures are
//! data, never panics or `Err`s.

use serde_json::Value as Json;
use std::collections::HashMap;
use tabula_core::{CellValue, Column, ColumnId, ColumnType};

use crate::parse::{parse_checkbox, parse_number, parse_uuid};
use crate::temporal::{parse_date, parse_instant};

/// Validation error for one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Column name the error refers to
    pub field: String,
    /// Error message
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn required(column: &Column) -> Self {
        Self::new(&column.name, format!("{} is required", column.name))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValidation {
    Valid(CellValue),
    Invalid(ValidationError),
}

impl CellValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, CellValidation::Valid(_))
    }

    /// Coerced value when valid
    pub fn coerced(&self) -> Option<&CellValue> {
        match self {
            CellValidation::Valid(value) => Some(value),
            CellValidation::Invalid(_) => None,
        }
    }

    pub fn into_coerced(self) -> Option<CellValue> {
        match self {
            CellValidation::Valid(value) => Some(value),
            CellValidation::Invalid(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            CellValidation::Valid(_) => None,
            CellValidation::Invalid(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<CellValue, ValidationError> {
        match self {
            CellValidation::Valid(value) => Ok(value),
            CellValidation::Invalid(err) => Err(err),
        }
    }
}

/// Null, the empty string and the empty array all count as "no value"
fn is_blank(raw: &Json) -> bool {
    match raw {
        Json::Null => true,
        Json::String(s) => s.is_empty(),
        Json::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Validate and coerce a raw value against a column's type and configuration
pub fn validate_cell_value(raw: &Json, column: &Column) -> CellValidation {
    if is_blank(raw) {
        return if column.is_required {
            CellValidation::Invalid(ValidationError::required(column))
        } else {
            CellValidation::Valid(CellValue::Null)
        };
    }

    match coerce(raw, column) {
        Ok(value) => CellValidation::Valid(value),
        Err(message) => CellValidation::Invalid(ValidationError::new(&column.name, message)),
    }
}

fn coerce(raw: &Json, column: &Column) -> Result<CellValue, String> {
    match column.column_type {
        ColumnType::Text => Ok(CellValue::Text(json_to_text(raw))),
        ColumnType::Number => coerce_number(raw).map(CellValue::Number),
        ColumnType::Select => {
            let Json::String(id) = raw else {
                return Err("must be a string".to_string());
            };
            check_option(column, id)?;
            Ok(CellValue::Select(id.clone()))
        }
        ColumnType::MultiSelect => {
            let ids = match raw {
                Json::String(s) => vec![s.clone()],
                Json::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Json::String(s) => Ok(s.clone()),
                        _ => Err("must be a list of strings".to_string()),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                _ => return Err("must be a list of strings".to_string()),
            };
            for id in &ids {
                check_option(column, id)?;
            }
            Ok(CellValue::MultiSelect(ids))
        }
        ColumnType::Date => raw
            .as_str()
            .and_then(parse_date)
            .map(CellValue::Date)
            .ok_or_else(|| "must be a valid date".to_string()),
        ColumnType::DateTime => raw
            .as_str()
            .and_then(parse_instant)
            .map(CellValue::DateTime)
            .ok_or_else(|| "must be a valid date and time".to_string()),
        ColumnType::Checkbox => coerce_checkbox(raw)
            .map(CellValue::Checkbox)
            .ok_or_else(|| "must be true or false".to_string()),
        ColumnType::UserLink => raw
            .as_str()
            .and_then(parse_uuid)
            .map(CellValue::UserLink)
            .ok_or_else(|| "must be a valid user id".to_string()),
        ColumnType::TableLink => raw
            .as_str()
            .and_then(parse_uuid)
            .map(CellValue::TableLink)
            .ok_or_else(|| "must be a valid row reference".to_string()),
    }
}

fn coerce_number(raw: &Json) -> Result<f64, String> {
    let parsed = match raw {
        Json::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Json::String(s) => parse_number(s),
        _ => None,
    };
    parsed.ok_or_else(|| "must be a number".to_string())
}

fn coerce_checkbox(raw: &Json) -> Option<bool> {
    match raw {
        Json::Bool(b) => Some(*b),
        Json::String(s) => parse_checkbox(s),
        Json::Number(n) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn check_option(column: &Column, id: &str) -> Result<(), String> {
    let options = column.options();
    if options.is_empty() || options.iter().any(|o| o.id == id) {
        Ok(())
    } else {
        Err(format!("'{}' is not a valid option", id))
    }
}

/// String conversion for text columns
fn json_to_text(raw: &Json) -> String {
    match raw {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        Json::Bool(b) => b.to_string(),
        // Integers keep every digit; f64 would round past 2^53
        Json::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
        Json::Number(n) => n
            .as_f64()
            .map(tabula_core::format_number)
            .unwrap_or_else(|| n.to_string()),
        Json::Array(items) => items.iter().map(json_to_text).collect::<Vec<_>>().join(","),
        Json::Object(_) => raw.to_string(),
    }
}

/// Result of validating a whole row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowValidation {
    /// Per-column errors, keyed by column id
    pub errors: HashMap<ColumnId, ValidationError>,
    /// Successfully coerced values, keyed by column id
    pub coerced: HashMap<ColumnId, CellValue>,
}

impl RowValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every declared column against the matching key of `data`
///
/// Keys that do not belong to a declared column are ignored.
pub fn validate_row_data(data: &serde_json::Map<String, Json>, columns: &[Column]) -> RowValidation {
    let mut result = RowValidation::default();
    for column in columns {
        let validation = match data.get(&column.id) {
            Some(raw) => validate_cell_value(raw, column),
            None if column.is_required => {
                CellValidation::Invalid(ValidationError::required(column))
            }
            None => continue,
        };
        match validation {
            CellValidation::Valid(value) => {
                result.coerced.insert(column.id.clone(), value);
            }
            CellValidation::Invalid(err) => {
                result.errors.insert(column.id.clone(), err);
            }
        }
    }
    result
}
