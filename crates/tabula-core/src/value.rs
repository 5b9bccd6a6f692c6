//! Cell values

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The value of one cell, one variant per column type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// Absent value
    #[default]
    Null,
    Text(String),
    Number(f64),
    /// Option id of a select column
    Select(String),
    /// Option ids of a multi-select column
    MultiSelect(Vec<String>),
    Date(NaiveDate),
    #[serde(rename = "datetime")]
    DateTime(DateTime<Utc>),
    Checkbox(bool),
    UserLink(Uuid),
    TableLink(Uuid),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Null, empty text, or an empty multi-select
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) | CellValue::Select(s) => s.is_empty(),
            CellValue::MultiSelect(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Name of the variant, matching the column type wire names
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Select(_) => "select",
            CellValue::MultiSelect(_) => "multi_select",
            CellValue::Date(_) => "date",
            CellValue::DateTime(_) => "datetime",
            CellValue::Checkbox(_) => "checkbox",
            CellValue::UserLink(_) => "user_link",
            CellValue::TableLink(_) => "table_link",
        }
    }

    /// Try to get as a string slice (text and select values)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::Select(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Checkbox(b) => Some(*b),
            _ => None,
        }
    }

    /// String conversion used for text filters, search and the text sort rule
    ///
    /// Null renders as the empty string.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Text(s) | CellValue::Select(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::MultiSelect(items) => items.join(", "),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => format_instant(dt),
            CellValue::Checkbox(b) => b.to_string(),
            CellValue::UserLink(id) | CellValue::TableLink(id) => id.to_string(),
        }
    }

    /// Plain JSON rendering, as handed to persistence adapters
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            CellValue::Null => Json::Null,
            CellValue::Text(s) | CellValue::Select(s) => Json::String(s.clone()),
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            CellValue::MultiSelect(items) => {
                Json::Array(items.iter().cloned().map(Json::String).collect())
            }
            CellValue::Checkbox(b) => Json::Bool(*b),
            CellValue::Date(_)
            | CellValue::DateTime(_)
            | CellValue::UserLink(_)
            | CellValue::TableLink(_) => Json::String(self.display_text()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            other => write!(f, "{}", other.display_text()),
        }
    }
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e21 {
        // -0.0 renders as "0"
        format!("{:.0}", n + 0.0)
    } else {
        format!("{}", n)
    }
}

/// ISO-8601 rendering of an instant, millisecond precision, `Z` suffix
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
