//! Column schema types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ColumnId;

/// The closed set of value types a column may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Number,
    Select,
    MultiSelect,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Checkbox,
    /// Foreign reference to a user
    UserLink,
    /// Foreign reference to a row of another table
    TableLink,
}

impl ColumnType {
    /// All column types, in declaration order
    pub const ALL: [ColumnType; 9] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Select,
        ColumnType::MultiSelect,
        ColumnType::Date,
        ColumnType::DateTime,
        ColumnType::Checkbox,
        ColumnType::UserLink,
        ColumnType::TableLink,
    ];

    /// Wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Select => "select",
            ColumnType::MultiSelect => "multi_select",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Checkbox => "checkbox",
            ColumnType::UserLink => "user_link",
            ColumnType::TableLink => "table_link",
        }
    }

    /// Types compared and searched as plain strings
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            ColumnType::Text | ColumnType::Select | ColumnType::UserLink | ColumnType::TableLink
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ColumnType::UserLink | ColumnType::TableLink)
    }

    /// Types whose values are drawn from `ColumnConfig::options`
    pub fn has_options(&self) -> bool {
        matches!(self, ColumnType::Select | ColumnType::MultiSelect)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ColumnType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("unknown column type: {}", s))
    }
}

/// One legal value of a select or multi-select column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: None,
        }
    }
}

/// Per-column configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Ordered, authoritative domain of a select/multi-select column
    #[serde(default)]
    pub options: Vec<SelectOption>,
}

impl ColumnConfig {
    pub fn with_options(options: Vec<SelectOption>) -> Self {
        Self { options }
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn option(&self, id: &str) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn option_label(&self, id: &str) -> Option<&str> {
        self.option(id).map(|o| o.label.as_str())
    }
}

/// A typed, named slot in a table's schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ColumnConfig>,
}

impl Column {
    /// Create an optional column without configuration
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
            is_required: false,
            config: None,
        }
    }

    /// Builder: mark the column as required
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Builder: set the option set
    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.config = Some(ColumnConfig::with_options(options));
        self
    }

    /// Declared options, empty when the column has none
    pub fn options(&self) -> &[SelectOption] {
        self.config
            .as_ref()
            .map(|c| c.options.as_slice())
            .unwrap_or(&[])
    }

    pub fn option_label(&self, id: &str) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.option_label(id))
    }
}
