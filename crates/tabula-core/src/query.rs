//! Declarative filter and sort types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{format_number, ColumnId};

/// Predicate vocabulary of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    IsEmpty,
    IsNotEmpty,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Between,
    IsBefore,
    IsAfter,
    IsOnOrBefore,
    IsOnOrAfter,
    IsWithin,
    /// Any operator name this version does not recognise
    #[serde(other)]
    Unknown,
}

impl FilterOperator {
    const NAMED: [FilterOperator; 18] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::IsEmpty,
        FilterOperator::IsNotEmpty,
        FilterOperator::Contains,
        FilterOperator::NotContains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::GreaterThanOrEqual,
        FilterOperator::LessThanOrEqual,
        FilterOperator::Between,
        FilterOperator::IsBefore,
        FilterOperator::IsAfter,
        FilterOperator::IsOnOrBefore,
        FilterOperator::IsOnOrAfter,
        FilterOperator::IsWithin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "not_equals",
            FilterOperator::IsEmpty => "is_empty",
            FilterOperator::IsNotEmpty => "is_not_empty",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::GreaterThan => "greater_than",
            FilterOperator::LessThan => "less_than",
            FilterOperator::GreaterThanOrEqual => "greater_than_or_equal",
            FilterOperator::LessThanOrEqual => "less_than_or_equal",
            FilterOperator::Between => "between",
            FilterOperator::IsBefore => "is_before",
            FilterOperator::IsAfter => "is_after",
            FilterOperator::IsOnOrBefore => "is_on_or_before",
            FilterOperator::IsOnOrAfter => "is_on_or_after",
            FilterOperator::IsWithin => "is_within",
            FilterOperator::Unknown => "unknown",
        }
    }

    /// Whether the operator needs a filter value to mean anything
    pub fn takes_value(&self) -> bool {
        !matches!(
            self,
            FilterOperator::IsEmpty | FilterOperator::IsNotEmpty | FilterOperator::Unknown
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = std::convert::Infallible;

    /// Unrecognised names map to `Unknown`, mirroring deserialization
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Ok(Self::NAMED
            .into_iter()
            .find(|op| op.as_str() == lower)
            .unwrap_or(FilterOperator::Unknown))
    }
}

/// A relative or explicit date window for `is_within`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateWithinRange {
    Today,
    PastWeek,
    PastMonth,
    PastYear,
    NextWeek,
    NextMonth,
    NextYear,
    PastDays { days: u32 },
    NextDays { days: u32 },
    Between { start: NaiveDate, end: NaiveDate },
}

/// Operand of a filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Within(DateWithinRange),
    /// Range bounds for `between`, or a set for multi-select equality
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Scalar operand rendered as text; `None` for ranges and lists
    pub fn as_text(&self) -> Option<String> {
        match self {
            FilterValue::Bool(b) => Some(b.to_string()),
            FilterValue::Number(n) => Some(format_number(*n)),
            FilterValue::Text(s) => Some(s.clone()),
            FilterValue::Within(_) | FilterValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FilterValue]> {
        match self {
            FilterValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

/// A declarative predicate over one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub column_id: ColumnId,
    pub operator: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

impl Filter {
    pub fn new(
        id: impl Into<String>,
        column_id: impl Into<ColumnId>,
        operator: FilterOperator,
        value: Option<FilterValue>,
    ) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            operator,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {}", other)),
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub column_id: ColumnId,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_id: impl Into<ColumnId>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognised_operator_deserializes_to_unknown() {
        let filter: Filter = serde_json::from_str(
            r#"{"id":"f1","column_id":"c","operator":"matches_regex","value":"x"}"#,
        )
        .unwrap();
        assert_eq!(filter.operator, FilterOperator::Unknown);
        assert_eq!(
            "IS_NOT_EMPTY".parse::<FilterOperator>().unwrap(),
            FilterOperator::IsNotEmpty
        );
        assert_eq!(
            "sounds_like".parse::<FilterOperator>().unwrap(),
            FilterOperator::Unknown
        );
    }

    #[test]
    fn filter_values_deserialize_untagged() {
        let range: FilterValue = serde_json::from_str("[10, 20]").unwrap();
        assert_eq!(
            range,
            FilterValue::List(vec![FilterValue::Number(10.0), FilterValue::Number(20.0)])
        );
        let within: FilterValue = serde_json::from_str(r#"{"kind":"past_days","days":3}"#).unwrap();
        assert_eq!(within, FilterValue::Within(DateWithinRange::PastDays { days: 3 }));
        let text: FilterValue = serde_json::from_str(r#""high""#).unwrap();
        assert_eq!(text.as_text().as_deref(), Some("high"));
    }
}
