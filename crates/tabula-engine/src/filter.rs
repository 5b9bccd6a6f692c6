//! Declarative row filtering
//!
//! Filters are AND-combined. A filter on a column the table does not have,
//! an operator this version does not know, or a comparison with a missing
//! or malformed operand never hides a row. A cell that cannot be read for
//! a comparison does.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use tabula_core::{
    CellValue, Column, ColumnType, DateWithinRange, Filter, FilterOperator, FilterValue, Row,
};

use crate::parse::{checkbox_of, number_of, parse_checkbox, parse_number};
use crate::temporal::{instant_of, parse_date, parse_instant};

/// Evaluation context for filters that depend on the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub now: DateTime<Utc>,
}

impl FilterContext {
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }

    /// Context pinned to a fixed instant
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

impl Default for FilterContext {
    fn default() -> Self {
        Self::now()
    }
}

/// Rows matching every filter, in their original order
pub fn filter_rows<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    filters: &[Filter],
    columns: &[Column],
) -> Vec<&'a Row> {
    filter_rows_at(rows, filters, columns, &FilterContext::now())
}

/// [`filter_rows`] with an explicit clock for relative date ranges
pub fn filter_rows_at<'a>(
    rows: impl IntoIterator<Item = &'a Row>,
    filters: &[Filter],
    columns: &[Column],
    ctx: &FilterContext,
) -> Vec<&'a Row> {
    let resolved: Vec<(&Filter, &Column)> = filters
        .iter()
        .filter_map(|filter| {
            let column = columns.iter().find(|c| c.id == filter.column_id);
            if column.is_none() {
                tracing::debug!(
                    filter_id = %filter.id,
                    column_id = %filter.column_id,
                    "ignoring filter on unknown column"
                );
            }
            column.map(|c| (filter, c))
        })
        .collect();

    rows.into_iter()
        .filter(|row| {
            resolved
                .iter()
                .all(|(filter, column)| apply_filter(row.get(&column.id), filter, column, ctx))
        })
        .collect()
}

/// Evaluate one filter against one cell
pub fn apply_filter(
    value: Option<&CellValue>,
    filter: &Filter,
    column: &Column,
    ctx: &FilterContext,
) -> bool {
    let cell = value.unwrap_or(&CellValue::Null);
    let operand = filter.value.as_ref();

    match filter.operator {
        FilterOperator::IsEmpty => cell.is_empty(),
        FilterOperator::IsNotEmpty => !cell.is_empty(),
        FilterOperator::Equals => matches_equals(cell, operand, column),
        FilterOperator::NotEquals => !matches_equals(cell, operand, column),
        FilterOperator::Contains
        | FilterOperator::NotContains
        | FilterOperator::StartsWith
        | FilterOperator::EndsWith => {
            let Some(needle) = operand.and_then(FilterValue::as_text) else {
                return true;
            };
            let haystack = cell.display_text().to_lowercase();
            let needle = needle.to_lowercase();
            match filter.operator {
                FilterOperator::Contains => haystack.contains(&needle),
                FilterOperator::NotContains => !haystack.contains(&needle),
                FilterOperator::StartsWith => haystack.starts_with(&needle),
                _ => haystack.ends_with(&needle),
            }
        }
        FilterOperator::GreaterThan
        | FilterOperator::LessThan
        | FilterOperator::GreaterThanOrEqual
        | FilterOperator::LessThanOrEqual => {
            let Some(bound) = operand.and_then(|v| operand_point(v, column.column_type)) else {
                return true;
            };
            let Some(point) = cell_point(cell, column.column_type) else {
                return false;
            };
            match filter.operator {
                FilterOperator::GreaterThan => point > bound,
                FilterOperator::LessThan => point < bound,
                FilterOperator::GreaterThanOrEqual => point >= bound,
                _ => point <= bound,
            }
        }
        FilterOperator::Between => {
            let bounds = operand.and_then(FilterValue::as_list).and_then(|items| match items {
                [low, high] => Some((
                    operand_point(low, column.column_type)?,
                    operand_point(high, column.column_type)?,
                )),
                _ => None,
            });
            let Some((mut low, mut high)) = bounds else {
                return true;
            };
            if low > high {
                std::mem::swap(&mut low, &mut high);
            }
            let Some(point) = cell_point(cell, column.column_type) else {
                return false;
            };
            point >= low && point <= high
        }
        FilterOperator::IsBefore
        | FilterOperator::IsAfter
        | FilterOperator::IsOnOrBefore
        | FilterOperator::IsOnOrAfter => {
            let Some(bound) = operand.and_then(|v| temporal_operand(v, column.column_type)) else {
                return true;
            };
            let Some(point) = temporal_point(cell, column.column_type) else {
                return false;
            };
            match filter.operator {
                FilterOperator::IsBefore => point < bound,
                FilterOperator::IsAfter => point > bound,
                FilterOperator::IsOnOrBefore => point <= bound,
                _ => point >= bound,
            }
        }
        FilterOperator::IsWithin => {
            let Some((start, end)) = operand.and_then(|v| within_days(v, ctx)) else {
                return true;
            };
            let Some(day) = instant_of(cell).map(|dt| dt.date_naive()) else {
                return false;
            };
            day >= start && day <= end
        }
        FilterOperator::Unknown => {
            tracing::trace!(filter_id = %filter.id, "unknown operator passes every row");
            true
        }
    }
}

fn matches_equals(cell: &CellValue, operand: Option<&FilterValue>, column: &Column) -> bool {
    let Some(operand) = operand else {
        return cell.is_empty();
    };

    match column.column_type {
        ColumnType::MultiSelect => {
            let items: &[String] = match cell {
                CellValue::MultiSelect(items) => items,
                _ => &[],
            };
            match operand {
                FilterValue::List(wanted) => {
                    let mut wanted: Vec<String> = wanted
                        .iter()
                        .filter_map(FilterValue::as_text)
                        .collect();
                    let mut have = items.to_vec();
                    wanted.sort();
                    wanted.dedup();
                    have.sort();
                    have.dedup();
                    have == wanted
                }
                other => other
                    .as_text()
                    .is_some_and(|id| items.iter().any(|item| *item == id)),
            }
        }
        ColumnType::Number => {
            let Some(target) = number_operand(operand) else {
                return true;
            };
            number_of(cell).is_some_and(|n| n == target)
        }
        ColumnType::Checkbox => {
            let Some(target) = checkbox_operand(operand) else {
                return true;
            };
            checkbox_of(cell).unwrap_or(false) == target
        }
        ColumnType::Date | ColumnType::DateTime => {
            let Some(target) = temporal_operand(operand, column.column_type) else {
                return true;
            };
            temporal_point(cell, column.column_type).is_some_and(|p| p == target)
        }
        ColumnType::Text | ColumnType::Select | ColumnType::UserLink | ColumnType::TableLink => {
            let Some(target) = operand.as_text().map(|t| t.to_lowercase()) else {
                return true;
            };
            if cell.display_text().to_lowercase() == target {
                return true;
            }
            match cell {
                CellValue::Select(id) => column
                    .option_label(id)
                    .is_some_and(|label| label.to_lowercase() == target),
                _ => false,
            }
        }
    }
}

/// Comparable reading of a cell or operand for ordering operators
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Point {
    Number(f64),
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

fn cell_point(cell: &CellValue, column_type: ColumnType) -> Option<Point> {
    if column_type.is_temporal() {
        temporal_point(cell, column_type)
    } else {
        number_of(cell).map(Point::Number)
    }
}

fn operand_point(operand: &FilterValue, column_type: ColumnType) -> Option<Point> {
    if column_type.is_temporal() {
        temporal_operand(operand, column_type)
    } else {
        number_operand(operand).map(Point::Number)
    }
}

/// Date columns compare by calendar day, everything else by instant
fn temporal_point(cell: &CellValue, column_type: ColumnType) -> Option<Point> {
    match (column_type, cell) {
        (ColumnType::Date, CellValue::Date(d)) => Some(Point::Day(*d)),
        (ColumnType::Date, other) => instant_of(other).map(|dt| Point::Day(dt.date_naive())),
        (_, other) => instant_of(other).map(Point::Instant),
    }
}

fn temporal_operand(operand: &FilterValue, column_type: ColumnType) -> Option<Point> {
    let FilterValue::Text(text) = operand else {
        return None;
    };
    if column_type == ColumnType::Date {
        parse_date(text).map(Point::Day)
    } else {
        parse_instant(text).map(Point::Instant)
    }
}

fn number_operand(operand: &FilterValue) -> Option<f64> {
    match operand {
        FilterValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
        FilterValue::Text(s) => parse_number(s),
        _ => None,
    }
}

fn checkbox_operand(operand: &FilterValue) -> Option<bool> {
    match operand {
        FilterValue::Bool(b) => Some(*b),
        FilterValue::Text(s) => parse_checkbox(s),
        FilterValue::Number(n) if *n == 1.0 => Some(true),
        FilterValue::Number(n) if *n == 0.0 => Some(false),
        _ => None,
    }
}

fn within_days(operand: &FilterValue, ctx: &FilterContext) -> Option<(NaiveDate, NaiveDate)> {
    match operand {
        FilterValue::Within(range) => resolve_within(range, ctx.today()),
        _ => None,
    }
}

/// Inclusive calendar-day range of a relative window anchored at `today`
pub fn resolve_within(range: &DateWithinRange, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let past = |start: Option<NaiveDate>| start.map(|s| (s, today));
    let next = |end: Option<NaiveDate>| end.map(|e| (today, e));
    match range {
        DateWithinRange::Today => Some((today, today)),
        DateWithinRange::PastWeek => past(today.checked_sub_days(Days::new(7))),
        DateWithinRange::PastMonth => past(today.checked_sub_months(Months::new(1))),
        DateWithinRange::PastYear => past(today.checked_sub_months(Months::new(12))),
        DateWithinRange::NextWeek => next(today.checked_add_days(Days::new(7))),
        DateWithinRange::NextMonth => next(today.checked_add_months(Months::new(1))),
        DateWithinRange::NextYear => next(today.checked_add_months(Months::new(12))),
        DateWithinRange::PastDays { days } => past(today.checked_sub_days(Days::new(u64::from(*days)))),
        DateWithinRange::NextDays { days } => next(today.checked_add_days(Days::new(u64::from(*days)))),
        DateWithinRange::Between { start, end } => Some((*start.min(end), *start.max(end))),
    }
}
