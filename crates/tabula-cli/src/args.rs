//! Parsing of `--filter` and `--sort` arguments
//!
//! Filters are written `COLUMN:OPERATOR[:VALUE]` and sorts `COLUMN[:asc|desc]`.
//! Columns are matched by id first, then by name ignoring case.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use tabula_core::{
    Column, ColumnType, DateWithinRange, Filter, FilterOperator, FilterValue, Sort, SortDirection,
};

/// Find a column by id, or by case-insensitive name
pub fn resolve_column<'a>(columns: &'a [Column], key: &str) -> Result<&'a Column> {
    let key = key.trim();
    columns
        .iter()
        .find(|c| c.id == key)
        .or_else(|| columns.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| anyhow!("no column named '{}'", key))
}

/// Parse one `--filter` argument
pub fn parse_filter(index: usize, raw: &str, columns: &[Column]) -> Result<Filter> {
    let mut parts = raw.splitn(3, ':');
    let column_key = parts.next().unwrap_or_default();
    let operator_name = parts
        .next()
        .ok_or_else(|| anyhow!("filter '{}' must look like COLUMN:OPERATOR[:VALUE]", raw))?;
    let value = parts.next();

    let column = resolve_column(columns, column_key)?;
    let operator: FilterOperator = operator_name.parse().unwrap_or(FilterOperator::Unknown);
    if operator == FilterOperator::Unknown {
        bail!("unknown filter operator '{}'", operator_name);
    }

    let value = match (operator.takes_value(), value) {
        (false, _) => None,
        (true, None) if operator == FilterOperator::Equals => None,
        (true, None) => bail!("operator '{}' needs a value", operator),
        (true, Some(text)) => Some(
            parse_operand(operator, column, text)
                .with_context(|| format!("invalid value in filter '{}'", raw))?,
        ),
    };

    Ok(Filter::new(format!("cli-{}", index + 1), column.id.clone(), operator, value))
}

fn parse_operand(operator: FilterOperator, column: &Column, text: &str) -> Result<FilterValue> {
    match operator {
        FilterOperator::Between => {
            let (low, high) = text
                .split_once("..")
                .ok_or_else(|| anyhow!("between takes LOW..HIGH"))?;
            Ok(FilterValue::List(vec![
                FilterValue::from(low.trim()),
                FilterValue::from(high.trim()),
            ]))
        }
        FilterOperator::IsWithin => parse_within(text).map(FilterValue::Within),
        FilterOperator::Equals | FilterOperator::NotEquals
            if column.column_type == ColumnType::MultiSelect && text.contains(',') =>
        {
            Ok(FilterValue::List(
                text.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(FilterValue::from)
                    .collect(),
            ))
        }
        _ => Ok(FilterValue::from(text)),
    }
}

/// Relative window names, `past_days=N`, `next_days=N`, or `START..END`
pub fn parse_within(text: &str) -> Result<DateWithinRange> {
    let text = text.trim();
    if let Some((start, end)) = text.split_once("..") {
        let day = |s: &str| {
            NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("'{}' is not a YYYY-MM-DD date", s.trim()))
        };
        return Ok(DateWithinRange::Between {
            start: day(start)?,
            end: day(end)?,
        });
    }
    if let Some((name, days)) = text.split_once('=') {
        let days: u32 = days
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not a day count", days.trim()))?;
        return match name.trim() {
            "past_days" => Ok(DateWithinRange::PastDays { days }),
            "next_days" => Ok(DateWithinRange::NextDays { days }),
            other => bail!("unknown window '{}'", other),
        };
    }
    match text {
        "today" => Ok(DateWithinRange::Today),
        "past_week" => Ok(DateWithinRange::PastWeek),
        "past_month" => Ok(DateWithinRange::PastMonth),
        "past_year" => Ok(DateWithinRange::PastYear),
        "next_week" => Ok(DateWithinRange::NextWeek),
        "next_month" => Ok(DateWithinRange::NextMonth),
        "next_year" => Ok(DateWithinRange::NextYear),
        other => bail!("unknown window '{}'", other),
    }
}

/// Parse one `--sort` argument
pub fn parse_sort(raw: &str, columns: &[Column]) -> Result<Sort> {
    // A suffix that is not a direction belongs to the column name
    let (column, direction) = match raw.rsplit_once(':') {
        Some((key, dir)) => match dir.parse::<SortDirection>() {
            Ok(direction) => (resolve_column(columns, key)?, direction),
            Err(err) => (
                resolve_column(columns, raw).map_err(|_| anyhow!(err))?,
                SortDirection::Asc,
            ),
        },
        None => (resolve_column(columns, raw)?, SortDirection::Asc),
    };
    Ok(Sort {
        column_id: column.id.clone(),
        direction,
    })
}
