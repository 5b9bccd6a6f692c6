//! Date and timestamp parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tabula_core::CellValue;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// Parse a timestamp; offset-less forms are read as UTC, bare dates as UTC midnight
pub fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    parse_calendar_date(s).and_then(midnight_utc)
}

/// Parse a calendar date; timestamps yield their UTC date
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    parse_calendar_date(s).or_else(|| parse_instant(s).map(|dt| dt.date_naive()))
}

pub fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

/// Instant reading of a cell, parsing text when needed
pub fn instant_of(value: &CellValue) -> Option<DateTime<Utc>> {
    match value {
        CellValue::Date(d) => midnight_utc(*d),
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(s) | CellValue::Select(s) => parse_instant(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_in_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("2024-03-09"), expected);
        assert_eq!(parse_date("2024/03/09"), expected);
        assert_eq!(parse_date("03/09/2024"), expected);
        assert_eq!(parse_date("March 9, 2024"), expected);
        assert_eq!(parse_date("2024-03-09T23:30:00Z"), expected);
        assert_eq!(parse_date("2024-03-09T23:30:00-05:00"), NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn instants_default_to_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 8, 15, 0).unwrap();
        assert_eq!(parse_instant("2024-03-09T08:15:00Z"), Some(expected));
        assert_eq!(parse_instant("2024-03-09T10:15:00+02:00"), Some(expected));
        assert_eq!(parse_instant("2024-03-09 08:15:00"), Some(expected));
        assert_eq!(parse_instant("2024-03-09T08:15"), Some(expected));
        assert_eq!(
            parse_instant("2024-03-09"),
            Some(Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_instant(""), None);
    }
}
