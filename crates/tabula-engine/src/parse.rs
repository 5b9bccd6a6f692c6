//! Lenient parsing of numbers, checkbox literals and UUIDs

use tabula_core::CellValue;
use uuid::Uuid;

const CURRENCY_SYMBOLS: &[char] = &[
    '$', '€', '£', '¥', '₹', '₩', '₽', '₺', '₪', '₫', '¢', '₱', '₦',
];

/// Parse a number after stripping whitespace, thousands separators and
/// currency symbols. Non-finite results are rejected.
pub fn parse_number(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && !CURRENCY_SYMBOLS.contains(c))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    // f64::from_str also accepts "inf" and "NaN"
    if !cleaned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
    {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `true/1/yes` and `false/0/no`, case-insensitive
pub fn parse_checkbox(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Hyphenated UUID syntax only (`8-4-4-4-12`)
pub fn parse_uuid(input: &str) -> Option<Uuid> {
    if input.len() != 36 {
        return None;
    }
    Uuid::parse_str(input).ok()
}

/// Numeric reading of a cell, parsing text when needed
pub fn number_of(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
        CellValue::Text(s) | CellValue::Select(s) => parse_number(s),
        _ => None,
    }
}

/// Boolean reading of a cell using the checkbox literal rules
pub fn checkbox_of(value: &CellValue) -> Option<bool> {
    match value {
        CellValue::Checkbox(b) => Some(*b),
        CellValue::Text(s) | CellValue::Select(s) => parse_checkbox(s),
        CellValue::Number(n) if *n == 1.0 => Some(true),
        CellValue::Number(n) if *n == 0.0 => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_with_separators_and_symbols() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number("$ 1,000"), Some(1000.0));
        assert_eq!(parse_number("-€12.50"), Some(-12.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1e999"), None);
        assert_eq!(parse_number("$"), None);
        assert_eq!(parse_number("12abc"), None);
    }

    #[test]
    fn uuid_requires_hyphenated_form() {
        assert!(parse_uuid("67e55044-10b1-426f-9247-bb680e5fe0c8").is_some());
        assert!(parse_uuid("67e5504410b1426f9247bb680e5fe0c8").is_none());
        assert!(parse_uuid("not-a-uuid").is_none());
    }
}
