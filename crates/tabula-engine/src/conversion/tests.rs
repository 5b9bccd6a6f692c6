//! Tests for column type conversion

use super::*;
use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> CellValue {
    CellValue::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn sample(ty: ColumnType) -> CellValue {
    match ty {
        ColumnType::Text => CellValue::Text("hello".into()),
        ColumnType::Number => CellValue::Number(3.5),
        ColumnType::Select => CellValue::Select("high".into()),
        ColumnType::MultiSelect => CellValue::MultiSelect(vec!["a".into(), "b".into()]),
        ColumnType::Date => date(2024, 5, 1),
        ColumnType::DateTime => CellValue::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        ColumnType::Checkbox => CellValue::Checkbox(true),
        ColumnType::UserLink => CellValue::UserLink(Uuid::nil()),
        ColumnType::TableLink => CellValue::TableLink(Uuid::nil()),
    }
}

// ============================================================================
// Matrix
// ============================================================================

#[test]
fn test_identity_conversion_for_every_type() {
    for ty in ColumnType::ALL {
        let value = sample(ty);
        assert_eq!(convert_value(&value, ty, ty), Ok(value.clone()));
        assert_eq!(convert_value(&CellValue::Null, ty, ty), Ok(CellValue::Null));
    }
}

#[test]
fn test_every_type_converts_to_text() {
    for ty in ColumnType::ALL {
        assert!(is_conversion_permitted(ty, ColumnType::Text), "{} -> text", ty);
        assert!(can_convert_value(&sample(ty), ty, ColumnType::Text));
    }
}

#[rstest]
#[case::number_to_date(ColumnType::Number, ColumnType::Date)]
#[case::checkbox_to_select(ColumnType::Checkbox, ColumnType::Select)]
#[case::multi_to_select(ColumnType::MultiSelect, ColumnType::Select)]
#[case::text_to_multi(ColumnType::Text, ColumnType::MultiSelect)]
#[case::text_to_user(ColumnType::Text, ColumnType::UserLink)]
#[case::user_to_table(ColumnType::UserLink, ColumnType::TableLink)]
#[case::date_to_number(ColumnType::Date, ColumnType::Number)]
fn test_not_permitted(#[case] from: ColumnType, #[case] to: ColumnType) {
    assert!(!is_conversion_permitted(from, to));
    assert_eq!(
        convert_value(&sample(from), from, to),
        Err(ConversionError::NotPermitted { from, to })
    );
    // Empty values do not slip through a forbidden pair
    assert!(!can_convert_value(&CellValue::Null, from, to));
}

#[rstest]
#[case::text_to_number(CellValue::Text("1,234.5".into()), ColumnType::Text, ColumnType::Number, CellValue::Number(1234.5))]
#[case::text_to_checkbox(CellValue::Text("Yes".into()), ColumnType::Text, ColumnType::Checkbox, CellValue::Checkbox(true))]
#[case::text_to_date(CellValue::Text("05/01/2024".into()), ColumnType::Text, ColumnType::Date, date(2024, 5, 1))]
#[case::text_to_select(CellValue::Text(" high ".into()), ColumnType::Text, ColumnType::Select, CellValue::Select("high".into()))]
#[case::number_to_text(CellValue::Number(10.0), ColumnType::Number, ColumnType::Text, CellValue::Text("10".into()))]
#[case::number_to_checkbox(CellValue::Number(-2.0), ColumnType::Number, ColumnType::Checkbox, CellValue::Checkbox(true))]
#[case::zero_to_checkbox(CellValue::Number(0.0), ColumnType::Number, ColumnType::Checkbox, CellValue::Checkbox(false))]
#[case::checkbox_to_number(CellValue::Checkbox(false), ColumnType::Checkbox, ColumnType::Number, CellValue::Number(0.0))]
#[case::checkbox_to_text(CellValue::Checkbox(true), ColumnType::Checkbox, ColumnType::Text, CellValue::Text("true".into()))]
#[case::datetime_to_date(
    CellValue::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap()),
    ColumnType::DateTime,
    ColumnType::Date,
    date(2024, 5, 1)
)]
#[case::date_to_datetime(
    date(2024, 5, 1),
    ColumnType::Date,
    ColumnType::DateTime,
    CellValue::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
)]
#[case::select_to_multi(CellValue::Select("a".into()), ColumnType::Select, ColumnType::MultiSelect, CellValue::MultiSelect(vec!["a".into()]))]
#[case::multi_to_text(
    CellValue::MultiSelect(vec!["a".into(), "b".into()]),
    ColumnType::MultiSelect,
    ColumnType::Text,
    CellValue::Text("a, b".into())
)]
fn test_permitted_conversions(
    #[case] value: CellValue,
    #[case] from: ColumnType,
    #[case] to: ColumnType,
    #[case] expected: CellValue,
) {
    assert_eq!(convert_value(&value, from, to), Ok(expected));
}

#[rstest]
#[case::text_to_number(CellValue::Text("abc".into()), ColumnType::Text, ColumnType::Number)]
#[case::text_to_checkbox(CellValue::Text("maybe".into()), ColumnType::Text, ColumnType::Checkbox)]
#[case::text_to_date(CellValue::Text("someday".into()), ColumnType::Text, ColumnType::DateTime)]
#[case::blank_text_to_select(CellValue::Text("   ".into()), ColumnType::Text, ColumnType::Select)]
fn test_incompatible_values(#[case] value: CellValue, #[case] from: ColumnType, #[case] to: ColumnType) {
    assert!(!can_convert_value(&value, from, to));
    assert!(matches!(
        convert_value(&value, from, to),
        Err(ConversionError::Incompatible { .. })
    ));
}

#[test]
fn test_empty_values_become_null() {
    let empty = CellValue::Text(String::new());
    assert_eq!(
        convert_value(&empty, ColumnType::Text, ColumnType::Number),
        Ok(CellValue::Null)
    );
    assert_eq!(
        convert_value(&CellValue::Null, ColumnType::Date, ColumnType::Text),
        Ok(CellValue::Null)
    );
}

// ============================================================================
// Column Plans
// ============================================================================

fn rows() -> Vec<Row> {
    vec![
        Row::new("r1", 1.0).with("c", CellValue::Text("42".into())),
        Row::new("r2", 2.0),
        Row::new("r3", 3.0).with("c", CellValue::Text("$7".into())),
    ]
}

#[test]
fn test_plan_covers_every_row() {
    let plan = plan_column_conversion(&rows(), "c", ColumnType::Text, ColumnType::Number).unwrap();
    assert_eq!(
        plan.values,
        vec![
            ("r1".to_string(), CellValue::Number(42.0)),
            ("r2".to_string(), CellValue::Null),
            ("r3".to_string(), CellValue::Number(7.0)),
        ]
    );
    assert_eq!(plan.to, ColumnType::Number);
}

#[test]
fn test_plan_is_all_or_nothing() {
    let mut rows = rows();
    rows.push(Row::new("r4", 4.0).with("c", CellValue::Text("n/a".into())));

    let err = plan_column_conversion(&rows, "c", ColumnType::Text, ColumnType::Number).unwrap_err();
    let ColumnConversionError::Blocked(blocked) = err else {
        panic!("expected blocked rows, got {:?}", err);
    };
    let ids: Vec<_> = blocked.iter().map(|b| b.row_id.as_str()).collect();
    assert_eq!(ids, vec!["r4"]);
}

#[test]
fn test_plan_rejects_forbidden_pair_on_empty_table() {
    let err = plan_column_conversion(&Vec::<Row>::new(), "c", ColumnType::Date, ColumnType::Number)
        .unwrap_err();
    assert!(matches!(err, ColumnConversionError::NotPermitted(_)));
}
