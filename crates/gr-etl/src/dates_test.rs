use super::*;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn date_key_is_yyyymmdd() {
    assert_eq!(date_key(date(2024, 3, 2)), 20240302);
    assert_eq!(date_key(date(2020, 1, 1)), 20200101);
    assert_eq!(date_key(date(2025, 12, 31)), 20251231);
}

#[test]
fn saturday_attributes() {
    let row = DateRow::for_date(date(2024, 3, 2));

    assert_eq!(row.date_key, 20240302);
    assert_eq!(row.day, 2);
    assert_eq!(row.month, 3);
    assert_eq!(row.quarter, 1);
    assert_eq!(row.year, 2024);
    assert_eq!(row.day_of_week, 6);
    assert_eq!(row.day_name, "Saturday");
    assert_eq!(row.month_name, "March");
    assert!(row.is_weekend);
}

#[test]
fn monday_is_not_weekend() {
    let row = DateRow::for_date(date(2024, 3, 4));

    assert_eq!(row.day_of_week, 1);
    assert_eq!(row.day_name, "Monday");
    assert!(!row.is_weekend);
}

#[test]
fn sunday_is_weekend() {
    let row = DateRow::for_date(date(2024, 3, 3));

    assert_eq!(row.day_of_week, 7);
    assert_eq!(row.day_name, "Sunday");
    assert!(row.is_weekend);
}

#[test]
fn quarter_boundaries() {
    assert_eq!(DateRow::for_date(date(2024, 1, 15)).quarter, 1);
    assert_eq!(DateRow::for_date(date(2024, 3, 31)).quarter, 1);
    assert_eq!(DateRow::for_date(date(2024, 4, 1)).quarter, 2);
    assert_eq!(DateRow::for_date(date(2024, 6, 30)).quarter, 2);
    assert_eq!(DateRow::for_date(date(2024, 7, 1)).quarter, 3);
    assert_eq!(DateRow::for_date(date(2024, 10, 1)).quarter, 4);
    assert_eq!(DateRow::for_date(date(2024, 12, 31)).quarter, 4);
}

#[test]
fn month_names_cover_the_year() {
    let names: Vec<&str> = (1..=12)
        .map(|m| DateRow::for_date(date(2024, m, 1)).month_name)
        .collect();
    assert_eq!(
        names,
        vec![
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December"
        ]
    );
}

#[test]
fn calendar_rows_cover_inclusive_window() {
    let rows = calendar_rows(date(2024, 2, 27), date(2024, 3, 2));

    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].date_key, 20240227);
    assert_eq!(rows[2].date_key, 20240229);
    assert_eq!(rows[4].date_key, 20240302);
}

#[test]
fn calendar_rows_single_day_window() {
    let rows = calendar_rows(date(2024, 5, 10), date(2024, 5, 10));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date_key, 20240510);
}

#[test]
fn calendar_rows_inverted_window_is_empty() {
    let rows = calendar_rows(date(2024, 5, 10), date(2024, 5, 9));
    assert!(rows.is_empty());
}

#[test]
fn leap_day_is_present() {
    let rows = calendar_rows(date(2024, 2, 28), date(2024, 3, 1));
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1].day, 29);
    assert_eq!(rows[1].month_name, "February");
}
