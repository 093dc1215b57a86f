//! Calendar attributes for the date dimension.

use chrono::{Datelike, NaiveDate};

/// One `dim_date` row, fully derived from the calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRow {
    pub date_key: i32,
    pub full_date: NaiveDate,
    pub day: u32,
    pub month: u32,
    pub quarter: u32,
    pub year: i32,
    pub day_of_week: u32,
    pub day_name: &'static str,
    pub month_name: &'static str,
    pub is_weekend: bool,
}

/// Smart key in YYYYMMDD form, e.g. 2024-03-02 -> 20240302.
pub fn date_key(date: NaiveDate) -> i32 {
    date.year() * 10_000 + date.month() as i32 * 100 + date.day() as i32
}

impl DateRow {
    /// Derive every dimension attribute for one date. Day-of-week is
    /// 1 = Monday .. 7 = Sunday; Saturday and Sunday are weekend days.
    pub fn for_date(date: NaiveDate) -> Self {
        let month = date.month();
        let day_of_week = date.weekday().number_from_monday();
        Self {
            date_key: date_key(date),
            full_date: date,
            day: date.day(),
            month,
            quarter: (month - 1) / 3 + 1,
            year: date.year(),
            day_of_week,
            day_name: day_name(day_of_week),
            month_name: month_name(month),
            is_weekend: day_of_week >= 6,
        }
    }
}

/// All rows for the inclusive window `[start, end]`. An inverted window
/// yields no rows.
pub fn calendar_rows(start: NaiveDate, end: NaiveDate) -> Vec<DateRow> {
    let mut rows = Vec::new();
    let mut current = start;
    while current <= end {
        rows.push(DateRow::for_date(current));
        let Some(next) = current.succ_opt() else {
            break;
        };
        current = next;
    }
    rows
}

fn day_name(day_of_week: u32) -> &'static str {
    match day_of_week {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Sunday",
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

#[cfg(test)]
#[path = "dates_test.rs"]
mod tests;
