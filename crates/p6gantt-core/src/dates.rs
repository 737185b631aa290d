//! Date normalization for spreadsheet cells.
//!
//! Scheduling exports carry dates in several shapes: native workbook dates,
//! spreadsheet serial numbers, P6-style `DD-Mon-YY` text (often decorated with
//! `*` for constrained dates) and assorted free text. Everything is reduced to
//! a [`NaiveDate`]; anything that cannot be read is `None`, never an error.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::CellValue;

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Plain date layouts tried when the strict P6 pattern does not match.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

/// Timestamp layouts; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

fn p6_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{1,2})-([A-Za-z]{3})-(\d{2,4})$").expect("static date pattern is valid")
    })
}

/// Parse any cell into a calendar date.
///
/// * `Date` cells are returned unchanged.
/// * `Number` cells are spreadsheet serials counted from 1899-12-30; the time
///   fraction is dropped. Zero, negative, non-finite and out-of-range serials
///   are absent.
/// * `Text` cells go through [`parse_date_str`].
/// * `Empty` is absent.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => from_serial(*serial),
        CellValue::Text(text) => parse_date_str(text),
        CellValue::Empty => None,
    }
}

/// Convert a spreadsheet serial number to a date.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 || serial > MAX_SERIAL {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Parse a date from free text.
///
/// The text is trimmed and stripped of `*` markers first. `D[D]-Mon-YY[YY]` is
/// tried strictly (two-digit years below 70 land in the 2000s, the rest in the
/// 1900s); a string that matches the pattern but names an impossible day is
/// absent. Other strings fall back to a list of common layouts.
pub fn parse_date_str(text: &str) -> Option<NaiveDate> {
    let cleaned = text.trim().replace('*', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    if p6_pattern().is_match(cleaned) {
        return parse_p6(cleaned);
    }

    parse_generic(cleaned)
}

fn parse_p6(text: &str) -> Option<NaiveDate> {
    let captures = p6_pattern().captures(text)?;
    let day: u32 = captures[1].parse().ok()?;
    let month = month_from_abbreviation(&captures[2])?;
    let year_digits = &captures[3];
    let mut year: i32 = year_digits.parse().ok()?;
    if year_digits.len() == 2 {
        year += if year < 70 { 2000 } else { 1900 };
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_from_abbreviation(abbreviation: &str) -> Option<u32> {
    let lower = abbreviation.to_ascii_lowercase();
    MONTH_ABBREVIATIONS
        .iter()
        .position(|m| *m == lower)
        .map(|index| index as u32 + 1)
}

fn parse_generic(text: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.date_naive());
    }

    // P6 timestamps: "05-Jan-24 08:00", "05-Jan-24 17:00 A"
    let (first, rest) = text.split_once(char::is_whitespace)?;
    if rest.trim_start().starts_with(|c: char| c.is_ascii_digit()) && p6_pattern().is_match(first)
    {
        return parse_p6(first);
    }

    None
}

/// Zero-padded `YYYY-MM-DD`.
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Display form used in labels and tooltips, e.g. `05 Jan 2024`.
pub fn to_display_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

/// Compact display form for milestone labels, e.g. `05 Jan 24`.
pub fn to_short_display_date(date: NaiveDate) -> String {
    date.format("%d %b %y").to_string()
}

/// Whole days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Shift a date by whole months, clamping the day to the target month's end.
///
/// Out-of-range results leave the date unchanged.
pub fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// First day of the date's month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Calendar months from `from`'s month to `to`'s month, ignoring days.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}
