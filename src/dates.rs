use chrono::{Datelike, Local, Months, NaiveDate};

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn today_iso() -> String {
    date_key(local_today())
}

/// Formats wall-clock date components as `YYYY-MM-DD`. `month_index` is
/// zero-based. No validation or timezone handling happens here.
pub fn iso_of(year: i32, month_index: u32, day: u32) -> String {
    format!("{year:04}-{:02}-{day:02}", month_index + 1)
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Strict parse: exactly `YYYY-MM-DD`, zero-padded, and a real calendar day.
pub fn parse_iso(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_only = bytes
        .iter()
        .enumerate()
        .all(|(idx, b)| idx == 4 || idx == 7 || b.is_ascii_digit());
    if !digits_only {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn is_iso_key(value: &str) -> bool {
    parse_iso(value).is_some()
}

/// `None` for a month index past 11 or a year `chrono` cannot represent.
pub fn days_in_month(year: i32, month_index: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month_index.checked_add(1)?, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(last.day())
}

/// Number of blank cells before day 1 in a Sunday-first week grid.
pub fn first_weekday_offset(year: i32, month_index: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month_index + 1, 1)
        .map(|first| first.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

pub fn shift_month(year: i32, month_index: u32, delta: i32) -> Option<(i32, u32)> {
    let absolute = year
        .checked_mul(12)?
        .checked_add(i32::try_from(month_index).ok()?)?
        .checked_add(delta)?;
    Some((absolute.div_euclid(12), absolute.rem_euclid(12) as u32))
}
