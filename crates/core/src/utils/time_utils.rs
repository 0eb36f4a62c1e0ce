use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::constants::DATE_FORMAT;
use crate::errors::ValidationError;

/// Today's date in UTC. All day boundaries in tokenrate are UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Midnight UTC at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|source| {
        ValidationError::InvalidDate {
            value: value.to_string(),
            source,
        }
    })
}

/// Formats a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses an optional date; an absent or blank value means `default`.
pub fn parse_date_or(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate, ValidationError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_date(v),
        _ => Ok(default),
    }
}

pub fn get_days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    if start > end {
        return Vec::new();
    }
    start.iter_days().take_while(|day| *day <= end).collect()
}
