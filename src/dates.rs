//! Conversions between persisted date strings and display labels.
//!
//! Every function here is fail-open: bad input never panics and never
//! produces an error, it falls back to the raw value or `false`.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

pub const NO_DATE_LABEL: &str = "No date set";

const STORAGE_FORMAT: &str = "%Y-%m-%d";
const LONG_FORMAT: &str = "%A, %B %-d, %Y";
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a calendar date out of a user- or server-supplied string.
///
/// Timestamps keep the calendar day of their own offset.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, STORAGE_FORMAT) {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.date_naive());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|ts| ts.date())
}

/// Long human-readable label, e.g. `Wednesday, December 25, 2024`.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return NO_DATE_LABEL.to_string();
    };

    parse_date(raw)
        .map(|date| date.format(LONG_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub fn is_in_past(value: Option<&str>) -> bool {
    is_in_past_on(value, Local::now().date_naive())
}

/// Same as [`is_in_past`] but against an explicit "today".
pub fn is_in_past_on(value: Option<&str>, today: NaiveDate) -> bool {
    value
        .and_then(parse_date)
        .map(|date| date < today)
        .unwrap_or(false)
}

pub fn to_storage(date: NaiveDate) -> String {
    date.format(STORAGE_FORMAT).to_string()
}
