//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt::Write;

/// Parse a date string in various formats
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset; keep the wall-clock date as written
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Format a date string with a Moment.js-style format
///
/// Dates that cannot be parsed, or that the format can't express, are
/// returned unchanged.
///
/// # Examples
/// ```ignore
/// format_date("2024-01-15", "MMMM D, YYYY") // -> "January 15, 2024"
/// ```
pub fn format_date(date: &str, format: &str) -> String {
    let Some(dt) = parse_date(date) else {
        return date.to_string();
    };

    let mut out = String::new();
    match write!(out, "{}", dt.format(&moment_to_chrono_format(format))) {
        Ok(()) => out,
        Err(_) => {
            tracing::warn!("Date format {:?} can't be applied to {}", format, date);
            date.to_string()
        }
    }
}

/// Machine-readable form for `<time datetime>`
pub fn date_attr(date: &str) -> Option<String> {
    parse_date(date).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each letter so shorter ones don't eat them
    let replacements = [
        // Year
        ("YYYY", "%Y"),
        ("YY", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("M", "%-m"),
        // Day of month
        ("DDDD", "%j"),
        ("DD", "%d"),
        ("D", "%-d"),
        // Hour 24h
        ("HH", "%H"),
        // Hour 12h
        ("hh", "%I"),
        // Minute
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    // Literal percent signs must not reach chrono as specifiers
    let mut result = format.replace('%', "%%");

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
