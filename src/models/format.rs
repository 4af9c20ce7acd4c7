//! Input and display formatting helpers.

use chrono::{DateTime, Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.]").expect("Invalid non-numeric regex"));

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+.?([0-9]+)?").expect("Invalid number regex"));

/// Sanitise free-form amount input into a decimal string.
///
/// Drops everything but digits and the decimal point, keeps the first
/// number, and strips leading zeros unless the number is nothing but zeros.
/// A trailing point is kept so the user can keep typing decimals.
pub fn format_input_number(input: &str) -> String {
    let cleaned = NON_NUMERIC.replace_all(input, "");
    let Some(number) = NUMBER.find(&cleaned) else {
        return "0".to_string();
    };
    let number = number.as_str();
    let trimmed = number.trim_start_matches('0');
    if trimmed.is_empty() {
        number.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Render a timestamp as `yyyy-MM-dd hh:mm:ss AM` in local time.
pub fn format_timestamp(timestamp: Option<DateTime<chrono::Utc>>) -> String {
    match timestamp {
        Some(ts) => format_in(ts, &Local),
        None => String::new(),
    }
}

fn format_in<Tz: TimeZone>(timestamp: DateTime<chrono::Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp
        .with_timezone(tz)
        .format("%Y-%m-%d %I:%M:%S %p")
        .to_string()
}
