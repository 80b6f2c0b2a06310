//! Free-text date-time normalization for event inserts.
//!
//! Board date columns reach us in a handful of shapes. Anything that already
//! looks like RFC 3339 (`YYYY-MM-DDTHH:MM...`) passes through untouched; the
//! local forms below are read at the caller's UTC offset:
//!
//! - `02 May 2024 09:30` (full English month name, any case)
//! - `2024-05-02 09:30` or `2024/05/02 09:30`
//! - `02-05-2024 09:30` or `02/05/2024 09:30` (day first)
//!
//! Impossible dates and times (`2024-02-30`, `25:00`) are rejected.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RFC3339_PREFIX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}").ok());
static DAY_MONTH_NAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d{2})\s+([A-Za-z]+)\s+(\d{4})\s+(\d{2}):(\d{2})$").ok());
static YEAR_FIRST: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{2})[-/](\d{2})\s+(\d{2}):(\d{2})$").ok());
static DAY_FIRST: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(\d{2})[-/](\d{2})[-/](\d{4})\s+(\d{2}):(\d{2})$").ok());

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Normalize `input` to an RFC 3339 date-time, or `None` when it matches no
/// accepted form.
pub fn normalize_date_time(input: &str, utc_offset: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if RFC3339_PREFIX.as_ref().is_some_and(|pattern| pattern.is_match(trimmed)) {
        return Some(trimmed.to_string());
    }

    let (year, month, day, hour, minute) = parse_local(trimmed)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
    Some(format!("{}T{}{utc_offset}", date.format("%Y-%m-%d"), time.format("%H:%M:%S")))
}

type LocalParts = (i32, u32, u32, u32, u32);

fn parse_local(text: &str) -> Option<LocalParts> {
    if let Some(caps) = captures(&DAY_MONTH_NAME, text) {
        let month = month_number(caps.get(2)?.as_str())?;
        return Some((field(&caps, 3)?, month, field(&caps, 1)?, field(&caps, 4)?, field(&caps, 5)?));
    }
    if let Some(caps) = captures(&YEAR_FIRST, text) {
        return Some((
            field(&caps, 1)?,
            field(&caps, 2)?,
            field(&caps, 3)?,
            field(&caps, 4)?,
            field(&caps, 5)?,
        ));
    }
    let caps = captures(&DAY_FIRST, text)?;
    Some((field(&caps, 3)?, field(&caps, 2)?, field(&caps, 1)?, field(&caps, 4)?, field(&caps, 5)?))
}

fn captures<'t>(pattern: &Lazy<Option<Regex>>, text: &'t str) -> Option<Captures<'t>> {
    pattern.as_ref()?.captures(text)
}

fn field<T: FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_ascii_lowercase();
    let index = MONTHS.iter().position(|month| *month == name)?;
    u32::try_from(index + 1).ok()
}
