//! Timestamps and calendar days.
//!
//! Records carry epoch seconds (UTC). Two directions need care:
//!
//! - normalizing API or form input, where a bare `YYYY-MM-DD` means **UTC**
//!   midnight of that day;
//! - building date filters and populating forms, where days are **local**
//!   calendar days in the user's time zone.
//!
//! Local time is always explicit: every function that needs it takes a
//! [`chrono_tz::Tz`] or a [`Clock`].

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde_json::Value;

use crate::{EngineError, coerce};

/// Numeric timestamps above this are milliseconds, not seconds.
pub const MILLISECONDS_THRESHOLD: f64 = 1_000_000_000_000.0;

/// Source of "now" for date presets.
pub trait Clock {
    fn now(&self) -> DateTime<Tz>;
}

/// Wall clock in a fixed time zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// A clock stuck at one instant. Mostly for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Tz>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.0
    }
}

/// Seconds from a numeric timestamp that may be in seconds or milliseconds.
pub fn seconds_from_number(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let seconds = if value > MILLISECONDS_THRESHOLD {
        value / 1000.0
    } else {
        value
    };
    seconds.floor() as i64
}

/// Parses a textual timestamp into epoch seconds.
///
/// Tried in order: a bare number (seconds or milliseconds), `YYYY-MM-DD` at
/// UTC midnight, RFC 3339, then a date-time without offset read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();

    if let Some(number) = coerce::parse_number(trimmed) {
        return Some(seconds_from_number(number));
    }

    if let Some(date) = parse_date_only(trimmed) {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().timestamp());
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp());
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc().timestamp())
}

/// Normalizes a JSON timestamp field to epoch seconds; anything unusable is 0.
pub fn normalize_timestamp(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().map(seconds_from_number).unwrap_or(0),
        Some(Value::String(raw)) => parse_timestamp(raw).unwrap_or(0),
        _ => 0,
    }
}

/// Matches exactly `YYYY-MM-DD`.
fn parse_date_only(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(idx, b)| idx == 4 || idx == 7 || b.is_ascii_digit());
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parses a date typed into a date input as a **local** calendar day.
///
/// `YYYY-MM-DD` is taken literally; other date-time strings are converted to
/// `tz` and their local day is used.
pub fn parse_input_date(raw: &str, tz: &Tz) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = parse_date_only(trimmed) {
        return Some(date);
    }
    let seconds = parse_timestamp(trimmed)?;
    DateTime::from_timestamp(seconds, 0).map(|utc| utc.with_timezone(tz).date_naive())
}

/// [`parse_input_date`] for input that must be a date, such as a command-line
/// flag.
pub fn require_input_date(raw: &str, tz: &Tz) -> Result<NaiveDate, EngineError> {
    parse_input_date(raw, tz).ok_or_else(|| EngineError::InvalidDate(raw.to_string()))
}

/// Epoch seconds of a local wall-clock time, resolving DST gaps forward and
/// overlaps to the earlier instant.
fn local_to_epoch(naive: NaiveDateTime, tz: &Tz) -> i64 {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp(),
        LocalResult::None => {
            let shifted = naive + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .map(|dt| dt.timestamp())
                .unwrap_or_else(|| naive.and_utc().timestamp())
        }
    }
}

/// Epoch seconds of `00:00:00.000` local time on `date`.
pub fn start_of_day(date: NaiveDate, tz: &Tz) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| local_to_epoch(naive, tz))
        .unwrap_or_default()
}

/// Epoch seconds of `23:59:59.999` local time on `date`, floored.
pub fn end_of_day(date: NaiveDate, tz: &Tz) -> i64 {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .map(|naive| local_to_epoch(naive, tz))
        .unwrap_or_default()
}

/// First day of the month `offset` months away from `date`'s month.
pub fn first_of_month(date: NaiveDate, offset: i32) -> NaiveDate {
    let months = date.year() * 12 + date.month0() as i32 + offset;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Last day of the month `offset` months away from `date`'s month.
pub fn last_of_month(date: NaiveDate, offset: i32) -> NaiveDate {
    first_of_month(date, offset + 1)
        .pred_opt()
        .unwrap_or(date)
}

/// Local calendar day of `seconds`, as `YYYY-MM-DD`, for populating a date
/// input.
pub fn local_date_string(seconds: i64, tz: &Tz) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(tz).format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Local date and time of `seconds` for list output (`Mar 15, 2024, 10:00`).
pub fn local_datetime_string(seconds: i64, tz: &Tz) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|utc| utc.with_timezone(tz).format("%b %-d, %Y, %H:%M").to_string())
        .unwrap_or_default()
}
