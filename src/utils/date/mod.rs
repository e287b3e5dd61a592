// Date utility functions
// Parsing of event calendar days / wall-clock times and local resolution

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use thiserror::Error;

/// Malformed or unrepresentable event date/time input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemporalError {
    #[error("invalid event date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("invalid event time {0:?} (expected HH:MM or HH:MM:SS)")]
    InvalidTime(String),
    #[error("local time {0} does not exist in this timezone")]
    NonexistentLocalTime(NaiveDateTime),
}

/// Parse a calendar day.
///
/// Accepts `YYYY-MM-DD`, optionally followed by an ISO-8601 time part
/// (`2025-11-01T00:00:00.000Z`), of which only the calendar day is used.
pub fn parse_date(raw: &str) -> Result<NaiveDate, TemporalError> {
    let trimmed = raw.trim();
    let day_part = match trimmed.split_once('T') {
        Some((day, _)) => day,
        None => trimmed,
    };

    NaiveDate::parse_from_str(day_part, "%Y-%m-%d")
        .map_err(|_| TemporalError::InvalidDate(raw.to_string()))
}

/// Parse a wall-clock time. Absent or blank input means midnight.
pub fn parse_time(raw: Option<&str>) -> Result<NaiveTime, TemporalError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(NaiveTime::MIN);
    };

    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| TemporalError::InvalidTime(value.to_string()))
}

/// Resolve a naive local date-time to an instant in the local timezone.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// fall inside a DST gap move forward by one hour.
pub fn resolve_local(naive: NaiveDateTime) -> Result<DateTime<Local>, TemporalError> {
    resolve_in(&Local, naive)
}

pub(crate) fn resolve_in<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
) -> Result<DateTime<Tz>, TemporalError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or(TemporalError::NonexistentLocalTime(naive)),
    }
}

/// Long human form used by the detail view, e.g. `Saturday, 1 November 2025`.
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %-d %B %Y").to_string()
}

/// `HH:MM` form of a stored time, dropping seconds.
pub fn format_short_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
