use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::error::EngagementError;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO 8601 timestamp into a UTC instant.
///
/// Offsets are honoured. Timestamps without an offset are read as UTC and a
/// bare date means midnight UTC.
pub fn utc_instant(timestamp: &str) -> Option<DateTime<Utc>> {
    let trimmed = timestamp.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, DAY_FORMAT)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// The UTC calendar day a timestamp falls on.
///
/// `2024-01-01T23:30:00-02:00` lands on `2024-01-02`.
pub fn utc_date(timestamp: &str) -> Option<NaiveDate> {
    utc_instant(timestamp).map(|at| at.date_naive())
}

/// Like [`utc_instant`], but reports which record carried the bad value.
pub fn parse_timestamp(record: &str, timestamp: &str) -> Result<DateTime<Utc>, EngagementError> {
    utc_instant(timestamp).ok_or_else(|| EngagementError::invalid_timestamp(record, timestamp))
}

/// Canonical `YYYY-MM-DD` key for the UTC day of `timestamp`.
///
/// `record` only labels the error.
pub fn day_key(record: &str, timestamp: &str) -> Result<String, EngagementError> {
    parse_timestamp(record, timestamp).map(|at| format_day(at.date_naive()))
}

pub fn format_day(date: NaiveDate) -> String {
    date.format(DAY_FORMAT).to_string()
}
