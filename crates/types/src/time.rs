//! Time values carried in query responses and expressions.
//!
//! Wraps `chrono` types so callers never depend on `chrono` directly; the
//! underlying representation can change without affecting the value API.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A UTC instant, written on the wire as `{"@ts": "<RFC 3339>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 timestamp, normalising any offset to UTC.
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| Self(dt.with_timezone(&Utc)))
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

/// A calendar date without time zone, written on the wire as `{"@date": "YYYY-MM-DD"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Creates a [`Date`], returning `None` for an invalid calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Creates a [`Date`] from a [`NaiveDate`].
    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parses a `YYYY-MM-DD` date.
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        NaiveDate::parse_from_str(raw, DATE_FORMAT).map(Self)
    }

    /// Returns the underlying [`NaiveDate`].
    pub fn as_naive(self) -> NaiveDate {
        self.0
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_normalises_offset_to_utc() {
        let ts = Timestamp::parse("2015-01-01T02:00:00+02:00").unwrap();
        assert_eq!(ts.to_string(), "2015-01-01T00:00:00Z");
    }

    #[test]
    fn test_timestamp_keeps_subsecond_digits() {
        let ts = Timestamp::parse("1970-01-01T00:00:00.123456789Z").unwrap();
        assert_eq!(ts.to_string(), "1970-01-01T00:00:00.123456789Z");
    }

    #[test]
    fn test_date_round_trips_through_text() {
        let date = Date::parse("1970-01-03").unwrap();
        assert_eq!(Some(date), Date::from_ymd(1970, 1, 3));
        assert_eq!(date.to_string(), "1970-01-03");
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        assert!(Date::parse("1970-13-01").is_err());
        assert!(Date::from_ymd(2023, 2, 30).is_none());
    }
}
