//! Time types
//!
//! - `Timestamp`: serializable millisecond timestamp used for ids, cache busting and persistence
//! - `Date`: operational wrapper around `chrono` for `now()`, parsing and formatting

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};
use std::time::Duration;

// =========================================================
// Timestamp
// =========================================================

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    #[inline]
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs.as_millis() as i64)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = Duration;

    /// Saturates at zero when `rhs` is later than `self`.
    fn sub(self, rhs: Timestamp) -> Self::Output {
        let diff_ms = (self.0 - rhs.0).max(0);
        Duration::from_millis(diff_ms as u64)
    }
}

// =========================================================
// Date
// =========================================================

/// Operational time type backed by `chrono::DateTime<Utc>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date(DateTime<Utc>);

impl Date {
    #[inline]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    #[inline]
    pub fn now_timestamp() -> Timestamp {
        Timestamp(Utc::now().timestamp_millis())
    }

    /// Returns `None` for timestamps outside chrono's representable range.
    pub fn from_timestamp(ts: Timestamp) -> Option<Self> {
        Utc.timestamp_millis_opt(ts.0).single().map(Self)
    }

    /// Parses an RFC 3339 string, e.g. `2025-01-31T10:15:00.000Z`.
    pub fn parse(s: &str) -> Option<Self> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| Self(dt.with_timezone(&Utc)))
    }

    #[inline]
    pub fn timestamp(&self) -> Timestamp {
        Timestamp(self.0.timestamp_millis())
    }

    /// ISO form with millisecond precision, as stored under the last-login key.
    pub fn to_iso_string(&self) -> String {
        self.0.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }

    /// Local-time stamp used in export file names: `YYYYMMDD_HHMM`.
    pub fn file_stamp(&self) -> String {
        self.0.with_timezone(&Local).format("%Y%m%d_%H%M").to_string()
    }

    /// UTC variant of [`Date::file_stamp`], stable regardless of host timezone.
    pub fn file_stamp_utc(&self) -> String {
        self.0.format("%Y%m%d_%H%M").to_string()
    }
}

impl From<Date> for Timestamp {
    fn from(date: Date) -> Self {
        date.timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_round_trip_keeps_millis() {
        let date = Date::from_timestamp(Timestamp::new(1_700_000_000_123)).unwrap();
        let iso = date.to_iso_string();
        assert_eq!(iso, "2023-11-14T22:13:20.123Z");
        assert_eq!(Date::parse(&iso).unwrap().timestamp().as_millis(), 1_700_000_000_123);
    }

    #[test]
    fn file_stamp_is_minute_precision() {
        let date = Date::from_timestamp(Timestamp::new(1_700_000_000_123)).unwrap();
        assert_eq!(date.file_stamp_utc(), "20231114_2213");
    }

    #[test]
    fn sub_saturates() {
        let early = Timestamp::new(1_000);
        let late = Timestamp::new(4_500);
        assert_eq!(late - early, Duration::from_millis(3_500));
        assert_eq!(early - late, Duration::ZERO);
    }
}
