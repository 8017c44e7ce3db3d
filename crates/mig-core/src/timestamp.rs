//! Millisecond-precision migration timestamps.

use chrono::{DateTime, Utc};
use std::fmt;

/// Creation instant of a migration, stored as milliseconds since the Unix epoch.
///
/// Migrations are totally ordered by this value. Ordering compares the parsed
/// integer, never the decimal text, so `999` sorts before `1000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Wrap a raw epoch-millis value.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Truncate a wall-clock instant to millisecond precision.
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.timestamp_millis())
    }

    /// Milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Convert back to a calendar instant, if representable.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{} ({})", self.0, dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}
