//! Time types for working-location queries.
//!
//! This module provides [`TimeWindow`], the local calendar day a poll cycle
//! queries, and [`parse_rfc3339`] for reading the timed bounds returned by the
//! calendar API.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A query window over one local calendar day.
///
/// Represents a half-open interval `[start, end)`. Both bounds carry the
/// caller-supplied UTC offset so they serialize back with that offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: DateTime<FixedOffset>,
    /// End of the window (exclusive).
    pub end: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Creates the window from local midnight of `now` to local midnight of
    /// the following day, as seen from `offset`.
    pub fn local_day(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let local_midnight = now
            .with_timezone(&offset)
            .date_naive()
            .and_time(NaiveTime::MIN);
        let utc_midnight = local_midnight - Duration::seconds(i64::from(offset.local_minus_utc()));
        let start = offset.from_utc_datetime(&utc_midnight);

        Self {
            start,
            end: start + Duration::hours(24),
        }
    }

    /// Returns the lower bound as an RFC3339 string (`timeMin`).
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339()
    }

    /// Returns the upper bound as an RFC3339 string (`timeMax`).
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339()
    }

    /// Returns the duration of this time window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Parses an RFC3339 timestamp (`Z` or numeric offset) into UTC.
///
/// Returns `None` for anything chrono cannot read as RFC3339.
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
