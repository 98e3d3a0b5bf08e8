//! Instant and interval keys.
//!
//! [`Time`] is a millisecond-precision instant since the Unix epoch (UTC),
//! and [`TimeRange`] is an ordered closed interval `[begin, end]` of such
//! instants. Both are event keys; see [`crate::key::Key`].

use crate::error::{Error, Result};
use crate::key::{Key, KeyKind};
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// A single instant, in milliseconds since the Unix epoch (UTC).
///
/// `Time` is `Copy` and totally ordered, so it can be compared and used as a
/// sort key directly. The `Display` form is the raw millisecond count, which
/// is also the canonical key string.
///
/// # Example
/// ```
/// use tideflow::Time;
///
/// let t = Time::from_ms(1_465_084_800_000);
/// assert_eq!(t.ms(), 1_465_084_800_000);
/// assert_eq!(t.to_string(), "1465084800000");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Time(i64);

impl Time {
    /// Construct from milliseconds since the epoch.
    #[inline]
    #[must_use]
    pub const fn from_ms(ms: i64) -> Self {
        Self(ms)
    }

    /// Milliseconds since the epoch.
    #[inline]
    #[must_use]
    pub const fn ms(self) -> i64 {
        self.0
    }

    /// The same instant as a chrono UTC datetime, when representable.
    #[must_use]
    pub fn as_utc(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }

    /// RFC 3339 rendering, falling back to the millisecond count for
    /// out-of-range instants. Used for human-facing log lines.
    #[must_use]
    pub fn to_utc_string(self) -> String {
        self.as_utc()
            .map_or_else(|| self.0.to_string(), |dt| dt.to_rfc3339())
    }
}

impl From<i64> for Time {
    fn from(ms: i64) -> Self {
        Self(ms)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Key for Time {
    const KIND: KeyKind = KeyKind::Time;

    fn timestamp(&self) -> Time {
        *self
    }

    fn begin(&self) -> Time {
        *self
    }

    fn end(&self) -> Time {
        *self
    }

    fn to_json(&self) -> serde_json::Value {
        json!(self.0)
    }

    fn from_json(value: &serde_json::Value, _tz: Tz) -> Result<Self> {
        value.as_i64().map(Self::from_ms).ok_or_else(|| Error::InvalidKeyKind {
            op: "Time::from_json",
            expected: KeyKind::Time,
            actual: value.to_string(),
        })
    }
}

/// An ordered closed interval `[begin, end]` with `begin <= end`.
///
/// The representative timestamp of a range is its midpoint. The `Display`
/// form is `"<beginMs>,<endMs>"`, the canonical key string.
///
/// # Example
/// ```
/// use tideflow::{Time, TimeRange};
///
/// let tr = TimeRange::from_ms(1_000, 3_000);
/// assert_eq!(tr.timestamp_key(), Time::from_ms(2_000));
/// assert_eq!(tr.to_string(), "1000,3000");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    begin: Time,
    end: Time,
}

impl TimeRange {
    /// Construct a range from two instants, swapping them if given out of
    /// order so the `begin <= end` invariant always holds.
    #[must_use]
    pub fn new(a: Time, b: Time) -> Self {
        if b < a {
            Self { begin: b, end: a }
        } else {
            Self { begin: a, end: b }
        }
    }

    /// Construct from millisecond bounds.
    #[must_use]
    pub fn from_ms(begin: i64, end: i64) -> Self {
        Self::new(Time::from_ms(begin), Time::from_ms(end))
    }

    /// Inclusive lower bound.
    #[inline]
    #[must_use]
    pub const fn begin_time(&self) -> Time {
        self.begin
    }

    /// Upper bound.
    #[inline]
    #[must_use]
    pub const fn end_time(&self) -> Time {
        self.end
    }

    /// The midpoint instant.
    #[must_use]
    pub const fn timestamp_key(&self) -> Time {
        Time::from_ms((self.begin.ms() + self.end.ms()) / 2)
    }

    /// Length of the range in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> i64 {
        self.end.ms() - self.begin.ms()
    }

    /// True when `t` lies within `[begin, end]`.
    #[must_use]
    pub fn contains(&self, t: Time) -> bool {
        self.begin <= t && t <= self.end
    }

    /// True when the two ranges share at least one instant.
    #[must_use]
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.begin.ms(), self.end.ms())
    }
}

impl Key for TimeRange {
    const KIND: KeyKind = KeyKind::TimeRange;

    fn timestamp(&self) -> Time {
        self.timestamp_key()
    }

    fn begin(&self) -> Time {
        self.begin
    }

    fn end(&self) -> Time {
        self.end
    }

    fn to_json(&self) -> serde_json::Value {
        json!([self.begin.ms(), self.end.ms()])
    }

    fn from_json(value: &serde_json::Value, _tz: Tz) -> Result<Self> {
        let invalid = || Error::InvalidKeyKind {
            op: "TimeRange::from_json",
            expected: KeyKind::TimeRange,
            actual: value.to_string(),
        };
        let pair = value.as_array().ok_or_else(invalid)?;
        if pair.len() != 2 {
            return Err(invalid());
        }
        let begin = pair[0].as_i64().ok_or_else(invalid)?;
        let end = pair[1].as_i64().ok_or_else(invalid)?;
        Ok(Self::from_ms(begin, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_normalizes_order() {
        let tr = TimeRange::from_ms(3_000, 1_000);
        assert_eq!(tr.begin_time().ms(), 1_000);
        assert_eq!(tr.end_time().ms(), 3_000);
    }

    #[test]
    fn range_midpoint_and_containment() {
        let tr = TimeRange::from_ms(1_000, 3_000);
        assert_eq!(tr.timestamp_key().ms(), 2_000);
        assert!(tr.contains(Time::from_ms(1_000)));
        assert!(tr.contains(Time::from_ms(3_000)));
        assert!(!tr.contains(Time::from_ms(3_001)));
    }

    #[test]
    fn key_strings_round_trip_through_json() {
        let t = Time::from_ms(42);
        assert_eq!(
            Time::from_json(&t.to_json(), chrono_tz::UTC).unwrap(),
            t
        );

        let tr = TimeRange::from_ms(10, 20);
        assert_eq!(
            TimeRange::from_json(&tr.to_json(), chrono_tz::UTC).unwrap(),
            tr
        );
    }
}
