//! Repeating instants: a frequency plus an alignment offset.
//!
//! A [`Period`] describes the infinite sequence of instants
//! `offset + k * frequency` for integer `k`. An instant is *aligned* to the
//! period when it is a member of that sequence. Periods drive the alignment
//! processor and the window machinery.

use crate::duration::Duration;
use crate::time::{Time, TimeRange};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A repeating frequency with a millisecond alignment offset.
///
/// # Example
/// ```
/// use tideflow::{Duration, Period, Time};
///
/// let p = Period::new(Duration::minutes(1));
/// assert!(p.is_aligned(Time::from_ms(120_000)));
/// assert_eq!(p.next(Time::from_ms(90_000)), Time::from_ms(120_000));
/// // `next` of an aligned instant advances by one full frequency.
/// assert_eq!(p.next(Time::from_ms(120_000)), Time::from_ms(180_000));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Period {
    frequency: Duration,
    offset: i64,
}

impl Period {
    /// A period with the given frequency and zero offset.
    #[must_use]
    pub fn new(frequency: Duration) -> Self {
        debug_assert!(frequency.as_millis() > 0, "period frequency must be positive");
        Self { frequency, offset: 0 }
    }

    /// Shift the period's alignment points by `offset_ms`.
    #[must_use]
    pub fn with_offset(mut self, offset_ms: i64) -> Self {
        self.offset = offset_ms;
        self
    }

    /// The repeat frequency.
    #[inline]
    #[must_use]
    pub const fn frequency(&self) -> Duration {
        self.frequency
    }

    /// The alignment offset in milliseconds.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }

    #[inline]
    fn freq_ms(&self) -> i64 {
        self.frequency.as_millis()
    }

    /// True when `t` is a member of the period's instant sequence.
    #[must_use]
    pub fn is_aligned(&self, t: Time) -> bool {
        (t.ms() - self.offset).rem_euclid(self.freq_ms()) == 0
    }

    /// The least aligned instant strictly greater than `t`.
    ///
    /// When `t` is itself aligned the result advances by one full
    /// frequency rather than returning `t`.
    #[must_use]
    pub fn next(&self, t: Time) -> Time {
        let freq = self.freq_ms();
        let base = (t.ms() - self.offset).div_euclid(freq) * freq + self.offset;
        if base > t.ms() {
            Time::from_ms(base)
        } else {
            Time::from_ms(base + freq)
        }
    }

    /// All aligned instants within `[range.begin, range.end)`.
    #[must_use]
    pub fn within(&self, range: &TimeRange) -> Vec<Time> {
        let freq = self.freq_ms();
        let begin = range.begin_time();
        let mut t = if self.is_aligned(begin) { begin } else { self.next(begin) };
        let mut out = Vec::new();
        while t < range.end_time() {
            out.push(t);
            t = Time::from_ms(t.ms() + freq);
        }
        out
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset == 0 {
            write!(f, "{}", self.frequency)
        } else {
            write!(f, "{}+{}", self.frequency, self.offset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_is_strictly_greater_and_aligned() {
        let p = Period::new(Duration::seconds(30)).with_offset(5_000);
        for ms in [0, 4_999, 5_000, 5_001, 34_999, 35_000, -10_000] {
            let t = Time::from_ms(ms);
            let n = p.next(t);
            assert!(n > t, "next({ms}) must be strictly greater");
            assert!(p.is_aligned(n), "next({ms}) must be aligned");
            assert!(
                n.ms() - t.ms() <= 30_000,
                "next({ms}) overshot a full frequency"
            );
        }
    }

    #[test]
    fn within_is_half_open() {
        let p = Period::new(Duration::seconds(30));
        let pts = p.within(&TimeRange::from_ms(0, 90_000));
        assert_eq!(
            pts,
            vec![Time::from_ms(0), Time::from_ms(30_000), Time::from_ms(60_000)]
        );
    }

    #[test]
    fn offset_shifts_alignment() {
        let p = Period::new(Duration::minutes(1)).with_offset(30_000);
        assert!(p.is_aligned(Time::from_ms(30_000)));
        assert!(!p.is_aligned(Time::from_ms(60_000)));
        assert_eq!(p.next(Time::from_ms(0)), Time::from_ms(30_000));
    }
}
