//! Window families: a duration paired with a repeat period.
//!
//! A [`Window`] describes the family of intervals
//! `[n * freq + offset, n * freq + offset + duration)` for non-negative
//! buckets `n`. With `duration == frequency` the family tiles the time axis
//! (fixed windows); with `duration > frequency` consecutive windows overlap
//! (sliding windows), so a single instant can belong to several.
//!
//! [`Window::index_set`] computes the [`Index`] of every family member
//! containing a query instant; [`Window::index_set_over`] unions the
//! membership of every instant in a range.

use crate::duration::Duration;
use crate::index::Index;
use crate::period::Period;
use crate::time::{Time, TimeRange};
use serde::{Deserialize, Serialize};

/// A repeating interval family: `duration` long, repeating per `period`.
///
/// # Example
/// ```
/// use tideflow::{Duration, Period, Time, Window};
///
/// // Fixed 30 s windows: each instant is in exactly one.
/// let fixed = Window::fixed(Duration::seconds(30));
/// let set = fixed.index_set(Time::from_ms(65_000));
/// assert_eq!(set.len(), 1);
/// assert_eq!(set[0].to_string(), "30s-2");
///
/// // A 5 m window sliding every 1 m: an instant is in up to five.
/// let sliding = Window::sliding(Duration::minutes(5), Period::new(Duration::minutes(1)));
/// assert_eq!(sliding.index_set(Time::from_ms(6 * 60_000)).len(), 5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Window {
    duration: Duration,
    period: Period,
}

impl Window {
    /// Non-overlapping windows: frequency equals duration, zero offset.
    #[must_use]
    pub fn fixed(duration: Duration) -> Self {
        Self {
            duration,
            period: Period::new(duration),
        }
    }

    /// A sliding (or offset) window family with an explicit period.
    #[must_use]
    pub fn sliding(duration: Duration, period: Period) -> Self {
        Self { duration, period }
    }

    /// The length of each window.
    #[inline]
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// The repeat period.
    #[inline]
    #[must_use]
    pub const fn period(&self) -> Period {
        self.period
    }

    /// Bucket numbers `n` with `n*f + o <= t < n*f + o + d`, clamped to
    /// non-negative buckets.
    fn buckets_at(&self, t: Time) -> (i64, i64) {
        let f = self.period.frequency().as_millis();
        let o = self.period.offset();
        let d = self.duration.as_millis();
        let hi = (t.ms() - o).div_euclid(f);
        let lo = ((t.ms() - o - d).div_euclid(f) + 1).max(0);
        (lo, hi)
    }

    fn indexes(&self, lo: i64, hi: i64) -> Vec<Index> {
        let f = self.period.frequency();
        let o = self.period.offset();
        (lo..=hi)
            .map(|n| Index::duration_index(self.duration, f, o, n as u64))
            .collect()
    }

    /// Every window of the family containing `t`, in bucket order.
    #[must_use]
    pub fn index_set(&self, t: Time) -> Vec<Index> {
        let (lo, hi) = self.buckets_at(t);
        if hi < lo {
            return Vec::new();
        }
        self.indexes(lo, hi)
    }

    /// The union of [`Self::index_set`] over every instant in
    /// `[range.begin, range.end]`, in bucket order.
    #[must_use]
    pub fn index_set_over(&self, range: &TimeRange) -> Vec<Index> {
        let (lo, _) = self.buckets_at(range.begin_time());
        let (_, hi) = self.buckets_at(range.end_time());
        if hi < lo {
            return Vec::new();
        }
        self.indexes(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;

    #[test]
    fn fixed_window_membership_is_exact() {
        let w = Window::fixed(Duration::seconds(30));
        for (ms, expected) in [(0, "30s-0"), (29_999, "30s-0"), (30_000, "30s-1"), (65_000, "30s-2")]
        {
            let set = w.index_set(Time::from_ms(ms));
            assert_eq!(set.len(), 1, "t={ms}");
            assert_eq!(set[0].to_string(), expected, "t={ms}");
        }
    }

    #[test]
    fn sliding_window_membership() {
        let w = Window::sliding(Duration::minutes(5), Period::new(Duration::minutes(1)));
        let set = w.index_set(Time::from_ms(6 * 60_000));
        let names: Vec<String> = set.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["5m@1m-2", "5m@1m-3", "5m@1m-4", "5m@1m-5", "5m@1m-6"]);
        for idx in &set {
            assert!(idx.begin().ms() <= 6 * 60_000);
            assert!(6 * 60_000 < idx.end().ms());
        }
    }

    #[test]
    fn early_instants_clamp_to_bucket_zero() {
        let w = Window::sliding(Duration::minutes(5), Period::new(Duration::minutes(1)));
        let set = w.index_set(Time::from_ms(30_000));
        let names: Vec<String> = set.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["5m@1m-0"]);
    }

    #[test]
    fn range_membership_unions_endpoints() {
        let w = Window::fixed(Duration::seconds(30));
        let set = w.index_set_over(&TimeRange::from_ms(10_000, 70_000));
        let names: Vec<String> = set.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["30s-0", "30s-1", "30s-2"]);
    }
}
