//! Duration literals.
//!
//! A [`Duration`] is a positive length of time with millisecond resolution
//! (fractional for the nano/micro units). The short-form literal grammar is
//! `<n><unit>` with unit one of:
//!
//! | unit | meaning      |
//! |------|--------------|
//! | `n`  | nanoseconds  |
//! | `u`  | microseconds |
//! | `l`  | milliseconds |
//! | `s`  | seconds      |
//! | `m`  | minutes      |
//! | `h`  | hours        |
//! | `d`  | days         |
//! | `w`  | weeks        |
//!
//! `Display` regenerates the shortest equivalent literal (`60000` ms renders
//! as `1m`), which is what index strings embed.

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)([nulsmhdw])$").expect("duration literal regex")
});

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
const MS_PER_WEEK: f64 = 604_800_000.0;

/// A positive span of time, held as (possibly fractional) milliseconds.
///
/// # Example
/// ```
/// use tideflow::Duration;
///
/// let d: Duration = "30s".parse().unwrap();
/// assert_eq!(d.as_millis(), 30_000);
/// assert_eq!(d.to_string(), "30s");
/// assert_eq!(Duration::minutes(5).to_string(), "5m");
/// ```
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Duration {
    ms: f64,
}

impl Duration {
    /// Construct from whole milliseconds.
    #[must_use]
    pub fn millis(n: i64) -> Self {
        Self { ms: n as f64 }
    }

    /// Construct from nanoseconds (fractional milliseconds).
    #[must_use]
    pub fn nanoseconds(n: i64) -> Self {
        Self { ms: n as f64 / 1_000_000.0 }
    }

    /// Construct from microseconds (fractional milliseconds).
    #[must_use]
    pub fn microseconds(n: i64) -> Self {
        Self { ms: n as f64 / 1_000.0 }
    }

    /// Construct from seconds.
    #[must_use]
    pub fn seconds(n: i64) -> Self {
        Self { ms: n as f64 * MS_PER_SECOND }
    }

    /// Construct from minutes.
    #[must_use]
    pub fn minutes(n: i64) -> Self {
        Self { ms: n as f64 * MS_PER_MINUTE }
    }

    /// Construct from hours.
    #[must_use]
    pub fn hours(n: i64) -> Self {
        Self { ms: n as f64 * MS_PER_HOUR }
    }

    /// Construct from days.
    #[must_use]
    pub fn days(n: i64) -> Self {
        Self { ms: n as f64 * MS_PER_DAY }
    }

    /// Construct from weeks.
    #[must_use]
    pub fn weeks(n: i64) -> Self {
        Self { ms: n as f64 * MS_PER_WEEK }
    }

    /// Whole milliseconds, rounding sub-millisecond durations.
    #[must_use]
    pub fn as_millis(self) -> i64 {
        self.ms.round() as i64
    }

    /// Exact (possibly fractional) milliseconds.
    #[must_use]
    pub const fn as_millis_f64(self) -> f64 {
        self.ms
    }
}

impl FromStr for Duration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let caps = DURATION_RE
            .captures(s)
            .ok_or_else(|| Error::InvalidDurationString(s.to_string()))?;
        let n: i64 = caps[1]
            .parse()
            .map_err(|_| Error::InvalidDurationString(s.to_string()))?;
        if n == 0 {
            return Err(Error::InvalidDurationString(s.to_string()));
        }
        Ok(match &caps[2] {
            "n" => Self::nanoseconds(n),
            "u" => Self::microseconds(n),
            "l" => Self::millis(n),
            "s" => Self::seconds(n),
            "m" => Self::minutes(n),
            "h" => Self::hours(n),
            "d" => Self::days(n),
            "w" => Self::weeks(n),
            unit => return Err(Error::InvalidDurationString(unit.to_string())),
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.ms;
        if ms.fract() != 0.0 || ms < 1.0 {
            let micros = ms * 1_000.0;
            if micros.fract() == 0.0 && micros >= 1.0 {
                return write!(f, "{}u", micros as i64);
            }
            return write!(f, "{}n", (ms * 1_000_000.0).round() as i64);
        }
        let whole = ms as i64;
        for (unit_ms, suffix) in [
            (MS_PER_WEEK as i64, "w"),
            (MS_PER_DAY as i64, "d"),
            (MS_PER_HOUR as i64, "h"),
            (MS_PER_MINUTE as i64, "m"),
            (MS_PER_SECOND as i64, "s"),
        ] {
            if whole % unit_ms == 0 {
                return write!(f, "{}{}", whole / unit_ms, suffix);
            }
        }
        write!(f, "{whole}l")
    }
}
