//! Index keys: string names for aligned time buckets.
//!
//! An [`Index`] names one repetition of a window and parses back into the
//! `TimeRange` it covers. Two grammars are recognized:
//!
//! - **Duration indexes**: `[<dur>@]<freq>[+<offsetMs>]-<bucket>`, e.g.
//!   `30s-4` (the fifth 30-second bucket), `1h+1800000-3` (hour buckets
//!   shifted by 30 minutes), `5m@1m-7` (a 5-minute window sliding every
//!   minute). The covered range is
//!   `[bucket * freq + offset, bucket * freq + offset + dur)` with `dur`
//!   defaulting to `freq`.
//! - **Calendar indexes**: `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`, resolved
//!   against an IANA timezone (default `Etc/UTC`).
//!
//! The `Display` form regenerates the index string, and parsing that string
//! yields an equal index, so the string doubles as the key equality token.

use crate::duration::Duration;
use crate::error::{Error, Result};
use crate::key::{Key, KeyKind};
use crate::time::{Time, TimeRange};
use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static DURATION_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:([0-9]+[nulsmhdw])@)?([0-9]+[nulsmhdw])(?:\+([0-9]+))?-([0-9]+)$")
        .expect("duration index regex")
});

static CALENDAR_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})(?:-([0-9]{2})(?:-([0-9]{2}))?)?$").expect("calendar index regex")
});

#[derive(Clone, Debug, PartialEq)]
enum IndexSpec {
    Duration {
        duration: Duration,
        frequency: Duration,
        offset: i64,
        bucket: u64,
    },
    Year {
        year: i32,
    },
    Month {
        year: i32,
        month: u32,
    },
    Day {
        year: i32,
        month: u32,
        day: u32,
    },
}

/// A parsed index key. See the [module docs](self) for the grammar.
///
/// # Example
/// ```
/// use tideflow::{Index, Key, Time};
///
/// let idx: Index = "30s-4".parse().unwrap();
/// assert_eq!(idx.begin(), Time::from_ms(120_000));
/// assert_eq!(idx.end(), Time::from_ms(150_000));
/// assert_eq!(idx.to_string(), "30s-4");
///
/// let july: Index = "2015-07".parse().unwrap();
/// assert_eq!(july.begin().to_utc_string(), "2015-07-01T00:00:00+00:00");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Index {
    spec: IndexSpec,
    tz: Tz,
}

impl Index {
    /// Parse an index string against the default `Etc/UTC` timezone.
    pub fn parse(s: &str) -> Result<Self> {
        Self::parse_with_tz(s, chrono_tz::UTC)
    }

    /// Parse an index string; `tz` governs calendar-index boundaries and is
    /// ignored for duration indexes.
    pub fn parse_with_tz(s: &str, tz: Tz) -> Result<Self> {
        if let Some(caps) = CALENDAR_INDEX_RE.captures(s) {
            let year: i32 = caps[1]
                .parse()
                .map_err(|_| Error::MalformedIndexString(s.to_string()))?;
            let month: Option<u32> = caps
                .get(2)
                .map(|m| m.as_str().parse())
                .transpose()
                .map_err(|_| Error::MalformedIndexString(s.to_string()))?;
            let day: Option<u32> = caps
                .get(3)
                .map(|m| m.as_str().parse())
                .transpose()
                .map_err(|_| Error::MalformedIndexString(s.to_string()))?;
            let spec = match (month, day) {
                (None, _) => IndexSpec::Year { year },
                (Some(month), None) => IndexSpec::Month { year, month },
                (Some(month), Some(day)) => IndexSpec::Day { year, month, day },
            };
            let index = Self { spec, tz };
            // Validate the date parts now so begin()/end() cannot fail later.
            index.range_for(s)?;
            return Ok(index);
        }

        if let Some(caps) = DURATION_INDEX_RE.captures(s) {
            let frequency: Duration = caps[2].parse()?;
            let duration = match caps.get(1) {
                Some(d) => d.as_str().parse()?,
                None => frequency,
            };
            let offset: i64 = caps
                .get(3)
                .map_or(Ok(0), |m| m.as_str().parse())
                .map_err(|_| Error::MalformedIndexString(s.to_string()))?;
            let bucket: u64 = caps[4]
                .parse()
                .map_err(|_| Error::MalformedIndexString(s.to_string()))?;
            return Ok(Self {
                spec: IndexSpec::Duration {
                    duration,
                    frequency,
                    offset,
                    bucket,
                },
                tz,
            });
        }

        Err(Error::MalformedIndexString(s.to_string()))
    }

    /// Build a duration index directly from its components. Used by the
    /// window machinery when generating index sets.
    #[must_use]
    pub fn duration_index(duration: Duration, frequency: Duration, offset: i64, bucket: u64) -> Self {
        Self {
            spec: IndexSpec::Duration {
                duration,
                frequency,
                offset,
                bucket,
            },
            tz: chrono_tz::UTC,
        }
    }

    /// The timezone calendar boundaries are resolved against.
    #[must_use]
    pub const fn tz(&self) -> Tz {
        self.tz
    }

    /// The `TimeRange` this index covers.
    #[must_use]
    pub fn as_timerange(&self) -> TimeRange {
        // Calendar parts were validated at parse/construction time.
        self.range_for(&self.to_string())
            .unwrap_or_else(|_| TimeRange::from_ms(0, 0))
    }

    fn range_for(&self, source: &str) -> Result<TimeRange> {
        match &self.spec {
            IndexSpec::Duration {
                duration,
                frequency,
                offset,
                bucket,
            } => {
                let begin = *bucket as i64 * frequency.as_millis() + offset;
                Ok(TimeRange::from_ms(begin, begin + duration.as_millis()))
            }
            IndexSpec::Year { year } => {
                let begin = local_midnight(self.tz, *year, 1, 1, source)?;
                let end = local_midnight(self.tz, year + 1, 1, 1, source)?;
                Ok(TimeRange::new(begin, end))
            }
            IndexSpec::Month { year, month } => {
                let begin = local_midnight(self.tz, *year, *month, 1, source)?;
                let (ny, nm) = if *month == 12 { (year + 1, 1) } else { (*year, month + 1) };
                let end = local_midnight(self.tz, ny, nm, 1, source)?;
                Ok(TimeRange::new(begin, end))
            }
            IndexSpec::Day { year, month, day } => {
                let date = NaiveDate::from_ymd_opt(*year, *month, *day)
                    .ok_or_else(|| Error::MalformedIndexString(source.to_string()))?;
                let next = date
                    .succ_opt()
                    .ok_or_else(|| Error::MalformedIndexString(source.to_string()))?;
                let begin = midnight_of(self.tz, date);
                let end = midnight_of(self.tz, next);
                Ok(TimeRange::new(begin, end))
            }
        }
    }
}

/// Midnight of `(year, month, day)` in `tz`, as an instant.
fn local_midnight(tz: Tz, year: i32, month: u32, day: u32, source: &str) -> Result<Time> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| Error::MalformedIndexString(source.to_string()))?;
    Ok(midnight_of(tz, date))
}

fn midnight_of(tz: Tz, date: NaiveDate) -> Time {
    let naive = date.and_time(NaiveTime::MIN);
    // A DST gap can swallow local midnight; resolve to the earliest valid
    // instant, or fall back to treating the naive time as UTC.
    let dt = tz
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive));
    Time::from_ms(dt.timestamp_millis())
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.spec {
            IndexSpec::Duration {
                duration,
                frequency,
                offset,
                bucket,
            } => {
                if duration != frequency {
                    write!(f, "{duration}@")?;
                }
                write!(f, "{frequency}")?;
                if *offset != 0 {
                    write!(f, "+{offset}")?;
                }
                write!(f, "-{bucket}")
            }
            IndexSpec::Year { year } => write!(f, "{year:04}"),
            IndexSpec::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            IndexSpec::Day { year, month, day } => {
                write!(f, "{year:04}-{month:02}-{day:02}")
            }
        }
    }
}

impl FromStr for Index {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Key for Index {
    const KIND: KeyKind = KeyKind::Index;

    fn timestamp(&self) -> Time {
        self.begin()
    }

    fn begin(&self) -> Time {
        self.as_timerange().begin_time()
    }

    fn end(&self) -> Time {
        self.as_timerange().end_time()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }

    fn from_json(value: &serde_json::Value, tz: Tz) -> Result<Self> {
        let s = value.as_str().ok_or_else(|| Error::InvalidKeyKind {
            op: "Index::from_json",
            expected: KeyKind::Index,
            actual: value.to_string(),
        })?;
        Self::parse_with_tz(s, tz)
    }
}

impl Serialize for Index {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Index {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}
