//! The key abstraction shared by every event.
//!
//! An event is tagged with exactly one of three key variants:
//!
//! - [`Time`](crate::time::Time): a single millisecond instant.
//! - [`TimeRange`](crate::time::TimeRange): an ordered `(begin, end)` pair.
//! - [`Index`](crate::index::Index): a string naming one repetition of a
//!   window (e.g. `30s-4` or `2015-07`).
//!
//! All three implement [`Key`]. The canonical `Display` form of a key is its
//! equality token: two events are duplicates exactly when their key strings
//! match, which unifies the three variants in group-by and dedup paths.

use crate::error::Result;
use crate::time::Time;
use chrono_tz::Tz;
use std::fmt;

/// Discriminates the three key variants at runtime.
///
/// Used in error reporting and by the wire format, where the first column
/// names the key kind of the whole series.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// A single instant.
    Time,
    /// An ordered `(begin, end)` pair.
    TimeRange,
    /// A named, aligned bucket.
    Index,
}

impl KeyKind {
    /// The wire-format column name for this kind.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::TimeRange => "timerange",
            Self::Index => "index",
        }
    }

    /// Parse a wire-format column name.
    #[must_use]
    pub fn from_column_name(name: &str) -> Option<Self> {
        match name {
            "time" => Some(Self::Time),
            "timerange" => Some(Self::TimeRange),
            "index" => Some(Self::Index),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A key that tags an event for ordering, grouping, and windowing.
///
/// The `Display` implementation is the canonical string form: it round-trips
/// through the corresponding parser and serves as the equality token for
/// dedup and group-by. `begin()` and `end()` bound the key's extent on the
/// time axis; for a [`Time`] key both equal the instant itself.
pub trait Key: Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    /// The runtime variant of this key type.
    const KIND: KeyKind;

    /// The representative instant of the key. For ranges this is the
    /// midpoint; for indexes, the begin of the covered range.
    fn timestamp(&self) -> Time;

    /// Inclusive lower bound of the key's extent.
    fn begin(&self) -> Time;

    /// Upper bound of the key's extent.
    fn end(&self) -> Time;

    /// The JSON value used for this key in the wire format: a millisecond
    /// number for times, a `[begin, end]` pair for ranges, an index string
    /// for indexes.
    fn to_json(&self) -> serde_json::Value;

    /// Decode a wire-format key cell. `tz` only affects calendar indexes;
    /// the other variants ignore it.
    fn from_json(value: &serde_json::Value, tz: Tz) -> Result<Self>;

    /// The canonical string form (same as `Display`).
    fn key_string(&self) -> String {
        self.to_string()
    }
}
