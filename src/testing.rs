//! Testing utilities for Tideflow pipelines.
//!
//! Helpers for writing idiomatic tests against collections and streams:
//!
//! - **Builders**: generate timestamped event series tersely.
//! - **Assertions**: compare emitted series against expected values with
//!   float tolerance.
//!
//! # Quick Start
//!
//! ```
//! use tideflow::testing::*;
//! use tideflow::{SortedCollection, Time};
//!
//! let series: SortedCollection<Time> = EventSeriesBuilder::new()
//!     .start_ms(0)
//!     .step_ms(1_000)
//!     .values(&[1.0, 2.0, 3.0])
//!     .build()
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(series.size(), 3);
//! assert_values_close(series.events(), "value", &[Some(1.0), Some(2.0), Some(3.0)], 1e-9);
//! ```

use crate::event::Event;
use crate::key::Key;
use crate::time::Time;
use serde_json::Value;

/// Builds `Time`-keyed event series from values or `(timestamp, value)`
/// pairs.
#[derive(Clone, Debug, Default)]
pub struct EventSeriesBuilder {
    start_ms: i64,
    step_ms: i64,
    points: Vec<(i64, Option<f64>)>,
}

impl EventSeriesBuilder {
    /// An empty builder: start at 0, step 1000 ms.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_ms: 0,
            step_ms: 1_000,
            points: Vec::new(),
        }
    }

    /// First timestamp for value-only series.
    #[must_use]
    pub fn start_ms(mut self, start: i64) -> Self {
        self.start_ms = start;
        self
    }

    /// Spacing for value-only series.
    #[must_use]
    pub fn step_ms(mut self, step: i64) -> Self {
        self.step_ms = step;
        self
    }

    /// Append evenly spaced values (starting at `start_ms` plus any points
    /// already added).
    #[must_use]
    pub fn values(mut self, values: &[f64]) -> Self {
        for &v in values {
            let ts = self.start_ms + self.points.len() as i64 * self.step_ms;
            self.points.push((ts, Some(v)));
        }
        self
    }

    /// Append evenly spaced values where `None` becomes a null cell.
    #[must_use]
    pub fn sparse_values(mut self, values: &[Option<f64>]) -> Self {
        for &v in values {
            let ts = self.start_ms + self.points.len() as i64 * self.step_ms;
            self.points.push((ts, v));
        }
        self
    }

    /// Append one explicit `(timestamp, value)` point.
    #[must_use]
    pub fn point(mut self, ts_ms: i64, value: f64) -> Self {
        self.points.push((ts_ms, Some(value)));
        self
    }

    /// Materialize the events.
    #[must_use]
    pub fn build(self) -> Vec<Event<Time>> {
        self.points
            .into_iter()
            .map(|(ts, v)| match v {
                Some(x) => Event::of(Time::from_ms(ts), x),
                None => Event::of(Time::from_ms(ts), Value::Null),
            })
            .collect()
    }
}

/// Assert that the `field` values of `events` match `expected` (None =
/// missing), within `epsilon`.
///
/// # Panics
/// Panics with a positional message on the first mismatch.
pub fn assert_values_close<K: Key>(
    events: &[Event<K>],
    field: &str,
    expected: &[Option<f64>],
    epsilon: f64,
) {
    assert_eq!(
        events.len(),
        expected.len(),
        "expected {} events, got {}",
        expected.len(),
        events.len()
    );
    for (i, (event, want)) in events.iter().zip(expected).enumerate() {
        let got = event.get_f64(field);
        match (got, want) {
            (Some(g), Some(w)) => assert!(
                (g - w).abs() <= epsilon,
                "event {i} field `{field}`: got {g}, expected {w}"
            ),
            (None, None) => {}
            _ => panic!("event {i} field `{field}`: got {got:?}, expected {want:?}"),
        }
    }
}

/// Assert that events occur at exactly the expected millisecond
/// timestamps.
///
/// # Panics
/// Panics with a positional message on the first mismatch.
pub fn assert_timestamps<K: Key>(events: &[Event<K>], expected_ms: &[i64]) {
    let got: Vec<i64> = events.iter().map(|e| e.timestamp().ms()).collect();
    assert_eq!(got, expected_ms, "timestamps differ");
}
