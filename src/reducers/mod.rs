//! Built-in reducers for aggregation.
//!
//! A [`Reducer`] is a pure function from a list of dynamic values to a
//! single value, bundled with a **missing-value policy** ([`Missing`]) that
//! cleans the list before reduction:
//!
//! - [`Missing::Keep`] — missing entries stay in the list (a numeric
//!   reduction over a kept null yields null).
//! - [`Missing::Ignore`] — missing entries are dropped.
//! - [`Missing::Zero`] — missing entries are replaced with `0`.
//! - [`Missing::Propagate`] — any missing entry short-circuits the whole
//!   reduction to null.
//! - [`Missing::NoneIfEmpty`] — an empty input short-circuits to null,
//!   otherwise the list passes through untouched.
//!
//! The factories:
//!
//! - [`sum`] / [`count`] / [`min`] / [`max`] / [`difference`] — `basic`
//! - [`first`] / [`last`] / [`keep`] — `basic` (operate on raw values)
//! - [`avg`] / [`stdev`] — `statistical`
//! - [`median`] / [`percentile`] — `quantiles`
//!
//! # Example
//! ```
//! use tideflow::reducers::{avg, Missing};
//! use serde_json::{json, Value};
//!
//! let r = avg(Missing::Ignore);
//! let out = r.call(&[json!(1.0), Value::Null, json!(3.0)]);
//! assert_eq!(out, json!(2.0));
//!
//! let strict = avg(Missing::Propagate);
//! assert_eq!(strict.call(&[json!(1.0), Value::Null]), Value::Null);
//! ```

pub mod basic;
pub mod quantiles;
pub mod statistical;

pub use basic::{count, difference, first, keep, last, max, min, sum};
pub use quantiles::{median, percentile, Interp};
pub use statistical::{avg, stdev};

use crate::value::{as_f64, is_missing, number};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Missing-value policy applied before a reduction runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Missing {
    /// Keep missing entries in place.
    Keep,
    /// Drop missing entries.
    #[default]
    Ignore,
    /// Replace missing entries with zero.
    Zero,
    /// Any missing entry makes the whole result null.
    Propagate,
    /// Null on empty input, untouched otherwise.
    NoneIfEmpty,
}

/// Clean a value list per policy. `None` short-circuits the reduction to
/// null.
#[must_use]
pub fn clean(values: &[Value], policy: Missing) -> Option<Vec<Value>> {
    match policy {
        Missing::Keep => Some(values.to_vec()),
        Missing::Ignore => Some(
            values
                .iter()
                .filter(|v| !is_missing(Some(v)))
                .cloned()
                .collect(),
        ),
        Missing::Zero => Some(
            values
                .iter()
                .map(|v| {
                    if is_missing(Some(v)) {
                        Value::from(0)
                    } else {
                        v.clone()
                    }
                })
                .collect(),
        ),
        Missing::Propagate => {
            if values.iter().any(|v| is_missing(Some(v))) {
                None
            } else {
                Some(values.to_vec())
            }
        }
        Missing::NoneIfEmpty => {
            if values.is_empty() {
                None
            } else {
                Some(values.to_vec())
            }
        }
    }
}

/// A named, shareable reduction function.
///
/// `call` never fails: inputs that cannot be reduced (an empty cleaned
/// list, a non-numeric value under a numeric reduction, a short-circuiting
/// policy) produce `Value::Null`.
#[derive(Clone)]
pub struct Reducer {
    name: &'static str,
    func: Arc<dyn Fn(&[Value]) -> Value + Send + Sync>,
}

impl Reducer {
    /// Wrap a raw reduction function.
    pub fn new(name: &'static str, func: impl Fn(&[Value]) -> Value + Send + Sync + 'static) -> Self {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// The factory name (`"sum"`, `"avg"`, ...), used in debug output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the reduction.
    #[must_use]
    pub fn call(&self, values: &[Value]) -> Value {
        (self.func)(values)
    }
}

impl fmt::Debug for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reducer").field("name", &self.name).finish()
    }
}

/// Build a numeric reducer: clean per policy, convert every survivor to
/// `f64` (any failure nulls the result), then fold.
pub(crate) fn numeric(
    name: &'static str,
    policy: Missing,
    fold: impl Fn(&[f64]) -> Option<f64> + Send + Sync + 'static,
) -> Reducer {
    Reducer::new(name, move |values| {
        let Some(cleaned) = clean(values, policy) else {
            return Value::Null;
        };
        if cleaned.is_empty() {
            return Value::Null;
        }
        let nums: Option<Vec<f64>> = cleaned.iter().map(as_f64).collect();
        match nums {
            Some(nums) => fold(&nums).map_or(Value::Null, number),
            None => Value::Null,
        }
    })
}
