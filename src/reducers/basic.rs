//! Basic reducers: `sum`, `count`, `min`, `max`, `difference`, `first`,
//! `last`, `keep`.

use super::{clean, numeric, Missing, Reducer};
use crate::value::is_missing;
use ordered_float::OrderedFloat;
use serde_json::Value;

/// Sum of the (numeric) values.
#[must_use]
pub fn sum(policy: Missing) -> Reducer {
    numeric("sum", policy, |nums| Some(nums.iter().sum()))
}

/// Count of values surviving the policy's cleaning pass.
#[must_use]
pub fn count(policy: Missing) -> Reducer {
    Reducer::new("count", move |values| {
        clean(values, policy).map_or(Value::Null, |cleaned| Value::from(cleaned.len() as u64))
    })
}

/// Minimum value, with NaN-free total ordering.
#[must_use]
pub fn min(policy: Missing) -> Reducer {
    numeric("min", policy, |nums| {
        nums.iter().copied().map(OrderedFloat).min().map(|m| m.0)
    })
}

/// Maximum value.
#[must_use]
pub fn max(policy: Missing) -> Reducer {
    numeric("max", policy, |nums| {
        nums.iter().copied().map(OrderedFloat).max().map(|m| m.0)
    })
}

/// Spread of the values: `max - min`.
#[must_use]
pub fn difference(policy: Missing) -> Reducer {
    numeric("difference", policy, |nums| {
        let lo = nums.iter().copied().map(OrderedFloat).min()?;
        let hi = nums.iter().copied().map(OrderedFloat).max()?;
        Some(hi.0 - lo.0)
    })
}

/// The first value surviving cleaning (any type).
#[must_use]
pub fn first(policy: Missing) -> Reducer {
    Reducer::new("first", move |values| {
        clean(values, policy)
            .and_then(|cleaned| cleaned.into_iter().next())
            .unwrap_or(Value::Null)
    })
}

/// The last value surviving cleaning (any type).
#[must_use]
pub fn last(policy: Missing) -> Reducer {
    Reducer::new("last", move |values| {
        clean(values, policy)
            .and_then(|cleaned| cleaned.into_iter().next_back())
            .unwrap_or(Value::Null)
    })
}

/// The first non-missing value. Intended for fields that are constant
/// within a reduction group (a label carried alongside measurements).
#[must_use]
pub fn keep(policy: Missing) -> Reducer {
    Reducer::new("keep", move |values| {
        let Some(cleaned) = clean(values, policy) else {
            return Value::Null;
        };
        cleaned
            .into_iter()
            .find(|v| !is_missing(Some(v)))
            .unwrap_or(Value::Null)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sum_and_count_respect_policies() {
        let values = vec![json!(3), Value::Null, json!(5)];
        assert_eq!(sum(Missing::Ignore).call(&values), json!(8.0));
        assert_eq!(sum(Missing::Zero).call(&values), json!(8.0));
        assert_eq!(sum(Missing::Propagate).call(&values), Value::Null);
        assert_eq!(count(Missing::Ignore).call(&values), json!(2));
        assert_eq!(count(Missing::Keep).call(&values), json!(3));
    }

    #[test]
    fn min_max_difference() {
        let values = vec![json!(4), json!(-1), json!(7)];
        assert_eq!(min(Missing::Ignore).call(&values), json!(-1.0));
        assert_eq!(max(Missing::Ignore).call(&values), json!(7.0));
        assert_eq!(difference(Missing::Ignore).call(&values), json!(8.0));
    }

    #[test]
    fn first_last_keep_operate_on_raw_values() {
        let values = vec![Value::Null, json!("a"), json!("b")];
        assert_eq!(first(Missing::Ignore).call(&values), json!("a"));
        assert_eq!(first(Missing::Keep).call(&values), Value::Null);
        assert_eq!(last(Missing::Keep).call(&values), json!("b"));
        assert_eq!(keep(Missing::Keep).call(&values), json!("a"));
    }

    #[test]
    fn next_back_is_the_true_last_survivor() {
        let values = vec![json!(1), Value::Null];
        assert_eq!(last(Missing::Ignore).call(&values), json!(1));
    }
}
