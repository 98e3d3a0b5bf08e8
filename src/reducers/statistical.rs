//! Statistical reducers: `avg`, `stdev`.

use super::{numeric, Missing, Reducer};

/// Arithmetic mean of the values.
#[must_use]
pub fn avg(policy: Missing) -> Reducer {
    numeric("avg", policy, |nums| {
        if nums.is_empty() {
            return None;
        }
        Some(nums.iter().sum::<f64>() / nums.len() as f64)
    })
}

/// Population standard deviation of the values.
#[must_use]
pub fn stdev(policy: Missing) -> Reducer {
    numeric("stdev", policy, |nums| {
        if nums.is_empty() {
            return None;
        }
        let n = nums.len() as f64;
        let mean = nums.iter().sum::<f64>() / n;
        let variance = nums.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        Some(variance.sqrt())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn avg_ignores_or_zeroes_missing() {
        let values = vec![json!(1.0), Value::Null, json!(3.0)];
        assert_eq!(avg(Missing::Ignore).call(&values), json!(2.0));
        // With zero-fill the null becomes a third sample.
        assert_eq!(
            avg(Missing::Zero).call(&values),
            json!(4.0 / 3.0)
        );
    }

    #[test]
    fn stdev_of_constant_series_is_zero() {
        let values = vec![json!(5), json!(5), json!(5)];
        assert_eq!(stdev(Missing::Ignore).call(&values), json!(0.0));
    }

    #[test]
    fn stdev_population() {
        let values = vec![json!(2.0), json!(4.0), json!(4.0), json!(4.0), json!(5.0), json!(5.0), json!(7.0), json!(9.0)];
        assert_eq!(stdev(Missing::Ignore).call(&values), json!(2.0));
    }
}
