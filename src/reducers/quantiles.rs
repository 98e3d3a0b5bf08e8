//! Quantile reducers: `median`, `percentile`.
//!
//! Percentiles use the closest-ranks method over the sorted sample, with
//! the interpolation between ranks selectable via [`Interp`].

use super::{numeric, Missing, Reducer};
use crate::error::{Error, Result};
use ordered_float::OrderedFloat;

/// How a percentile rank falling between two samples is resolved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Interp {
    /// Linear interpolation between the two closest ranks.
    #[default]
    Linear,
    /// The lower of the two ranks.
    Lower,
    /// The higher of the two ranks.
    Higher,
    /// Whichever rank is nearer (ties go high).
    Nearest,
    /// Mean of the two ranks.
    Midpoint,
}

fn percentile_fold(q: f64, interp: Interp, nums: &[f64]) -> Option<f64> {
    if nums.is_empty() {
        return None;
    }
    let mut sorted: Vec<OrderedFloat<f64>> = nums.iter().copied().map(OrderedFloat).collect();
    sorted.sort_unstable();

    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let frac = pos - pos.floor();
    if frac == 0.0 || lower + 1 >= sorted.len() {
        return Some(sorted[lower].0);
    }
    let lo = sorted[lower].0;
    let hi = sorted[lower + 1].0;
    Some(match interp {
        Interp::Linear => lo + frac * (hi - lo),
        Interp::Lower => lo,
        Interp::Higher => hi,
        Interp::Nearest => {
            if frac < 0.5 {
                lo
            } else {
                hi
            }
        }
        Interp::Midpoint => (lo + hi) / 2.0,
    })
}

/// The `q`-th percentile of the values, `q` in `[0, 100]`.
pub fn percentile(q: f64, interp: Interp, policy: Missing) -> Result<Reducer> {
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::OutOfRangePercentile(q));
    }
    Ok(numeric("percentile", policy, move |nums| {
        percentile_fold(q, interp, nums)
    }))
}

/// The median (50th percentile, linear interpolation).
#[must_use]
pub fn median(policy: Missing) -> Reducer {
    numeric("median", policy, |nums| {
        percentile_fold(50.0, Interp::Linear, nums)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn median_interpolates_even_counts() {
        let values = vec![json!(1), json!(2), json!(3), json!(4)];
        assert_eq!(median(Missing::Ignore).call(&values), json!(2.5));
    }

    #[test]
    fn percentile_interpolation_modes() {
        let values: Vec<_> = [15.0, 20.0, 35.0, 40.0, 50.0].map(|v| json!(v)).into();
        let q = |interp| {
            percentile(30.0, interp, Missing::Ignore)
                .unwrap()
                .call(&values)
        };
        let linear = q(Interp::Linear);
        assert!((linear.as_f64().unwrap() - 23.0).abs() < 1e-9, "got {linear}");
        assert_eq!(q(Interp::Lower), json!(20.0));
        assert_eq!(q(Interp::Higher), json!(35.0));
        assert_eq!(q(Interp::Nearest), json!(20.0));
        assert_eq!(q(Interp::Midpoint), json!(27.5));
    }

    #[test]
    fn out_of_range_rank_is_rejected() {
        assert!(matches!(
            percentile(101.0, Interp::Linear, Missing::Ignore),
            Err(Error::OutOfRangePercentile(_))
        ));
        assert!(percentile(0.0, Interp::Linear, Missing::Ignore).is_ok());
        assert!(percentile(100.0, Interp::Linear, Missing::Ignore).is_ok());
    }
}
