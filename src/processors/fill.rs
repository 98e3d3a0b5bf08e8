//! Filling of missing values: zero, pad, or linear interpolation.

use super::Processor;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::key::Key;
use crate::value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// The fill strategy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FillMethod {
    /// Replace missing values with zero.
    #[default]
    Zero,
    /// Carry the previous event's value forward.
    Pad,
    /// Interpolate linearly across a bounded run of missing values.
    /// Accepts exactly one field path.
    Linear,
}

impl FromStr for FillMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zero" => Ok(Self::Zero),
            "pad" => Ok(Self::Pad),
            "linear" => Ok(Self::Linear),
            other => Err(Error::UnknownFillMethod(other.to_string())),
        }
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Zero => "zero",
            Self::Pad => "pad",
            Self::Linear => "linear",
        })
    }
}

/// Configuration for [`Fill`].
#[derive(Clone, Debug)]
pub struct FillOptions {
    /// Field paths to fill.
    pub field_spec: Vec<String>,
    /// The fill strategy.
    pub method: FillMethod,
    /// Bound on consecutive fills (zero/pad) or on the buffered run
    /// (linear: a run longer than `limit` is flushed unfilled).
    pub limit: Option<usize>,
}

impl FillOptions {
    /// Zero-fill the `value` field without a limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            field_spec: vec!["value".to_string()],
            method: FillMethod::Zero,
            limit: None,
        }
    }

    /// Replace the field list.
    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.field_spec = fields.iter().map(ToString::to_string).collect();
        self
    }

    /// Set the fill strategy.
    #[must_use]
    pub fn method(mut self, method: FillMethod) -> Self {
        self.method = method;
        self
    }

    /// Bound the fill run length.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Fills missing values in a stream of events.
///
/// Zero and pad fill work per event and per field, tracking a consecutive
/// fill count per field that the `limit` bounds. Linear fill classifies
/// events as valid (numeric at the field) or invalid, buffering invalid
/// events between two valid anchors and interpolating the run once the
/// right anchor arrives; a run longer than `limit` is flushed through
/// unfilled instead.
pub struct Fill<K: Key> {
    options: FillOptions,
    // zero/pad state
    previous: Option<Event<K>>,
    fill_counts: HashMap<String, usize>,
    // linear state
    last_good: Option<Event<K>>,
    buffer: Vec<Event<K>>,
}

impl<K: Key> Fill<K> {
    /// Validate the options and build a fresh processor.
    pub fn new(options: FillOptions) -> Result<Self> {
        if options.method == FillMethod::Linear && options.field_spec.len() != 1 {
            return Err(Error::InvalidFieldSpec(format!(
                "linear fill accepts exactly one field path, got {}",
                options.field_spec.len()
            )));
        }
        Ok(Self {
            options,
            previous: None,
            fill_counts: HashMap::new(),
            last_good: None,
            buffer: Vec::new(),
        })
    }

    fn pad_or_zero(&mut self, event: Event<K>) -> Vec<Event<K>> {
        let mut filled = event;
        for field in &self.options.field_spec {
            if value::is_missing(filled.get(field)) {
                let count = self.fill_counts.entry(field.clone()).or_insert(0);
                if self.options.limit.is_some_and(|limit| *count >= limit) {
                    continue;
                }
                match self.options.method {
                    FillMethod::Zero => {
                        filled = filled.set(field, 0);
                    }
                    FillMethod::Pad => {
                        if let Some(prev_value) = self
                            .previous
                            .as_ref()
                            .and_then(|p| p.get(field))
                            .filter(|v| !value::is_missing(Some(v)))
                            .cloned()
                        {
                            filled = filled.set(field, prev_value);
                        }
                    }
                    FillMethod::Linear => unreachable!("linear fill handled separately"),
                }
                *count += 1;
            } else {
                self.fill_counts.insert(field.clone(), 0);
            }
        }
        // The filled event becomes the pad source, so a run of missing
        // values keeps carrying the same value forward.
        self.previous = Some(filled.clone());
        vec![filled]
    }

    fn interpolate_run(&self, field: &str, anchor: &Event<K>, current: &Event<K>) -> Vec<Event<K>> {
        let (Some(a), Some(b)) = (anchor.get_f64(field), current.get_f64(field)) else {
            return self.buffer.clone();
        };
        let a_ts = anchor.timestamp().ms() as f64;
        let span = current.timestamp().ms() as f64 - a_ts;
        self.buffer
            .iter()
            .map(|e| {
                let f = (e.timestamp().ms() as f64 - a_ts) / span;
                e.set(field, value::number(a + f * (b - a)))
            })
            .collect()
    }

    fn linear(&mut self, event: Event<K>) -> Vec<Event<K>> {
        let field = self.options.field_spec[0].clone();
        let cell = event.get(&field);
        let numeric = cell.and_then(value::as_f64).is_some();
        let missing = value::is_missing(cell);

        if !numeric && !missing {
            // A non-numeric, non-null value cannot participate in
            // interpolation; pass it through untouched.
            warn!(%field, "linear fill skipping a non-numeric value");
            return vec![event];
        }

        if numeric {
            let mut out = Vec::new();
            if let Some(anchor) = self.last_good.take() {
                if !self.buffer.is_empty() {
                    out.extend(self.interpolate_run(&field, &anchor, &event));
                    self.buffer.clear();
                }
            }
            out.push(event.clone());
            self.last_good = Some(event);
            return out;
        }

        // Missing value. Without a left anchor there is nothing to
        // interpolate from; emit unchanged.
        if self.last_good.is_none() {
            return vec![event];
        }
        self.buffer.push(event);
        if self
            .options
            .limit
            .is_some_and(|limit| self.buffer.len() > limit)
        {
            // The run is too long: give up on it, flushing the buffered
            // events unfilled and dropping the anchor.
            self.last_good = None;
            return std::mem::take(&mut self.buffer);
        }
        Vec::new()
    }
}

impl<K: Key> Processor for Fill<K> {
    type In = Event<K>;
    type Out = Event<K>;

    fn process(&mut self, event: Self::In) -> Result<Vec<Self::Out>> {
        Ok(match self.options.method {
            FillMethod::Zero | FillMethod::Pad => self.pad_or_zero(event),
            FillMethod::Linear => self.linear(event),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::run;
    use crate::time::Time;
    use serde_json::Value;

    fn series(values: &[Option<f64>]) -> Vec<Event<Time>> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| match v {
                Some(x) => Event::of(Time::from_ms(i as i64 * 1_000), *x),
                None => Event::of(Time::from_ms(i as i64 * 1_000), Value::Null),
            })
            .collect()
    }

    fn values(events: &[Event<Time>]) -> Vec<Option<f64>> {
        events.iter().map(|e| e.get_f64("value")).collect()
    }

    #[test]
    fn zero_fill_respects_its_limit() {
        let mut fill = Fill::new(FillOptions::new().limit(2)).unwrap();
        let out = run(&mut fill, series(&[Some(1.0), None, None, None, Some(5.0)])).unwrap();
        assert_eq!(
            values(&out),
            vec![Some(1.0), Some(0.0), Some(0.0), None, Some(5.0)]
        );
    }

    #[test]
    fn pad_fill_carries_the_last_value_through_a_run() {
        let mut fill = Fill::new(FillOptions::new().method(FillMethod::Pad)).unwrap();
        let out = run(&mut fill, series(&[Some(3.0), None, None, Some(7.0)])).unwrap();
        assert_eq!(
            values(&out),
            vec![Some(3.0), Some(3.0), Some(3.0), Some(7.0)]
        );
    }

    #[test]
    fn linear_rejects_multiple_fields() {
        let opts = FillOptions::new()
            .method(FillMethod::Linear)
            .fields(&["a", "b"]);
        assert!(matches!(Fill::<Time>::new(opts), Err(Error::InvalidFieldSpec(_))));
    }

    #[test]
    fn leading_missing_values_pass_through_linear() {
        let mut fill = Fill::new(FillOptions::new().method(FillMethod::Linear)).unwrap();
        let out = run(&mut fill, series(&[None, Some(2.0), None, Some(4.0)])).unwrap();
        assert_eq!(values(&out), vec![None, Some(2.0), Some(3.0), Some(4.0)]);
    }
}
