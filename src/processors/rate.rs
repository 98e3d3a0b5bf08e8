//! Rate of change between consecutive events.

use super::Processor;
use crate::error::Result;
use crate::event::Event;
use crate::time::{Time, TimeRange};
use crate::value::{self, Data};
use serde_json::Value;
use tracing::warn;

/// Configuration for [`Rate`].
#[derive(Clone, Debug)]
pub struct RateOptions {
    /// Field paths to differentiate.
    pub field_spec: Vec<String>,
    /// Emit negative rates instead of suppressing them to null. Off by
    /// default: a counter reset would otherwise show as a large negative
    /// spike.
    pub allow_negative: bool,
}

impl RateOptions {
    /// Differentiate the `value` field, suppressing negative rates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            field_spec: vec!["value".to_string()],
            allow_negative: false,
        }
    }

    /// Replace the field list.
    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.field_spec = fields.iter().map(ToString::to_string).collect();
        self
    }

    /// Permit negative rates.
    #[must_use]
    pub fn allow_negative(mut self, allow: bool) -> Self {
        self.allow_negative = allow;
        self
    }
}

impl Default for RateOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Appends `_rate` to the final segment of a field path.
fn rate_field(field: &str) -> String {
    match field.rsplit_once('.') {
        Some((head, last)) => format!("{head}.{last}_rate"),
        None => format!("{field}_rate"),
    }
}

/// Emits, for each consecutive pair of `Time`-keyed inputs, one
/// `TimeRange`-keyed event carrying the per-second delta of every listed
/// field under a `_rate`-suffixed name.
pub struct Rate {
    options: RateOptions,
    previous: Option<Event<Time>>,
}

impl Rate {
    /// A fresh processor with no history.
    #[must_use]
    pub fn new(options: RateOptions) -> Self {
        Self {
            options,
            previous: None,
        }
    }
}

impl Processor for Rate {
    type In = Event<Time>;
    type Out = Event<TimeRange>;

    fn process(&mut self, event: Self::In) -> Result<Vec<Self::Out>> {
        let Some(prev) = self.previous.take() else {
            self.previous = Some(event);
            return Ok(Vec::new());
        };

        let delta_s = (event.timestamp().ms() - prev.timestamp().ms()) as f64 / 1_000.0;
        let mut data = Data::new();
        for field in &self.options.field_spec {
            let out_path = rate_field(field);
            let cell = match (prev.get_f64(field), event.get_f64(field)) {
                (Some(a), Some(b)) => {
                    let rate = (b - a) / delta_s;
                    if rate < 0.0 && !self.options.allow_negative {
                        warn!(%field, rate, "suppressing negative rate");
                        Value::Null
                    } else {
                        value::number(rate)
                    }
                }
                _ => {
                    if !value::is_missing(prev.get(field)) || !value::is_missing(event.get(field)) {
                        warn!(%field, "cannot compute a rate over non-numeric values");
                    }
                    Value::Null
                }
            };
            value::set_at(&mut data, &value::split_path(&out_path), cell);
        }

        let key = TimeRange::new(prev.timestamp(), event.timestamp());
        self.previous = Some(event);
        Ok(vec![Event::new(key, data)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::run;

    #[test]
    fn rate_field_suffixes_the_last_segment() {
        assert_eq!(rate_field("value"), "value_rate");
        assert_eq!(rate_field("net.in.bytes"), "net.in.bytes_rate");
    }

    #[test]
    fn negative_rates_are_suppressed_by_default() {
        let events = vec![
            Event::of(Time::from_ms(0), 10.0),
            Event::of(Time::from_ms(1_000), 4.0),
        ];
        let out = run(&mut Rate::new(RateOptions::new()), events.clone()).unwrap();
        assert_eq!(out.len(), 1);
        assert!(!out[0].is_valid("value_rate"));

        let out = run(
            &mut Rate::new(RateOptions::new().allow_negative(true)),
            events,
        )
        .unwrap();
        assert_eq!(out[0].get_f64("value_rate"), Some(-6.0));
    }
}
