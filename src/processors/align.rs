//! Alignment: resample irregular instants onto period boundaries.

use super::Processor;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::period::Period;
use crate::time::Time;
use crate::value::{self, Data};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// How the value at a boundary is derived from the surrounding events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AlignMethod {
    /// Carry the previous event's value forward.
    #[default]
    Hold,
    /// Linearly interpolate between the surrounding events.
    Linear,
}

impl FromStr for AlignMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hold" => Ok(Self::Hold),
            "linear" => Ok(Self::Linear),
            other => Err(Error::UnknownAlignmentMethod(other.to_string())),
        }
    }
}

impl fmt::Display for AlignMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hold => "hold",
            Self::Linear => "linear",
        })
    }
}

/// Configuration for [`Align`].
#[derive(Clone, Debug)]
pub struct AlignOptions {
    /// Field paths carried onto the aligned events.
    pub field_spec: Vec<String>,
    /// The boundary period.
    pub period: Period,
    /// Hold or linear interpolation.
    pub method: AlignMethod,
    /// When more than `limit` boundaries fall between two events, the gap
    /// is considered too wide to fill and the boundaries emit nulls.
    pub limit: Option<usize>,
}

impl AlignOptions {
    /// Align the `value` field onto `period` boundaries with hold
    /// semantics and no limit.
    #[must_use]
    pub fn new(period: Period) -> Self {
        Self {
            field_spec: vec!["value".to_string()],
            period,
            method: AlignMethod::Hold,
            limit: None,
        }
    }

    /// Replace the field list.
    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.field_spec = fields.iter().map(ToString::to_string).collect();
        self
    }

    /// Set the alignment method.
    #[must_use]
    pub fn method(mut self, method: AlignMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the boundary-count limit.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Resamples `Time`-keyed events onto period boundaries.
///
/// The boundaries considered between two consecutive inputs form the
/// half-open interval `(previous, current]`: an input landing exactly on a
/// boundary emits for that boundary. A second event with the timestamp of
/// its predecessor finds no boundaries and emits nothing. The very first
/// input emits only if it is itself aligned.
///
/// Emitted events carry only the listed fields.
pub struct Align {
    options: AlignOptions,
    previous: Option<Event<Time>>,
}

impl Align {
    /// A fresh processor with no history.
    #[must_use]
    pub fn new(options: AlignOptions) -> Self {
        Self {
            options,
            previous: None,
        }
    }

    fn boundaries(&self, prev: Time, cur: Time) -> Vec<Time> {
        let period = &self.options.period;
        let mut out = Vec::new();
        let mut b = period.next(prev);
        while b <= cur {
            out.push(b);
            b = Time::from_ms(b.ms() + period.frequency().as_millis());
        }
        out
    }

    fn interpolated(&self, prev: &Event<Time>, cur: &Event<Time>, boundary: Time) -> Event<Time> {
        let span = (cur.timestamp().ms() - prev.timestamp().ms()) as f64;
        let f = (boundary.ms() - prev.timestamp().ms()) as f64 / span;
        let mut data = Data::new();
        for field in &self.options.field_spec {
            let path = value::split_path(field);
            let cell = match (prev.get_f64(field), cur.get_f64(field)) {
                (Some(a), Some(b)) => value::number(a + f * (b - a)),
                _ => {
                    warn!(%field, boundary = %boundary.to_utc_string(),
                        "cannot interpolate a non-numeric value; emitting null");
                    serde_json::Value::Null
                }
            };
            value::set_at(&mut data, &path, cell);
        }
        Event::new(boundary, data)
    }

    fn held(&self, prev: &Event<Time>, boundary: Time) -> Event<Time> {
        let mut data = Data::new();
        for field in &self.options.field_spec {
            let path = value::split_path(field);
            let cell = prev.get(field).cloned().unwrap_or(serde_json::Value::Null);
            value::set_at(&mut data, &path, cell);
        }
        Event::new(boundary, data)
    }

    fn nulled(&self, boundary: Time) -> Event<Time> {
        let mut data = Data::new();
        for field in &self.options.field_spec {
            value::set_at(&mut data, &value::split_path(field), serde_json::Value::Null);
        }
        Event::new(boundary, data)
    }
}

impl Processor for Align {
    type In = Event<Time>;
    type Out = Event<Time>;

    fn process(&mut self, event: Self::In) -> Result<Vec<Self::Out>> {
        let Some(prev) = self.previous.take() else {
            let out = if self.options.period.is_aligned(event.timestamp()) {
                vec![event.clone()]
            } else {
                Vec::new()
            };
            self.previous = Some(event);
            return Ok(out);
        };

        let boundaries = self.boundaries(prev.timestamp(), event.timestamp());
        let too_wide = self
            .options
            .limit
            .is_some_and(|limit| boundaries.len() > limit);

        let out = boundaries
            .into_iter()
            .map(|b| {
                if too_wide {
                    self.nulled(b)
                } else {
                    match self.options.method {
                        AlignMethod::Hold => self.held(&prev, b),
                        AlignMethod::Linear => self.interpolated(&prev, &event, b),
                    }
                }
            })
            .collect();

        self.previous = Some(event);
        Ok(out)
    }
}
