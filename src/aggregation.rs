//! Aggregation specs: named reductions over collection fields.
//!
//! An [`AggregationSpec`] maps output field names to `(source field,
//! reducer)` pairs. Applying a spec to a collection produces one data map
//! with every output field filled in; grouped and windowed collections
//! apply the spec per group, and the streaming aggregation node applies it
//! per emitted window.

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::reducers::Reducer;
use crate::value::Data;
use serde_json::Value;

#[derive(Clone, Debug)]
struct AggregationField {
    out: String,
    src: String,
    reducer: Reducer,
}

/// A validated list of `(out field, source field, reducer)` entries.
///
/// # Example
/// ```
/// use tideflow::{AggregationSpec, reducers::{avg, max, Missing}};
///
/// let spec = AggregationSpec::new()
///     .field("avg_in", "in", avg(Missing::Ignore))
///     .field("peak_in", "in", max(Missing::Ignore));
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default)]
pub struct AggregationSpec {
    fields: Vec<AggregationField>,
}

impl AggregationSpec {
    /// An empty spec. At least one field must be added before use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output field computed by reducing `src` across a collection.
    #[must_use]
    pub fn field(mut self, out: impl Into<String>, src: impl Into<String>, reducer: Reducer) -> Self {
        self.fields.push(AggregationField {
            out: out.into(),
            src: src.into(),
            reducer,
        });
        self
    }

    /// Number of output fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reject empty specs and duplicate or empty output names.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(Error::AggregationSpec("spec has no fields".to_string()));
        }
        for (i, f) in self.fields.iter().enumerate() {
            if f.out.is_empty() || f.src.is_empty() {
                return Err(Error::AggregationSpec(
                    "empty field name in spec".to_string(),
                ));
            }
            if self.fields[..i].iter().any(|g| g.out == f.out) {
                return Err(Error::AggregationSpec(format!(
                    "duplicate output field `{}`",
                    f.out
                )));
            }
        }
        Ok(())
    }

    /// Apply every entry to `collection`, producing one data map. Missing
    /// reductions land as null so the output shape is stable.
    #[must_use]
    pub fn apply<K: Key>(&self, collection: &Collection<K>) -> Data {
        let mut data = Data::new();
        for f in &self.fields {
            let reduced = collection
                .aggregate(&f.reducer, &f.src)
                .unwrap_or(Value::Null);
            data.insert(f.out.clone(), reduced);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducers::{avg, sum, Missing};

    #[test]
    fn rejects_degenerate_specs() {
        assert!(AggregationSpec::new().validate().is_err());
        let dup = AggregationSpec::new()
            .field("x", "v", avg(Missing::Ignore))
            .field("x", "v", sum(Missing::Ignore));
        assert!(matches!(dup.validate(), Err(Error::AggregationSpec(_))));
        let empty_name = AggregationSpec::new().field("", "v", avg(Missing::Ignore));
        assert!(empty_name.validate().is_err());
    }
}
