//! Grouped collections: a map from group key to sorted collection.
//!
//! Groups are named by strings; the group of an event is derived either
//! from a field's value or from a user function ([`GroupBy`]). Aggregation
//! over the groups is data-parallel (each group reduces independently).

use crate::aggregation::AggregationSpec;
use crate::collection::SortedCollection;
use crate::error::Result;
use crate::event::Event;
use crate::key::Key;
use crate::processors::{AlignOptions, RateOptions};
use crate::time::{Time, TimeRange};
use crate::value::Data;
use crate::window::Window;
use crate::windowed::WindowedCollection;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// How an event is assigned to a group.
#[derive(Clone)]
pub enum GroupBy<K: Key> {
    /// Group by the (stringified) value at a field path. Events missing
    /// the field land in the `"_"` group.
    Field(String),
    /// Group by an arbitrary function of the event.
    Func(Arc<dyn Fn(&Event<K>) -> String + Send + Sync>),
}

impl<K: Key> GroupBy<K> {
    /// Group by the value at `field`.
    #[must_use]
    pub fn field(field: impl Into<String>) -> Self {
        Self::Field(field.into())
    }

    /// Group by a user function.
    #[must_use]
    pub fn func(f: impl Fn(&Event<K>) -> String + Send + Sync + 'static) -> Self {
        Self::Func(Arc::new(f))
    }

    pub(crate) fn key_for(&self, event: &Event<K>) -> String {
        match self {
            Self::Field(field) => match event.get(field) {
                None | Some(Value::Null) => "_".to_string(),
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
            },
            Self::Func(f) => f(event),
        }
    }
}

/// A mapping `group key -> SortedCollection`.
///
/// # Example
/// ```
/// use tideflow::{Event, GroupBy, SortedCollection, Time};
/// use serde_json::json;
///
/// let events = [("in", 5), ("out", 3), ("in", 7)].iter().enumerate().map(|(i, (dir, v))| {
///     Event::new(Time::from_ms(i as i64 * 1_000), {
///         let mut d = serde_json::Map::new();
///         d.insert("direction".into(), json!(dir));
///         d.insert("bytes".into(), json!(v));
///         d
///     })
/// });
/// let grouped = events.collect::<SortedCollection<Time>>().group_by(&GroupBy::field("direction"));
/// assert_eq!(grouped.get("in").unwrap().size(), 2);
/// assert_eq!(grouped.get("out").unwrap().size(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct GroupedCollection<K: Key> {
    groups: BTreeMap<String, SortedCollection<K>>,
}

impl<K: Key> GroupedCollection<K> {
    /// Partition `events` into groups.
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = Event<K>>, group: &GroupBy<K>) -> Self {
        let mut buckets: BTreeMap<String, Vec<Event<K>>> = BTreeMap::new();
        for e in events {
            buckets.entry(group.key_for(&e)).or_default().push(e);
        }
        Self {
            groups: buckets
                .into_iter()
                .map(|(k, v)| (k, SortedCollection::new(v)))
                .collect(),
        }
    }

    /// Assemble directly from named groups.
    #[must_use]
    pub fn from_groups(groups: BTreeMap<String, SortedCollection<K>>) -> Self {
        Self { groups }
    }

    /// The collection for `group`, if present.
    #[must_use]
    pub fn get(&self, group: &str) -> Option<&SortedCollection<K>> {
        self.groups.get(group)
    }

    /// Iterate groups in key order.
    pub fn groups(&self) -> impl Iterator<Item = (&String, &SortedCollection<K>)> {
        self.groups.iter()
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Apply an aggregation spec to every group independently (in
    /// parallel), yielding `group -> {out field -> reduced value}`.
    pub fn aggregate(&self, spec: &AggregationSpec) -> Result<BTreeMap<String, Data>> {
        spec.validate()?;
        Ok(self
            .groups
            .par_iter()
            .map(|(name, coll)| (name.clone(), spec.apply(coll)))
            .collect::<Vec<_>>()
            .into_iter()
            .collect())
    }

    /// Recombine all groups into a single chronological collection.
    #[must_use]
    pub fn ungroup(&self) -> SortedCollection<K> {
        self.groups
            .values()
            .flat_map(|c| c.events().iter().cloned())
            .collect()
    }

    /// Alias for [`Self::ungroup`].
    #[must_use]
    pub fn flatten(&self) -> SortedCollection<K> {
        self.ungroup()
    }

    /// Window every group, keeping the group prefix on the window keys.
    #[must_use]
    pub fn window(&self, window: &Window) -> WindowedCollection<K> {
        let mut out = WindowedCollection::empty();
        for (name, coll) in &self.groups {
            out.extend_from(WindowedCollection::from_events(
                coll.events().iter().cloned(),
                window,
                Some(name.clone()),
            ));
        }
        out
    }
}

impl GroupedCollection<Time> {
    /// Align every group independently, preserving the grouping.
    pub fn align(&self, options: &AlignOptions) -> Result<Self> {
        let mut groups = BTreeMap::new();
        for (name, coll) in &self.groups {
            groups.insert(name.clone(), coll.align(options)?);
        }
        Ok(Self { groups })
    }

    /// Per-group rate of change; the result is `TimeRange`-keyed.
    pub fn rate(&self, options: &RateOptions) -> Result<GroupedCollection<TimeRange>> {
        let mut groups = BTreeMap::new();
        for (name, coll) in &self.groups {
            groups.insert(name.clone(), coll.rate(options)?);
        }
        Ok(GroupedCollection { groups })
    }
}
