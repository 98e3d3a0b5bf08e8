//! Windowed collections: events bucketed by window index (and group).
//!
//! A [`WindowedCollection`] maps a [`WindowKey`] — an optional group name
//! plus a window index string — to the sorted collection of events that
//! fell into that window. Aggregating a windowed collection re-keys the
//! data: each window becomes one `Index`-keyed event.

use crate::aggregation::AggregationSpec;
use crate::collection::SortedCollection;
use crate::error::Result;
use crate::event::Event;
use crate::grouped::GroupedCollection;
use crate::index::Index;
use crate::key::Key;
use crate::time::TimeRange;
use crate::window::Window;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Names one window bucket: `[<group>::]<windowIndexString>`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowKey {
    group: Option<String>,
    index: String,
}

impl WindowKey {
    /// A window key with no group prefix.
    #[must_use]
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            group: None,
            index: index.into(),
        }
    }

    /// A window key carrying a group prefix.
    #[must_use]
    pub fn grouped(group: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            index: index.into(),
        }
    }

    /// Split a `group::index` composite (the first `::` separates).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.split_once("::") {
            Some((group, index)) => Self::grouped(group, index),
            None => Self::new(s),
        }
    }

    /// The group prefix, if any.
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The window index string.
    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(g) => write!(f, "{g}::{}", self.index),
            None => f.write_str(&self.index),
        }
    }
}

/// A mapping `WindowKey -> SortedCollection`.
///
/// Sliding windows overlap, so one event may appear under several keys;
/// the per-window collections share the event payloads structurally.
#[derive(Clone, Debug)]
pub struct WindowedCollection<K: Key> {
    entries: BTreeMap<WindowKey, SortedCollection<K>>,
}

impl<K: Key> WindowedCollection<K> {
    /// A windowed collection with no buckets.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Bucket `events` by the windows overlapping each event's key extent,
    /// optionally prefixing every bucket with a group name.
    #[must_use]
    pub fn from_events(
        events: impl IntoIterator<Item = Event<K>>,
        window: &Window,
        group: Option<String>,
    ) -> Self {
        let mut buckets: BTreeMap<WindowKey, Vec<Event<K>>> = BTreeMap::new();
        for e in events {
            let extent = TimeRange::new(e.begin(), e.end());
            for idx in window.index_set_over(&extent) {
                let key = match &group {
                    Some(g) => WindowKey::grouped(g.clone(), idx.to_string()),
                    None => WindowKey::new(idx.to_string()),
                };
                buckets.entry(key).or_default().push(e.clone());
            }
        }
        Self {
            entries: buckets
                .into_iter()
                .map(|(k, v)| (k, SortedCollection::new(v)))
                .collect(),
        }
    }

    /// Absorb another windowed collection's buckets (used when windowing a
    /// grouped collection, where buckets never collide across groups).
    pub fn extend_from(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    /// The collection for a window key.
    #[must_use]
    pub fn get(&self, key: &WindowKey) -> Option<&SortedCollection<K>> {
        self.entries.get(key)
    }

    /// Iterate buckets in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&WindowKey, &SortedCollection<K>)> {
        self.entries.iter()
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no buckets exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reduce every bucket with `spec`, yielding one `Index`-keyed event
    /// per window, grouped by the original group names (`"_"` when the
    /// windows carried no grouping).
    pub fn aggregate(&self, spec: &AggregationSpec) -> Result<GroupedCollection<Index>> {
        spec.validate()?;
        let reduced: Vec<(Option<String>, Event<Index>)> = self
            .entries
            .par_iter()
            .map(|(wk, coll)| -> Result<(Option<String>, Event<Index>)> {
                let index = Index::parse(wk.index())?;
                Ok((wk.group.clone(), Event::new(index, spec.apply(coll))))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut groups: BTreeMap<String, Vec<Event<Index>>> = BTreeMap::new();
        for (group, event) in reduced {
            groups
                .entry(group.unwrap_or_else(|| "_".to_string()))
                .or_default()
                .push(event);
        }
        Ok(GroupedCollection::from_groups(
            groups
                .into_iter()
                .map(|(g, evs)| (g, SortedCollection::new(evs)))
                .collect(),
        ))
    }

    /// Concatenate every bucket chronologically. With sliding windows an
    /// event appears once per window it belonged to.
    #[must_use]
    pub fn flatten(&self) -> SortedCollection<K> {
        self.entries
            .values()
            .flat_map(|c| c.events().iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::Duration;
    use crate::reducers::{self, Missing};
    use crate::time::Time;

    #[test]
    fn window_keys_round_trip() {
        let plain = WindowKey::new("30s-4");
        assert_eq!(plain.to_string(), "30s-4");
        assert_eq!(WindowKey::parse("30s-4"), plain);

        let grouped = WindowKey::grouped("in", "30s-4");
        assert_eq!(grouped.to_string(), "in::30s-4");
        assert_eq!(WindowKey::parse("in::30s-4"), grouped);
    }

    #[test]
    fn fixed_windowing_buckets_by_half_minute() {
        let events = vec![
            Event::of(Time::from_ms(0), 1),
            Event::of(Time::from_ms(15_000), 2),
            Event::of(Time::from_ms(45_000), 3),
        ];
        let wc =
            WindowedCollection::from_events(events, &Window::fixed(Duration::seconds(30)), None);
        assert_eq!(wc.len(), 2);
        assert_eq!(wc.get(&WindowKey::new("30s-0")).unwrap().size(), 2);
        assert_eq!(wc.get(&WindowKey::new("30s-1")).unwrap().size(), 1);
    }

    #[test]
    fn aggregate_rekeys_to_indexes() {
        let events = vec![
            Event::of(Time::from_ms(0), 1.0),
            Event::of(Time::from_ms(15_000), 2.0),
            Event::of(Time::from_ms(45_000), 3.0),
        ];
        let wc =
            WindowedCollection::from_events(events, &Window::fixed(Duration::seconds(30)), None);
        let spec = AggregationSpec::new().field("avg", "value", reducers::avg(Missing::Ignore));
        let grouped = wc.aggregate(&spec).unwrap();
        let series = grouped.get("_").unwrap();
        assert_eq!(series.size(), 2);
        assert_eq!(series.at(0).unwrap().key_string(), "30s-0");
        assert_eq!(series.at(0).unwrap().get_f64("avg"), Some(1.5));
        assert_eq!(series.at(1).unwrap().get_f64("avg"), Some(3.0));
    }
}
