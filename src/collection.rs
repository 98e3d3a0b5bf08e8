//! Ordered, immutable bags of events.
//!
//! This module defines:
//!
//! - [`Collection<K>`]: an immutable ordered list of events with an
//!   internal key-string index for O(1) lookup by key.
//! - [`SortedCollection<K>`]: the chronological variant. Every operation on
//!   it yields another `SortedCollection`, and its events are always
//!   non-decreasing by `begin()`.
//! - [`Dedup<K>`]: the collision policy for `add_event_dedup`.
//!
//! Both types are cheap to clone (events and index live behind `Arc`s) and
//! never mutate in place: every operation returns a new instance, leaving
//! the receiver untouched.

use crate::error::Result;
use crate::event::Event;
use crate::grouped::{GroupBy, GroupedCollection};
use crate::key::Key;
use crate::processors::{run, Align, AlignOptions, Fill, FillOptions, Rate, RateOptions};
use crate::reducers::{self, Missing, Reducer};
use crate::time::{Time, TimeRange};
use crate::value;
use crate::window::Window;
use crate::windowed::WindowedCollection;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

/// Collision policy when adding an event whose key is already present.
#[derive(Clone)]
pub enum Dedup<K: Key> {
    /// The newer event replaces the older one.
    Replace,
    /// A user function merges the colliding pair (old, new) into one event.
    Merge(Arc<dyn Fn(&Event<K>, &Event<K>) -> Event<K> + Send + Sync>),
}

/// An immutable, ordered bag of events sharing a key type.
///
/// # Example
/// ```
/// use tideflow::{Collection, Event, Time};
///
/// let c: Collection<Time> = [
///     Event::of(Time::from_ms(0), 1),
///     Event::of(Time::from_ms(1_000), 2),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(c.size(), 2);
/// assert_eq!(c.avg("value"), Some(1.5));
/// let doubled = c.map(|e| e.set("value", e.get_f64("value").unwrap_or(0.0) * 2.0));
/// assert_eq!(doubled.avg("value"), Some(3.0));
/// assert_eq!(c.avg("value"), Some(1.5)); // receiver unchanged
/// ```
#[derive(Clone, Debug)]
pub struct Collection<K: Key> {
    events: Arc<Vec<Event<K>>>,
    by_key: Arc<HashMap<String, usize>>,
}

fn build_index<K: Key>(events: &[Event<K>]) -> HashMap<String, usize> {
    events
        .iter()
        .enumerate()
        .map(|(i, e)| (e.key_string(), i))
        .collect()
}

impl<K: Key> Collection<K> {
    /// Construct from a list of events, keeping their order.
    #[must_use]
    pub fn new(events: Vec<Event<K>>) -> Self {
        let by_key = build_index(&events);
        Self {
            events: Arc::new(events),
            by_key: Arc::new(by_key),
        }
    }

    /// Number of events.
    #[must_use]
    pub fn size(&self) -> usize {
        self.events.len()
    }

    /// True when the collection holds no events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The event at list position `i`.
    #[must_use]
    pub fn at(&self, i: usize) -> Option<&Event<K>> {
        self.events.get(i)
    }

    /// The event with the given canonical key string. When several events
    /// share a key the latest one wins.
    #[must_use]
    pub fn at_key(&self, key: &str) -> Option<&Event<K>> {
        self.by_key.get(key).and_then(|&i| self.events.get(i))
    }

    /// The events as a slice, in collection order.
    #[must_use]
    pub fn events(&self) -> &[Event<K>] {
        &self.events
    }

    /// First event in collection order.
    #[must_use]
    pub fn first(&self) -> Option<&Event<K>> {
        self.events.first()
    }

    /// Last event in collection order.
    #[must_use]
    pub fn last(&self) -> Option<&Event<K>> {
        self.events.last()
    }

    /// True when events are non-decreasing by `begin()`.
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        self.events.windows(2).all(|w| w[0].begin() <= w[1].begin())
    }

    /// A new collection with `event` appended.
    #[must_use]
    pub fn add_event(&self, event: Event<K>) -> Self {
        let mut events = (*self.events).clone();
        events.push(event);
        Self::new(events)
    }

    /// A new collection with `event` added under a collision policy: when
    /// an event with the same key string exists, `dedup` decides what
    /// replaces it; otherwise this appends.
    #[must_use]
    pub fn add_event_dedup(&self, event: Event<K>, dedup: &Dedup<K>) -> Self {
        match self.by_key.get(&event.key_string()) {
            Some(&i) => {
                let mut events = (*self.events).clone();
                events[i] = match dedup {
                    Dedup::Replace => event,
                    Dedup::Merge(f) => f(&events[i], &event),
                };
                Self::new(events)
            }
            None => self.add_event(event),
        }
    }

    /// A chronologically sorted view (stable sort by `begin()`).
    #[must_use]
    pub fn sorted(&self) -> SortedCollection<K> {
        SortedCollection::new((*self.events).clone())
    }

    /// Transform every event; the result keeps collection order.
    #[must_use]
    pub fn map<K2: Key>(&self, f: impl Fn(&Event<K>) -> Event<K2>) -> Collection<K2> {
        Collection::new(self.events.iter().map(f).collect())
    }

    /// Keep only events matching the predicate.
    #[must_use]
    pub fn filter(&self, pred: impl Fn(&Event<K>) -> bool) -> Self {
        Self::new(self.events.iter().filter(|e| pred(e)).cloned().collect())
    }

    /// Transform every event into zero or more events.
    #[must_use]
    pub fn flat_map<K2: Key>(&self, f: impl Fn(&Event<K>) -> Vec<Event<K2>>) -> Collection<K2> {
        Collection::new(self.events.iter().flat_map(f).collect())
    }

    /// A new collection retaining only the listed top-level fields of each
    /// event.
    #[must_use]
    pub fn select(&self, fields: &[&str]) -> Self {
        self.map(|e| e.select(fields))
    }

    /// A new collection with each event collapsed via
    /// [`Event::collapse`].
    #[must_use]
    pub fn collapse(&self, fields: &[&str], out_name: &str, reducer: &Reducer, append: bool) -> Self {
        self.map(|e| e.collapse(fields, out_name, reducer, append))
    }

    /// Reduce the values at `field` across all events. `None` when the
    /// collection is empty or the reduction comes back null.
    #[must_use]
    pub fn aggregate(&self, reducer: &Reducer, field: &str) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        let values: Vec<Value> = self
            .events
            .iter()
            .map(|e| e.get(field).cloned().unwrap_or(Value::Null))
            .collect();
        match reducer.call(&values) {
            Value::Null => None,
            v => Some(v),
        }
    }

    fn aggregate_f64(&self, reducer: &Reducer, field: &str) -> Option<f64> {
        self.aggregate(reducer, field).as_ref().and_then(value::as_f64)
    }

    /// Sum of `field`, ignoring missing values.
    #[must_use]
    pub fn sum(&self, field: &str) -> Option<f64> {
        self.aggregate_f64(&reducers::sum(Missing::Ignore), field)
    }

    /// Mean of `field`, ignoring missing values.
    #[must_use]
    pub fn avg(&self, field: &str) -> Option<f64> {
        self.aggregate_f64(&reducers::avg(Missing::Ignore), field)
    }

    /// Minimum of `field`, ignoring missing values.
    #[must_use]
    pub fn min(&self, field: &str) -> Option<f64> {
        self.aggregate_f64(&reducers::min(Missing::Ignore), field)
    }

    /// Maximum of `field`, ignoring missing values.
    #[must_use]
    pub fn max(&self, field: &str) -> Option<f64> {
        self.aggregate_f64(&reducers::max(Missing::Ignore), field)
    }

    /// Median of `field`, ignoring missing values.
    #[must_use]
    pub fn median(&self, field: &str) -> Option<f64> {
        self.aggregate_f64(&reducers::median(Missing::Ignore), field)
    }

    /// Population standard deviation of `field`, ignoring missing values.
    #[must_use]
    pub fn stdev(&self, field: &str) -> Option<f64> {
        self.aggregate_f64(&reducers::stdev(Missing::Ignore), field)
    }

    /// The `q`-th percentile of `field`, ignoring missing values.
    pub fn percentile(&self, q: f64, field: &str) -> Result<Option<f64>> {
        let reducer = reducers::percentile(q, reducers::Interp::Linear, Missing::Ignore)?;
        Ok(self.aggregate_f64(&reducer, field))
    }

    /// Count of events carrying a non-missing `field`.
    #[must_use]
    pub fn count(&self, field: &str) -> Option<f64> {
        self.aggregate_f64(&reducers::count(Missing::Ignore), field)
    }

    /// Partition events into per-group sorted collections.
    #[must_use]
    pub fn group_by(&self, group: &GroupBy<K>) -> GroupedCollection<K> {
        GroupedCollection::from_events(self.events.iter().cloned(), group)
    }

    /// Assign every event to the windows overlapping its key's extent.
    #[must_use]
    pub fn window(&self, window: &Window) -> WindowedCollection<K> {
        WindowedCollection::from_events(self.events.iter().cloned(), window, None)
    }
}

impl<K: Key> FromIterator<Event<K>> for Collection<K> {
    fn from_iter<I: IntoIterator<Item = Event<K>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<K: Key> PartialEq for Collection<K> {
    fn eq(&self, other: &Self) -> bool {
        self.events == other.events
    }
}

/// A [`Collection`] whose events are guaranteed chronological.
///
/// `SortedCollection` derefs to `Collection`, so every read-only method is
/// available; transforming methods are shadowed to re-establish sortedness
/// on their results.
#[derive(Clone, Debug, PartialEq)]
pub struct SortedCollection<K: Key> {
    inner: Collection<K>,
}

impl<K: Key> SortedCollection<K> {
    /// Construct from events in any order; sorts stably by `begin()`.
    #[must_use]
    pub fn new(mut events: Vec<Event<K>>) -> Self {
        events.sort_by_key(|e| e.begin());
        Self {
            inner: Collection::new(events),
        }
    }

    /// Sortedness holds by construction.
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        true
    }

    /// The underlying unsorted-capable view.
    #[must_use]
    pub fn as_collection(&self) -> &Collection<K> {
        &self.inner
    }

    /// A new sorted collection with `event` added. An event landing before
    /// the current first triggers a re-sort; the result is chronological
    /// either way.
    #[must_use]
    pub fn add_event(&self, event: Event<K>) -> Self {
        let appended = self.inner.add_event(event);
        if appended.is_chronological() {
            Self { inner: appended }
        } else {
            appended.sorted()
        }
    }

    /// As [`Collection::add_event_dedup`], preserving sortedness.
    #[must_use]
    pub fn add_event_dedup(&self, event: Event<K>, dedup: &Dedup<K>) -> Self {
        let merged = self.inner.add_event_dedup(event, dedup);
        if merged.is_chronological() {
            Self { inner: merged }
        } else {
            merged.sorted()
        }
    }

    /// Transform every event, re-sorting the result.
    #[must_use]
    pub fn map<K2: Key>(&self, f: impl Fn(&Event<K>) -> Event<K2>) -> SortedCollection<K2> {
        self.inner.map(f).sorted()
    }

    /// Keep only events matching the predicate; order is preserved.
    #[must_use]
    pub fn filter(&self, pred: impl Fn(&Event<K>) -> bool) -> Self {
        Self {
            inner: self.inner.filter(pred),
        }
    }

    /// Transform every event into zero or more events, re-sorting.
    #[must_use]
    pub fn flat_map<K2: Key>(&self, f: impl Fn(&Event<K>) -> Vec<Event<K2>>) -> SortedCollection<K2> {
        self.inner.flat_map(f).sorted()
    }

    /// As [`Collection::select`]; selection cannot disturb order.
    #[must_use]
    pub fn select(&self, fields: &[&str]) -> Self {
        Self {
            inner: self.inner.select(fields),
        }
    }

    /// As [`Collection::collapse`]; keys are untouched so order holds.
    #[must_use]
    pub fn collapse(&self, fields: &[&str], out_name: &str, reducer: &Reducer, append: bool) -> Self {
        Self {
            inner: self.inner.collapse(fields, out_name, reducer, append),
        }
    }

    /// The greatest index `i` (at or after `start`) with
    /// `events[i].timestamp() <= t`. `None` when the collection is empty or
    /// every candidate timestamp is later than `t`.
    #[must_use]
    pub fn bisect(&self, t: Time, start: Option<usize>) -> Option<usize> {
        let from = start.unwrap_or(0);
        let tail = self.inner.events.get(from..)?;
        let pp = tail.partition_point(|e| e.timestamp() <= t);
        if pp == 0 {
            None
        } else {
            Some(from + pp - 1)
        }
    }

    /// The events in list positions `[begin, end)`.
    #[must_use]
    pub fn slice(&self, begin: usize, end: usize) -> Self {
        let end = end.min(self.inner.events.len());
        let events = if begin >= end {
            Vec::new()
        } else {
            self.inner.events[begin..end].to_vec()
        };
        Self {
            inner: Collection::new(events),
        }
    }

    /// The events whose timestamp falls within `range` (inclusive bounds).
    #[must_use]
    pub fn crop(&self, range: &TimeRange) -> Self {
        self.filter(|e| range.contains(e.timestamp()))
    }

    /// Fill missing values per the fill options.
    pub fn fill(&self, options: &FillOptions) -> Result<Self> {
        let mut processor = Fill::new(options.clone())?;
        let out = run(&mut processor, self.inner.events.iter().cloned())?;
        Ok(Self::new(out))
    }
}

impl SortedCollection<Time> {
    /// Resample onto period boundaries per the align options.
    pub fn align(&self, options: &AlignOptions) -> Result<Self> {
        let mut processor = Align::new(options.clone());
        let out = run(&mut processor, self.inner.events.iter().cloned())?;
        Ok(Self::new(out))
    }

    /// Per-second rate of change between consecutive events.
    pub fn rate(&self, options: &RateOptions) -> Result<SortedCollection<TimeRange>> {
        let mut processor = Rate::new(options.clone());
        let out = run(&mut processor, self.inner.events.iter().cloned())?;
        Ok(SortedCollection::new(out))
    }
}

impl<K: Key> Deref for SortedCollection<K> {
    type Target = Collection<K>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<K: Key> FromIterator<Event<K>> for SortedCollection<K> {
    fn from_iter<I: IntoIterator<Item = Event<K>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(i64, f64)]) -> SortedCollection<Time> {
        points
            .iter()
            .map(|&(ms, v)| Event::of(Time::from_ms(ms), v))
            .collect()
    }

    #[test]
    fn out_of_order_insert_resorts() {
        let c = series(&[(1_000, 1.0), (2_000, 2.0)]);
        let c2 = c.add_event(Event::of(Time::from_ms(500), 0.5));
        assert!(c2.as_collection().is_chronological());
        assert_eq!(c2.at(0).unwrap().timestamp().ms(), 500);
        // the original is untouched
        assert_eq!(c.size(), 2);
        assert_eq!(c.at(0).unwrap().timestamp().ms(), 1_000);
    }

    #[test]
    fn bisect_finds_the_enclosing_event() {
        let c = series(&[(0, 0.0), (30_000, 1.0), (60_000, 2.0)]);
        assert_eq!(c.bisect(Time::from_ms(45_000), None), Some(1));
        assert_eq!(c.bisect(Time::from_ms(60_000), None), Some(2));
        assert_eq!(c.bisect(Time::from_ms(-1), None), None);
        assert_eq!(c.bisect(Time::from_ms(45_000), Some(2)), None);
    }

    #[test]
    fn dedup_replace_and_merge() {
        let c = series(&[(1_000, 1.0)]);
        let replaced = c.add_event_dedup(Event::of(Time::from_ms(1_000), 9.0), &Dedup::Replace);
        assert_eq!(replaced.size(), 1);
        assert_eq!(replaced.at(0).unwrap().get_f64("value"), Some(9.0));

        let summed = c.add_event_dedup(
            Event::of(Time::from_ms(1_000), 9.0),
            &Dedup::Merge(Arc::new(|old, new| {
                let total = old.get_f64("value").unwrap_or(0.0) + new.get_f64("value").unwrap_or(0.0);
                old.set("value", total)
            })),
        );
        assert_eq!(summed.at(0).unwrap().get_f64("value"), Some(10.0));
    }
}
