//! Keyed events: the atom every collection and processor works over.
//!
//! An [`Event<K>`] pairs a [`Key`] with an immutable JSON-shaped payload.
//! Payloads are shared behind an `Arc`, so cloning an event (which every
//! collection operation does freely) never copies data; only [`Event::set`]
//! and friends produce a fresh payload map.
//!
//! Two events are **equal** when their key strings match *and* their data
//! maps are structurally equal; they are **duplicates** when their key
//! strings match regardless of data. The duplicate notion is what dedup and
//! merge paths use.

use crate::key::Key;
use crate::reducers::Reducer;
use crate::time::Time;
use crate::value::{self, Data};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable `(key, data)` pair.
///
/// # Example
/// ```
/// use tideflow::{Event, Time};
/// use serde_json::json;
///
/// let e = Event::of(Time::from_ms(1_000), 42);
/// assert_eq!(e.get("value"), Some(&json!(42)));
///
/// let e2 = e.set("status.ok", true);
/// assert_eq!(e2.get("status.ok"), Some(&json!(true)));
/// assert_eq!(e.get("status.ok"), None); // the original is untouched
/// ```
#[derive(Clone, Debug)]
pub struct Event<K: Key> {
    key: K,
    data: Arc<Data>,
}

impl<K: Key> Event<K> {
    /// Construct an event from a key and a payload map.
    #[must_use]
    pub fn new(key: K, data: Data) -> Self {
        Self {
            key,
            data: Arc::new(data),
        }
    }

    /// Construct an event whose payload is a single `value` field.
    #[must_use]
    pub fn of(key: K, value: impl Into<Value>) -> Self {
        let mut data = Data::new();
        data.insert("value".to_string(), value.into());
        Self::new(key, data)
    }

    /// The event's key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The payload map.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// The key's representative instant.
    #[must_use]
    pub fn timestamp(&self) -> Time {
        self.key.timestamp()
    }

    /// The key's lower bound.
    #[must_use]
    pub fn begin(&self) -> Time {
        self.key.begin()
    }

    /// The key's upper bound.
    #[must_use]
    pub fn end(&self) -> Time {
        self.key.end()
    }

    /// The canonical key string (the equality token for dedup/group-by).
    #[must_use]
    pub fn key_string(&self) -> String {
        self.key.key_string()
    }

    /// Deep lookup by dot-path.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.get_path(&value::split_path(field))
    }

    /// Deep lookup by explicit path segments.
    #[must_use]
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        value::lookup(&self.data, path)
    }

    /// Numeric view of the value at `field`.
    #[must_use]
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(value::as_f64)
    }

    /// A new event with `field` deep-set to `v`. The receiver is unchanged.
    #[must_use]
    pub fn set(&self, field: &str, v: impl Into<Value>) -> Self {
        self.set_path(&value::split_path(field), v)
    }

    /// A new event with the value at `path` deep-set to `v`.
    #[must_use]
    pub fn set_path(&self, path: &[&str], v: impl Into<Value>) -> Self {
        let mut data = (*self.data).clone();
        value::set_at(&mut data, path, v.into());
        Self::new(self.key.clone(), data)
    }

    /// A new event retaining only the listed top-level fields.
    #[must_use]
    pub fn select(&self, fields: &[&str]) -> Self {
        let mut data = Data::new();
        for field in fields {
            if let Some(v) = self.data.get(*field) {
                data.insert((*field).to_string(), v.clone());
            }
        }
        Self::new(self.key.clone(), data)
    }

    /// A new event with `out_name` set to `reducer` applied across the
    /// listed fields' values. With `append = false` the result carries only
    /// `out_name`.
    #[must_use]
    pub fn collapse(&self, fields: &[&str], out_name: &str, reducer: &Reducer, append: bool) -> Self {
        let values: Vec<Value> = fields
            .iter()
            .map(|f| self.get(f).cloned().unwrap_or(Value::Null))
            .collect();
        let reduced = reducer.call(&values);
        let mut data = if append { (*self.data).clone() } else { Data::new() };
        value::set_at(&mut data, &value::split_path(out_name), reduced);
        Self::new(self.key.clone(), data)
    }

    /// False iff the value at `field` is absent or null.
    #[must_use]
    pub fn is_valid(&self, field: &str) -> bool {
        !value::is_missing(self.get(field))
    }

    /// True when every listed field is valid.
    #[must_use]
    pub fn all_valid(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.is_valid(f))
    }

    /// JSON rendering: `{"<kind>": <key>, "data": {...}}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = Data::new();
        obj.insert(K::KIND.column_name().to_string(), self.key.to_json());
        obj.insert("data".to_string(), Value::Object((*self.data).clone()));
        Value::Object(obj)
    }

    /// Key-string and structural data equality.
    #[must_use]
    pub fn is(a: &Self, b: &Self) -> bool {
        a.key_string() == b.key_string() && a.data == b.data
    }

    /// Key equality only (the dedup notion). With `ignore_values = false`
    /// this tightens to full equality.
    #[must_use]
    pub fn is_duplicate(a: &Self, b: &Self, ignore_values: bool) -> bool {
        if ignore_values {
            a.key_string() == b.key_string()
        } else {
            Self::is(a, b)
        }
    }

    /// Merge events sharing a key into one event per key, later events'
    /// fields overriding earlier ones. `deep` merges nested objects
    /// recursively instead of replacing whole subtrees. Key groups keep
    /// their first-appearance order.
    #[must_use]
    pub fn merge(events: &[Self], deep: bool) -> Vec<Self> {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, (K, Data)> = HashMap::new();
        for e in events {
            let ks = e.key_string();
            match grouped.get_mut(&ks) {
                Some((_, acc)) => {
                    *acc = if deep {
                        value::merge_deep(acc, &e.data)
                    } else {
                        value::merge_shallow(acc, &e.data)
                    };
                }
                None => {
                    order.push(ks.clone());
                    grouped.insert(ks, (e.key.clone(), (*e.data).clone()));
                }
            }
        }
        order
            .into_iter()
            .filter_map(|ks| grouped.remove(&ks))
            .map(|(key, data)| Self::new(key, data))
            .collect()
    }

    /// Combine events sharing a key: for each listed field (or every
    /// top-level field seen in the group when `fields` is `None`), collect
    /// the per-event values and reduce them, overlaying the results on the
    /// group's first event.
    #[must_use]
    pub fn combine(events: &[Self], reducer: &Reducer, fields: Option<&[String]>) -> Vec<Self> {
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<&Self>> = HashMap::new();
        for e in events {
            let ks = e.key_string();
            grouped
                .entry(ks.clone())
                .or_insert_with(|| {
                    order.push(ks);
                    Vec::new()
                })
                .push(e);
        }

        let mut out = Vec::with_capacity(order.len());
        for ks in order {
            let Some(group) = grouped.remove(&ks) else {
                continue;
            };
            let field_list: Vec<String> = match fields {
                Some(fs) => fs.to_vec(),
                None => {
                    let mut seen = Vec::new();
                    for e in &group {
                        for name in e.data.keys() {
                            if !seen.contains(name) {
                                seen.push(name.clone());
                            }
                        }
                    }
                    seen
                }
            };

            let template = group[0];
            let mut data = (*template.data).clone();
            for field in &field_list {
                let path = value::split_path(field);
                let values: Vec<Value> = group
                    .iter()
                    .map(|e| e.get_path(&path).cloned().unwrap_or(Value::Null))
                    .collect();
                value::set_at(&mut data, &path, reducer.call(&values));
            }
            out.push(Self::new(template.key.clone(), data));
        }
        out
    }
}

impl<K: Key> PartialEq for Event<K> {
    fn eq(&self, other: &Self) -> bool {
        Self::is(self, other)
    }
}
