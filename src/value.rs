//! Deep-path helpers over dynamic event data.
//!
//! Event payloads are JSON-shaped trees (`serde_json::Map<String, Value>`).
//! A *field path* addresses a location in the tree either as a dot-joined
//! string (`"a.b.c"`) or as an explicit segment slice; both resolve with the
//! same deep-lookup semantics.
//!
//! A value is **missing** when the path does not resolve or resolves to
//! null. JSON numbers cannot hold NaN, so arithmetic that would produce one
//! lands as null via [`number`], which folds NaN into the missing case.

use serde_json::{Map, Value};

/// The payload map carried by every event.
pub type Data = Map<String, Value>;

/// Split a dot-path field spec into segments.
#[must_use]
pub fn split_path(field: &str) -> Vec<&str> {
    field.split('.').collect()
}

/// Deep lookup of `path` in `data`. Empty paths and paths through
/// non-object values resolve to `None`.
#[must_use]
pub fn lookup<'a>(data: &'a Data, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = data.get(*first)?;
    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

/// Deep set of `path` in `data`, creating intermediate objects along the
/// way. Existing non-object values on the path are replaced.
pub fn set_at(data: &mut Data, path: &[&str], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    if rest.is_empty() {
        data.insert((*first).to_string(), value);
        return;
    }
    let slot = data
        .entry((*first).to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(inner) = slot {
        set_at(inner, rest, value);
    }
}

/// True when a looked-up value is absent or null.
#[must_use]
pub fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

/// Numeric view of a value, when it is a JSON number.
#[must_use]
pub fn as_f64(value: &Value) -> Option<f64> {
    value.as_f64()
}

/// Wrap an `f64` as a JSON value; NaN and infinities become null.
#[must_use]
pub fn number(x: f64) -> Value {
    serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
}

/// Shallow merge: `overlay`'s top-level fields override `base`'s.
#[must_use]
pub fn merge_shallow(base: &Data, overlay: &Data) -> Data {
    let mut out = base.clone();
    for (k, v) in overlay {
        out.insert(k.clone(), v.clone());
    }
    out
}

/// Deep merge: nested objects merge recursively, any other collision is won
/// by `overlay`.
#[must_use]
pub fn merge_deep(base: &Data, overlay: &Data) -> Data {
    let mut out = base.clone();
    for (k, v) in overlay {
        let merged = match (out.get(k), v) {
            (Some(Value::Object(b)), Value::Object(o)) => Value::Object(merge_deep(b, o)),
            _ => v.clone(),
        };
        out.insert(k.clone(), merged);
    }
    out
}
