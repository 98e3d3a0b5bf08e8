//! Wire-format helpers: columns/points JSON documents to and from events.
//!
//! The document shape:
//!
//! ```json
//! {
//!   "name":    "traffic",
//!   "columns": ["time", "in", "out"],
//!   "points":  [[1465084800000, 52, 34], [1465084860000, 57, 39]],
//!   "tz":      "America/New_York"
//! }
//! ```
//!
//! The first column names the key kind (`time`, `timerange`, or `index`)
//! and its cells decode per [`Key::from_json`]: a millisecond number, a
//! `[begin, end]` pair, or an index string. `tz` (default `Etc/UTC`) only
//! affects calendar indexes. Decoding into the wrong key type — an
//! `"index"` column into a `Time`-keyed series, say — fails with
//! `InvalidKeyKind`.

use crate::error::{Error, Result};
use crate::event::Event;
use crate::key::{Key, KeyKind};
use crate::value::{self, Data};
use chrono_tz::Tz;
use serde_json::{Map, Value};

/// Encode events as a wire document. Field columns are the union of the
/// events' top-level fields, sorted; cells for absent fields are null.
#[must_use]
pub fn to_wire<K: Key>(name: Option<&str>, events: &[Event<K>]) -> Value {
    let mut fields: Vec<String> = Vec::new();
    for e in events {
        for k in e.data().keys() {
            if !fields.contains(k) {
                fields.push(k.clone());
            }
        }
    }
    fields.sort();

    let mut columns = vec![Value::String(K::KIND.column_name().to_string())];
    columns.extend(fields.iter().map(|f| Value::String(f.clone())));

    let points: Vec<Value> = events
        .iter()
        .map(|e| {
            let mut row = vec![e.key().to_json()];
            row.extend(
                fields
                    .iter()
                    .map(|f| e.data().get(f).cloned().unwrap_or(Value::Null)),
            );
            Value::Array(row)
        })
        .collect();

    let mut doc = Map::new();
    if let Some(name) = name {
        doc.insert("name".to_string(), Value::String(name.to_string()));
    }
    doc.insert("columns".to_string(), Value::Array(columns));
    doc.insert("points".to_string(), Value::Array(points));
    Value::Object(doc)
}

/// Decode a wire document into `K`-keyed events.
pub fn from_wire<K: Key>(doc: &Value) -> Result<Vec<Event<K>>> {
    let obj = doc
        .as_object()
        .ok_or_else(|| Error::MalformedWire("document is not an object".to_string()))?;

    let tz: Tz = match obj.get("tz") {
        None | Some(Value::Null) => chrono_tz::UTC,
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| Error::MalformedWire(format!("unknown timezone `{s}`")))?,
        Some(other) => {
            return Err(Error::MalformedWire(format!("bad tz field: {other}")));
        }
    };

    let columns: Vec<&str> = obj
        .get("columns")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MalformedWire("missing columns".to_string()))?
        .iter()
        .map(|c| {
            c.as_str()
                .ok_or_else(|| Error::MalformedWire(format!("non-string column: {c}")))
        })
        .collect::<Result<_>>()?;

    let (key_column, field_columns) = columns
        .split_first()
        .ok_or_else(|| Error::MalformedWire("empty columns".to_string()))?;

    match KeyKind::from_column_name(key_column) {
        Some(kind) if kind == K::KIND => {}
        Some(_) => {
            return Err(Error::InvalidKeyKind {
                op: "wire::from_wire",
                expected: K::KIND,
                actual: (*key_column).to_string(),
            });
        }
        None => {
            return Err(Error::MalformedWire(format!(
                "unknown key column `{key_column}`"
            )));
        }
    }

    let points = obj
        .get("points")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MalformedWire("missing points".to_string()))?;

    let mut events = Vec::with_capacity(points.len());
    for point in points {
        let row = point
            .as_array()
            .ok_or_else(|| Error::MalformedWire(format!("non-array point: {point}")))?;
        if row.len() != columns.len() {
            return Err(Error::MalformedWire(format!(
                "point width {} does not match {} columns",
                row.len(),
                columns.len()
            )));
        }
        let key = K::from_json(&row[0], tz)?;
        let mut data = Data::new();
        for (field, cell) in field_columns.iter().zip(row[1..].iter()) {
            value::set_at(&mut data, &value::split_path(field), cell.clone());
        }
        events.push(Event::new(key, data));
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Index;
    use crate::time::Time;
    use serde_json::json;

    #[test]
    fn wrong_key_column_is_an_invalid_key_kind() {
        let doc = json!({
            "columns": ["index", "value"],
            "points": [["30s-0", 1]],
        });
        let err = from_wire::<Time>(&doc).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyKind { .. }));
        assert!(from_wire::<Index>(&doc).is_ok());
    }

    #[test]
    fn unknown_key_column_is_malformed() {
        let doc = json!({
            "columns": ["when", "value"],
            "points": [],
        });
        assert!(matches!(
            from_wire::<Time>(&doc),
            Err(Error::MalformedWire(_))
        ));
    }
}
