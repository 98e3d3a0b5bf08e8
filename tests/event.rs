use serde_json::{json, Value};
use tideflow::reducers::{self, Missing};
use tideflow::{Event, Time};

fn event_with(ms: i64, fields: &[(&str, Value)]) -> Event<Time> {
    let mut data = serde_json::Map::new();
    for (k, v) in fields {
        data.insert((*k).to_string(), v.clone());
    }
    Event::new(Time::from_ms(ms), data)
}

#[test]
fn deep_get_and_set_share_semantics_with_path_arrays() {
    let e = event_with(0, &[("net", json!({"in": {"bytes": 42}}))]);
    assert_eq!(e.get("net.in.bytes"), Some(&json!(42)));
    assert_eq!(e.get_path(&["net", "in", "bytes"]), Some(&json!(42)));
    assert_eq!(e.get("net.out.bytes"), None);

    let e2 = e.set("net.out.bytes", 7);
    assert_eq!(e2.get("net.out.bytes"), Some(&json!(7)));
    assert_eq!(e2.get("net.in.bytes"), Some(&json!(42)));
    assert_eq!(e.get("net.out.bytes"), None);
}

#[test]
fn validity_is_per_field() {
    let e = event_with(0, &[("a", json!(1)), ("b", Value::Null)]);
    assert!(e.is_valid("a"));
    assert!(!e.is_valid("b"));
    assert!(!e.is_valid("missing"));
    assert!(!e.all_valid(&["a", "b"]));
    assert!(e.all_valid(&["a"]));
}

#[test]
fn select_keeps_only_listed_fields() {
    let e = event_with(0, &[("a", json!(1)), ("b", json!(2)), ("c", json!(3))]);
    let s = e.select(&["a", "c", "ghost"]);
    assert_eq!(s.data().len(), 2);
    assert_eq!(s.get("a"), Some(&json!(1)));
    assert_eq!(s.get("b"), None);
}

#[test]
fn merge_is_associative_with_later_writes_winning() {
    let a = event_with(0, &[("x", json!(1)), ("shared", json!("a"))]);
    let b = event_with(0, &[("y", json!(2)), ("shared", json!("b"))]);
    let c = event_with(0, &[("z", json!(3))]);

    let all_at_once = Event::merge(&[a.clone(), b.clone(), c.clone()], false);
    let ab = Event::merge(&[a, b], false);
    let staged = Event::merge(&[ab[0].clone(), c], false);

    assert_eq!(all_at_once.len(), 1);
    assert!(Event::is(&all_at_once[0], &staged[0]));
    assert_eq!(all_at_once[0].get("shared"), Some(&json!("b")));
    assert_eq!(all_at_once[0].get("x"), Some(&json!(1)));
}

#[test]
fn merge_keeps_distinct_keys_apart() {
    let a = Event::of(Time::from_ms(0), 1);
    let b = Event::of(Time::from_ms(1_000), 2);
    let merged = Event::merge(&[a, b], false);
    assert_eq!(merged.len(), 2);
}

#[test]
fn deep_merge_recurses_where_shallow_replaces() {
    let a = event_with(0, &[("net", json!({"in": 1, "out": 2}))]);
    let b = event_with(0, &[("net", json!({"out": 9}))]);

    let shallow = Event::merge(&[a.clone(), b.clone()], false);
    assert_eq!(shallow[0].get("net"), Some(&json!({"out": 9})));

    let deep = Event::merge(&[a, b], true);
    assert_eq!(deep[0].get("net"), Some(&json!({"in": 1, "out": 9})));
}

#[test]
fn combine_reduces_per_key_and_field() {
    let events = vec![
        Event::of(Time::from_ms(0), 2.0),
        Event::of(Time::from_ms(0), 4.0),
        Event::of(Time::from_ms(1_000), 10.0),
    ];
    let combined = Event::combine(&events, &reducers::sum(Missing::Ignore), None);
    assert_eq!(combined.len(), 2);
    assert_eq!(combined[0].get_f64("value"), Some(6.0));
    assert_eq!(combined[1].get_f64("value"), Some(10.0));
}

#[test]
fn combine_with_an_explicit_field_list_leaves_others_from_the_template() {
    let mk = |v: f64, label: &str| {
        event_with(0, &[("v", json!(v)), ("label", json!(label))])
    };
    let combined = Event::combine(
        &[mk(1.0, "first"), mk(2.0, "second")],
        &reducers::sum(Missing::Ignore),
        Some(&["v".to_string()]),
    );
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].get_f64("v"), Some(3.0));
    // the template (first event of the group) supplies untouched fields
    assert_eq!(combined[0].get("label"), Some(&json!("first")));
}

#[test]
fn json_rendering_names_the_key_kind() {
    let e = Event::of(Time::from_ms(1_000), 5);
    let j = e.to_json();
    assert_eq!(j["time"], json!(1_000));
    assert_eq!(j["data"]["value"], json!(5));
}
