use tideflow::processors::{run, Fill, FillMethod, FillOptions};
use tideflow::testing::{assert_values_close, EventSeriesBuilder};
use tideflow::{Event, SortedCollection, Time};

fn sparse(values: &[Option<f64>]) -> Vec<Event<Time>> {
    EventSeriesBuilder::new().sparse_values(values).build()
}

#[test]
fn linear_fill_gives_up_past_its_limit() {
    // a three-null run with limit 2 is flushed unchanged
    let mut fill = Fill::new(FillOptions::new().method(FillMethod::Linear).limit(2)).unwrap();
    let out = run(&mut fill, sparse(&[Some(1.0), None, None, None, Some(5.0)])).unwrap();
    assert_values_close(
        &out,
        "value",
        &[Some(1.0), None, None, None, Some(5.0)],
        1e-9,
    );
}

#[test]
fn linear_fill_interpolates_within_its_limit() {
    let mut fill = Fill::new(FillOptions::new().method(FillMethod::Linear).limit(3)).unwrap();
    let out = run(&mut fill, sparse(&[Some(1.0), None, None, None, Some(5.0)])).unwrap();
    assert_values_close(
        &out,
        "value",
        &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
        1e-9,
    );
}

#[test]
fn linear_fill_without_a_limit_interpolates_any_run() {
    let mut fill = Fill::new(FillOptions::new().method(FillMethod::Linear)).unwrap();
    let out = run(&mut fill, sparse(&[Some(0.0), None, None, None, None, Some(10.0)])).unwrap();
    assert_values_close(
        &out,
        "value",
        &[Some(0.0), Some(2.0), Some(4.0), Some(6.0), Some(8.0), Some(10.0)],
        1e-9,
    );
}

#[test]
fn interpolation_respects_uneven_spacing() {
    let events = vec![
        Event::of(Time::from_ms(0), 0.0),
        Event::of(Time::from_ms(1_000), serde_json::Value::Null),
        Event::of(Time::from_ms(9_000), serde_json::Value::Null),
        Event::of(Time::from_ms(10_000), 10.0),
    ];
    let mut fill = Fill::new(FillOptions::new().method(FillMethod::Linear)).unwrap();
    let out = run(&mut fill, events).unwrap();
    assert_values_close(
        &out,
        "value",
        &[Some(0.0), Some(1.0), Some(9.0), Some(10.0)],
        1e-9,
    );
}

#[test]
fn zero_fill_bounds_consecutive_fills_per_field() {
    let mut fill = Fill::new(FillOptions::new().limit(1)).unwrap();
    let out = run(&mut fill, sparse(&[None, None, Some(2.0), None, None])).unwrap();
    assert_values_close(
        &out,
        "value",
        &[Some(0.0), None, Some(2.0), Some(0.0), None],
        1e-9,
    );
}

#[test]
fn pad_fill_needs_a_previous_value() {
    let mut fill = Fill::new(FillOptions::new().method(FillMethod::Pad)).unwrap();
    let out = run(&mut fill, sparse(&[None, Some(4.0), None, None])).unwrap();
    assert_values_close(
        &out,
        "value",
        &[None, Some(4.0), Some(4.0), Some(4.0)],
        1e-9,
    );
}

#[test]
fn fill_on_multiple_fields_tracks_counts_separately() {
    let mk = |ms: i64, a: Option<f64>, b: Option<f64>| {
        let mut e = Event::new(Time::from_ms(ms), serde_json::Map::new());
        e = match a {
            Some(v) => e.set("a", v),
            None => e.set("a", serde_json::Value::Null),
        };
        match b {
            Some(v) => e.set("b", v),
            None => e.set("b", serde_json::Value::Null),
        }
    };
    let events = vec![
        mk(0, None, Some(1.0)),
        mk(1_000, Some(1.0), None),
        mk(2_000, None, None),
    ];
    let mut fill = Fill::new(FillOptions::new().fields(&["a", "b"]).limit(1)).unwrap();
    let out = run(&mut fill, events).unwrap();
    assert_values_close(&out, "a", &[Some(0.0), Some(1.0), Some(0.0)], 1e-9);
    assert_values_close(&out, "b", &[Some(1.0), Some(0.0), None], 1e-9);
}

#[test]
fn batch_collection_fill() {
    let collection: SortedCollection<Time> = sparse(&[Some(1.0), None, Some(3.0)])
        .into_iter()
        .collect();
    let filled = collection
        .fill(&FillOptions::new().method(FillMethod::Linear))
        .unwrap();
    assert_values_close(filled.events(), "value", &[Some(1.0), Some(2.0), Some(3.0)], 1e-9);
    // immutability: the source still has its hole
    assert!(!collection.at(1).unwrap().is_valid("value"));
}
