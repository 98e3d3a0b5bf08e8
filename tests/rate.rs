use tideflow::processors::{run, Rate, RateOptions};
use tideflow::testing::EventSeriesBuilder;
use tideflow::{Event, Key, SortedCollection, Time};

#[test]
fn rate_between_two_points() {
    let events = EventSeriesBuilder::new()
        .point(1_000, 10.0)
        .point(3_000, 16.0)
        .build();
    let out = run(&mut Rate::new(RateOptions::new()), events).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].key_string(), "1000,3000");
    assert_eq!(out[0].key().begin().ms(), 1_000);
    assert_eq!(out[0].key().end().ms(), 3_000);
    assert_eq!(out[0].get_f64("value_rate"), Some(3.0));
}

#[test]
fn each_consecutive_pair_yields_one_range() {
    let events = EventSeriesBuilder::new()
        .start_ms(0)
        .step_ms(2_000)
        .values(&[0.0, 4.0, 10.0, 12.0])
        .build();
    let out = run(&mut Rate::new(RateOptions::new()), events).unwrap();
    let rates: Vec<Option<f64>> = out.iter().map(|e| e.get_f64("value_rate")).collect();
    assert_eq!(rates, vec![Some(2.0), Some(3.0), Some(1.0)]);
}

#[test]
fn missing_endpoints_produce_null_rates() {
    let events = EventSeriesBuilder::new()
        .sparse_values(&[Some(1.0), None, Some(5.0)])
        .build();
    let out = run(&mut Rate::new(RateOptions::new()), events).unwrap();
    assert_eq!(out.len(), 2);
    assert!(!out[0].is_valid("value_rate"));
    assert!(!out[1].is_valid("value_rate"));
}

#[test]
fn batch_collection_rate() {
    let collection: SortedCollection<Time> = EventSeriesBuilder::new()
        .point(1_000, 10.0)
        .point(3_000, 16.0)
        .build()
        .into_iter()
        .collect();
    let rates = collection.rate(&RateOptions::new()).unwrap();
    assert_eq!(rates.size(), 1);
    assert_eq!(rates.at(0).unwrap().get_f64("value_rate"), Some(3.0));
}

#[test]
fn nested_fields_get_suffixed_in_place() {
    let mk = |ms: i64, v: i64| {
        Event::new(Time::from_ms(ms), serde_json::Map::new()).set("net.in", v)
    };
    let out = run(
        &mut Rate::new(RateOptions::new().fields(&["net.in"])),
        vec![mk(0, 100), mk(1_000, 250)],
    )
    .unwrap();
    assert_eq!(out[0].get_f64("net.in_rate"), Some(150.0));
}
