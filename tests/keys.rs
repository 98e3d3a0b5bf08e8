use tideflow::{Duration, Index, Key, Period, Time, TimeRange, Window};

#[test]
fn index_strings_round_trip_with_their_ranges() {
    // begin = bucket * freq + offset; length = duration
    for (s, begin, len) in [
        ("30s-0", 0, 30_000),
        ("30s-4", 120_000, 30_000),
        ("5m-2", 600_000, 300_000),
        ("1h+1800000-1", 5_400_000, 3_600_000),
        ("5m@1m-3", 180_000, 300_000),
    ] {
        let idx = Index::parse(s).unwrap();
        assert_eq!(idx.to_string(), s, "string round trip of {s}");
        assert_eq!(idx.begin().ms(), begin, "begin of {s}");
        assert_eq!(idx.end().ms() - idx.begin().ms(), len, "duration of {s}");

        let reparsed = Index::parse(&idx.to_string()).unwrap();
        assert_eq!(reparsed, idx);
    }
}

#[test]
fn period_next_is_strict_and_idempotent_over_alignment() {
    let p = Period::new(Duration::minutes(1));
    let t = Time::from_ms(90_000);
    let n = p.next(t);
    assert!(n > t);
    assert!(p.is_aligned(n));
    // an aligned input advances by one full frequency, never returning
    // itself
    assert_eq!(p.next(n), Time::from_ms(n.ms() + 60_000));
}

#[test]
fn window_membership_matches_the_inequality() {
    // indexes n with n*freq + offset <= t < n*freq + offset + duration
    let w = Window::sliding(
        Duration::minutes(5),
        Period::new(Duration::minutes(1)).with_offset(30_000),
    );
    let t = Time::from_ms(400_000);
    let set = w.index_set(t);
    assert!(!set.is_empty());
    for idx in &set {
        assert!(idx.begin() <= t && t < idx.end(), "index {idx} must contain t");
    }
    // and nothing adjacent qualifies
    let lowest = set.first().unwrap().begin().ms();
    let highest = set.last().unwrap().begin().ms();
    assert!(lowest - 60_000 + 300_000 <= 400_000);
    assert!(highest + 60_000 > 400_000);
}

#[test]
fn timerange_is_ordered_and_keyed_by_midpoint() {
    let tr = TimeRange::from_ms(3_000, 1_000);
    assert_eq!(tr.begin_time().ms(), 1_000);
    assert_eq!(tr.timestamp().ms(), 2_000);
    assert_eq!(tr.key_string(), "1000,3000");
}

#[test]
fn calendar_indexes_cover_their_spans() {
    let feb = Index::parse("2016-02").unwrap();
    // leap year: 29 days
    assert_eq!(feb.end().ms() - feb.begin().ms(), 29 * 86_400_000);

    let day = Index::parse("2015-07-14").unwrap();
    assert_eq!(day.end().ms() - day.begin().ms(), 86_400_000);

    let year = Index::parse("2015").unwrap();
    assert_eq!(year.end().ms() - year.begin().ms(), 365 * 86_400_000);
}

#[test]
fn duration_literals_round_trip_through_display() {
    for s in ["30s", "5m", "1h", "1d", "1w", "90s", "15l"] {
        let d: Duration = s.parse().unwrap();
        assert_eq!(d.to_string(), s);
        assert_eq!(d.to_string().parse::<Duration>().unwrap(), d);
    }
}

#[test]
fn key_serialization_round_trips_through_serde() {
    let t = Time::from_ms(1_465_084_800_000);
    let json = serde_json::to_string(&t).unwrap();
    assert_eq!(serde_json::from_str::<Time>(&json).unwrap(), t);

    let idx = Index::parse("30s-4").unwrap();
    let json = serde_json::to_string(&idx).unwrap();
    assert_eq!(json, "\"30s-4\"");
    assert_eq!(serde_json::from_str::<Index>(&json).unwrap(), idx);
}

#[test]
fn malformed_inputs_fail_with_typed_errors() {
    use tideflow::Error;

    assert!(matches!(
        Index::parse("not-an-index"),
        Err(Error::MalformedIndexString(_))
    ));
    assert!(matches!(
        "30q".parse::<Duration>(),
        Err(Error::InvalidDurationString(_))
    ));
    assert!(matches!(
        "spline".parse::<tideflow::AlignMethod>(),
        Err(Error::UnknownAlignmentMethod(_))
    ));
    assert!(matches!(
        "cubic".parse::<tideflow::FillMethod>(),
        Err(Error::UnknownFillMethod(_))
    ));
}
