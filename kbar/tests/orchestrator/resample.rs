use crate::helpers::*;
use kbar::{Bar, CsvBarSource, DateRange, Granularity, KbarError, Schema};

#[test]
fn resample_streams_five_minute_buckets() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_for(&dir);

    let bars: Vec<Bar> = kbar
        .resample(AAPL, Granularity::M1, Granularity::M5, DateRange::all())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(bars.len(), SESSION_BARS / 5);

    let first = &bars[0];
    assert_eq!(first.ts, at(2024, 1, 2, 9, 30));
    assert!(approx(first.open, 140.0));
    assert!(approx(first.high, 140.0 + 0.4 + 0.5));
    assert!(approx(first.low, 139.5));
    assert!(approx(first.close, 140.0 + 0.4 + 0.2));
    assert!(approx(first.volume, 5000.0));
    assert_eq!(first.turnover, Some(500_000.0));
    assert_eq!(first.turnover_rate, None);
    assert_eq!(first.symbol.as_deref(), Some(AAPL));
    assert_eq!(bars[47].ts, at(2024, 1, 2, 13, 25));
}

#[test]
fn resample_yields_before_reading_everything() {
    let dir = MockDataDir::with_sessions(&[AAPL], 5).unwrap();
    let kbar = kbar_for(&dir);

    let mut stream = kbar
        .resample(AAPL, Granularity::M1, Granularity::M30, DateRange::all())
        .unwrap();
    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.ts, at(2024, 1, 2, 9, 30));
    assert_eq!(stream.emitted(), 1);
}

#[test]
fn resample_daily_over_range() {
    let dir = MockDataDir::with_sessions(&[MSFT], 4).unwrap();
    let kbar = kbar_for(&dir);
    let range = DateRange::new(Some(day(2024, 1, 3)), Some(at(2024, 1, 4, 23, 59))).unwrap();

    let days: Vec<Bar> = kbar
        .resample(MSFT, Granularity::M1, Granularity::Day, range)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].ts, day(2024, 1, 3));
    assert_eq!(days[1].ts, day(2024, 1, 4));
    assert!(approx(days[0].volume, 1000.0 * SESSION_BARS as f64));
}

#[test]
fn resample_rejects_non_coarser_target() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_for(&dir);
    for (from, to) in [
        (Granularity::M5, Granularity::M1),
        (Granularity::M5, Granularity::M5),
        (Granularity::Week, Granularity::Day),
        (Granularity::M5, Granularity::minutes(7).unwrap()),
        (Granularity::M15, Granularity::minutes(20).unwrap()),
    ] {
        let err = kbar.resample(AAPL, from, to, DateRange::all()).err();
        assert!(
            matches!(err, Some(KbarError::InvalidArg(_))),
            "{from} -> {to}: {err:?}"
        );
    }
}

#[test]
fn resample_surfaces_read_error_and_stops() {
    let dir = MockDataDir::new().unwrap();
    dir.write_raw(
        AAPL,
        Granularity::M1,
        "time,open,high,low,close,volume,turnover,turnover_rate\n\
         2024-01-02 09:30,10,11,9,10.5,100,,\n\
         2024-01-02 09:31,10,11,9,10.5,100,,\n\
         2024-01-02 9:32,10,11,9,10.5,100,,\n\
         2024-01-02 09:33,10,11,9,10.5,100,,\n",
    )
    .unwrap();
    let kbar = kbar_for(&dir);
    let results: Vec<_> = kbar
        .resample(AAPL, Granularity::M1, Granularity::M5, DateRange::all())
        .unwrap()
        .collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(KbarError::TimeFormat { .. })));
}

#[test]
fn derive_writes_under_output_dir() {
    let dir = MockDataDir::with_sessions(&[AAPL], 2).unwrap();
    let out = tempfile::tempdir().unwrap();
    let kbar = kbar_with_output(&dir, out.path());

    let (path, n) = kbar.derive(AAPL, Granularity::M1, Granularity::Day).unwrap();
    assert_eq!(path, out.path().join("AAPL_day.csv"));
    assert_eq!(n, 2);

    let text = std::fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("time,open,high,low,close,volume,turnover,turnover_rate")
    );
    assert!(lines.next().unwrap().starts_with("2024-01-02,140,"));

    let back: Vec<Bar> = CsvBarSource::open(
        &path,
        Schema::standard(),
        Default::default(),
        DateRange::all(),
    )
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap();
    let reference = kbar.load(AAPL, Granularity::Day, DateRange::all()).unwrap();
    assert_eq!(back.len(), reference.len());
    for (a, b) in back.iter().zip(&reference) {
        assert_eq!(a.ts, b.ts);
        assert!(approx(a.close, b.close));
        assert!(approx(a.volume, b.volume));
        assert_eq!(a.turnover_rate, None);
    }
}

#[test]
fn derived_files_feed_the_next_derive() {
    // Minute file only; outputs land next to it and are read back as inputs.
    let dir = MockDataDir::new().unwrap();
    dir.write(AAPL, Granularity::M1, &minute_days(AAPL, (2024, 1, 2), 3).unwrap())
        .unwrap();
    let kbar = kbar_with_output(&dir, dir.path());

    let (_, thirty) = kbar.derive(AAPL, Granularity::M1, Granularity::M30).unwrap();
    assert_eq!(thirty, 3 * 8);
    let (_, days) = kbar.derive(AAPL, Granularity::M30, Granularity::Day).unwrap();
    assert_eq!(days, 3);

    let loaded_thirty = kbar.load(AAPL, Granularity::M30, DateRange::all()).unwrap();
    assert_eq!(loaded_thirty.len(), thirty);
    let chained = kbar.load(AAPL, Granularity::Day, DateRange::all()).unwrap();
    let minutes = kbar.load(AAPL, Granularity::M1, DateRange::all()).unwrap();
    let report = kbar::Validator::new(kbar.config().tolerance)
        .validate(&chained, &kbar::resample_to_daily(minutes));
    assert!(report.is_valid, "{report:?}");
    assert_eq!(report.common, 3);
}

#[test]
fn derive_refuses_to_overwrite_inputs() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_with_output(&dir, dir.path());
    let reference = dir.file(AAPL, Granularity::Day);
    let before = std::fs::read_to_string(&reference).unwrap();

    let err = kbar
        .derive(AAPL, Granularity::M1, Granularity::Day)
        .unwrap_err();
    assert!(matches!(err, KbarError::InvalidArg(_)), "{err:?}");
    assert!(kbar.output_path_for(AAPL, Granularity::Day).is_err());
    assert_eq!(std::fs::read_to_string(&reference).unwrap(), before);

    // Paths that do not collide with an existing input are still handed out.
    assert_eq!(
        kbar.output_path_for(AAPL, Granularity::M5).unwrap(),
        dir.file(AAPL, Granularity::M5)
    );
}

#[test]
fn late_bars_are_counted_and_fail_derive() {
    let dir = MockDataDir::new().unwrap();
    dir.write_raw(
        AAPL,
        Granularity::M1,
        "time,open,high,low,close,volume,turnover,turnover_rate\n\
         2024-01-02 09:30,10,11,9,10.5,100,,\n\
         2024-01-02 09:31,10,11,9,10.5,100,,\n\
         2024-01-02 09:40,10,11,9,10.5,100,,\n\
         2024-01-02 09:32,10,11,9,10.5,100,,\n",
    )
    .unwrap();
    let out = tempfile::tempdir().unwrap();
    let kbar = kbar_with_output(&dir, out.path());

    let mut stream = kbar
        .resample(AAPL, Granularity::M1, Granularity::M5, DateRange::all())
        .unwrap();
    let bars: Vec<Bar> = stream.by_ref().collect::<Result<_, _>>().unwrap();
    assert_eq!(bars.len(), 2);
    assert!(approx(bars[0].volume, 200.0));
    assert_eq!(stream.dropped(), 1);

    match kbar.derive(AAPL, Granularity::M1, Granularity::M5) {
        Err(KbarError::DataFormat { reason, .. }) => assert!(reason.contains("1 out-of-order")),
        other => panic!("unexpected: {other:?}"),
    }

    let strict = kbar::Kbar::builder()
        .data_dir(dir.path())
        .strict_ordering(true)
        .build()
        .unwrap();
    let results: Vec<_> = strict
        .resample(AAPL, Granularity::M1, Granularity::M5, DateRange::all())
        .unwrap()
        .collect();
    assert!(matches!(results.last(), Some(Err(KbarError::DataFormat { .. }))));
}

#[test]
fn derive_without_output_dir_is_refused() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_for(&dir);
    let err = kbar
        .derive(AAPL, Granularity::M1, Granularity::M5)
        .unwrap_err();
    assert!(matches!(err, KbarError::InvalidArg(_)));
    assert!(!dir.file(AAPL, Granularity::M5).exists());
}
