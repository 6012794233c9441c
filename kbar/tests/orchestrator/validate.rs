use crate::helpers::*;
use kbar::{DateRange, Granularity, KbarError, ValidationReport, resample_to_daily};

#[test]
fn validate_matching_daily_series_passes() {
    let dir = MockDataDir::with_sessions(&[AAPL], 3).unwrap();
    let kbar = kbar_for(&dir);

    let minutes = kbar.load(AAPL, Granularity::M1, DateRange::all()).unwrap();
    let daily = resample_to_daily(minutes);
    let report = kbar
        .validate(AAPL, &daily, Granularity::Day, DateRange::all())
        .unwrap();
    assert!(report.is_valid, "{report:?}");
    assert_eq!(report.common, 3);
    assert!(report.mismatches.is_empty());
}

#[test]
fn validate_reports_close_mismatch() {
    let dir = MockDataDir::with_sessions(&[AAPL], 2).unwrap();
    tamper_daily_close(&dir, AAPL, 2, 0.25);
    let kbar = kbar_for(&dir);

    let minutes = kbar.load(AAPL, Granularity::M1, DateRange::all()).unwrap();
    let report = kbar
        .validate(AAPL, &resample_to_daily(minutes), Granularity::Day, DateRange::all())
        .unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.common, 2);
    assert_eq!(report.mismatches.keys().collect::<Vec<_>>(), vec!["close"]);
    assert!(report.mismatches["close"].contains("1 of 2"));
}

#[test]
fn validate_without_overlap() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_for(&dir);
    let later = minute_days(AAPL, (2024, 3, 1), 1).unwrap();
    let report = kbar
        .validate(AAPL, &resample_to_daily(later), Granularity::Day, DateRange::all())
        .unwrap();
    assert_eq!(report, ValidationReport::no_overlap());
}

#[test]
fn validate_missing_reference_is_error() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_for(&dir);
    let err = kbar
        .validate(AAPL, &[], Granularity::Week, DateRange::all())
        .unwrap_err();
    assert!(matches!(err, KbarError::DataSourceNotFound { .. }));
}

#[test]
fn check_counts_clean_file() {
    let dir = MockDataDir::with_sessions(&[AAPL], 2).unwrap();
    let kbar = kbar_for(&dir);
    assert_eq!(kbar.check(AAPL, Granularity::M1).unwrap(), 2 * SESSION_BARS);
    assert_eq!(kbar.check(AAPL, Granularity::Day).unwrap(), 2);
}

#[test]
fn check_flags_inverted_range() {
    let dir = MockDataDir::new().unwrap();
    dir.write_raw(
        AAPL,
        Granularity::M1,
        "time,open,high,low,close,volume,turnover,turnover_rate\n\
         2024-01-02 09:30,10,9,11,10,100,,\n",
    )
    .unwrap();
    let kbar = kbar_for(&dir);
    let err = kbar.check(AAPL, Granularity::M1).unwrap_err();
    assert!(matches!(err, KbarError::DataFormat { .. }), "{err:?}");
}

#[test]
fn check_flags_out_of_order_rows() {
    let dir = MockDataDir::new().unwrap();
    dir.write_raw(
        AAPL,
        Granularity::M1,
        "time,open,high,low,close,volume,turnover,turnover_rate\n\
         2024-01-02 09:31,10,11,9,10,100,,\n\
         2024-01-02 09:30,10,11,9,10,100,,\n",
    )
    .unwrap();
    let kbar = kbar_for(&dir);
    let err = kbar.check(AAPL, Granularity::M1).unwrap_err();
    assert!(matches!(err, KbarError::DataFormat { .. }), "{err:?}");
}
