use std::time::Duration;

use crate::helpers::*;
use kbar::{Granularity, Kbar, KbarError};

#[tokio::test]
async fn missing_instrument_becomes_warning() {
    let dir = MockDataDir::with_sessions(&[AAPL, MSFT], 1).unwrap();
    let kbar = kbar_for(&dir);

    let report = kbar
        .plan()
        .instruments(&[AAPL, MISSING, MSFT])
        .unwrap()
        .targets(&[Granularity::M5])
        .run()
        .await
        .unwrap();

    assert_eq!(report.entries.len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        KbarError::DataSourceNotFound { .. }
    ));
    assert!(!report.is_clean());
}

#[tokio::test]
async fn malformed_file_fails_only_its_job() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    dir.write_raw(
        MSFT,
        Granularity::M1,
        "time,open,high,low,close,volume,turnover,turnover_rate\n\
         2024-01-02 09:30,10,11,9,10.5,100,,\n\
         not-a-time,10,11,9,10.5,100,,\n",
    )
    .unwrap();
    let kbar = kbar_for(&dir);

    let report = kbar
        .plan()
        .instruments(&[AAPL, MSFT])
        .unwrap()
        .targets(&[Granularity::Day])
        .run()
        .await
        .unwrap();
    assert!(report.get(AAPL, Granularity::Day).is_some());
    assert!(report.get(MSFT, Granularity::Day).is_none());
    assert!(matches!(report.warnings[..], [KbarError::TimeFormat { .. }]));
}

#[tokio::test]
async fn single_failure_is_returned_unchanged() {
    let dir = MockDataDir::new().unwrap();
    let kbar = kbar_for(&dir);
    let err = kbar
        .plan()
        .instruments(&[MISSING])
        .unwrap()
        .targets(&[Granularity::Day])
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, KbarError::DataSourceNotFound { .. }));
}

#[tokio::test]
async fn every_job_failing_collapses() {
    let dir = MockDataDir::new().unwrap();
    let kbar = kbar_for(&dir);
    let err = kbar
        .plan()
        .instruments(&[MISSING, "GONE"])
        .unwrap()
        .targets(&[Granularity::Day])
        .run()
        .await
        .unwrap_err();
    match err {
        KbarError::AllJobsFailed(errors) => {
            assert_eq!(errors.len(), 2);
            assert!(
                errors
                    .iter()
                    .all(|e| matches!(e, KbarError::DataSourceNotFound { .. }))
            );
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn single_worker_still_completes_every_job() {
    let codes = [AAPL, MSFT, TSLA];
    let dir = MockDataDir::with_sessions(&codes, 1).unwrap();
    let kbar = Kbar::builder()
        .data_dir(dir.path())
        .max_workers(1)
        .build()
        .unwrap();

    let report = kbar
        .plan()
        .instruments(&codes)
        .unwrap()
        .targets(&[Granularity::M5, Granularity::Day])
        .run()
        .await
        .unwrap();
    assert_eq!(report.entries.len(), 6);
    assert!(report.is_clean());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn batch_deadline_yields_timeout() {
    let codes = [AAPL, MSFT, TSLA];
    let dir = MockDataDir::with_sessions(&codes, 10).unwrap();
    let kbar = Kbar::builder()
        .data_dir(dir.path())
        .max_workers(1)
        .job_timeout(Duration::ZERO)
        .build()
        .unwrap();

    let err = kbar
        .plan()
        .instruments(&codes)
        .unwrap()
        .targets(&[Granularity::M5, Granularity::M30, Granularity::Day])
        .run()
        .await
        .unwrap_err();
    match err {
        KbarError::RequestTimeout { what } => assert_eq!(what, "plan"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn source_with_wrong_cadence_fails_its_job() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    // Daily rows stored under the one-minute name.
    let daily = kbar::resample_to_daily(minute_days(MSFT, (2024, 1, 2), 5).unwrap());
    dir.write(MSFT, Granularity::M1, &daily).unwrap();
    let kbar = kbar_for(&dir);

    let report = kbar
        .plan()
        .instruments(&[AAPL, MSFT])
        .unwrap()
        .targets(&[Granularity::M5])
        .run()
        .await
        .unwrap();
    assert!(report.get(AAPL, Granularity::M5).is_some());
    assert!(report.get(MSFT, Granularity::M5).is_none());
    match &report.warnings[..] {
        [KbarError::DataFormat { reason, .. }] => assert!(reason.contains("declared 1m")),
        other => panic!("unexpected: {other:?}"),
    }

    let err = kbar.check(MSFT, Granularity::M1).unwrap_err();
    assert!(matches!(err, KbarError::DataFormat { .. }));
}
