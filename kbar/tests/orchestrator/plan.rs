use crate::helpers::*;
use kbar::{DateRange, Granularity, KbarError};

#[tokio::test]
async fn plan_runs_one_job_per_instrument_and_target() {
    let dir = MockDataDir::with_sessions(&[AAPL, MSFT], 2).unwrap();
    let kbar = kbar_for(&dir);

    let report = kbar
        .plan()
        .instruments(&[MSFT, AAPL])
        .unwrap()
        .targets(&[Granularity::Day, Granularity::M5, Granularity::M30])
        .run()
        .await
        .unwrap();

    assert!(report.is_clean());
    let keys: Vec<(&str, Granularity)> = report
        .entries
        .iter()
        .map(|e| (e.instrument.as_str(), e.granularity))
        .collect();
    assert_eq!(
        keys,
        vec![
            (AAPL, Granularity::M5),
            (AAPL, Granularity::M30),
            (AAPL, Granularity::Day),
            (MSFT, Granularity::M5),
            (MSFT, Granularity::M30),
            (MSFT, Granularity::Day),
        ]
    );
    assert_eq!(report.get(AAPL, Granularity::M5).unwrap().bars, 2 * 48);
    assert_eq!(report.get(AAPL, Granularity::M30).unwrap().bars, 2 * 8);
    assert_eq!(report.get(MSFT, Granularity::Day).unwrap().bars, 2);
    assert!(report.entries.iter().all(|e| e.output.is_none()));
}

#[tokio::test]
async fn chained_plan_matches_direct_plan() {
    let dir = MockDataDir::with_sessions(&[AAPL], 3).unwrap();
    let kbar = kbar_for(&dir);
    let targets = [Granularity::M5, Granularity::M30, Granularity::Day];

    let chained = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&targets)
        .chained(true)
        .validate_against(Granularity::Day)
        .run()
        .await
        .unwrap();
    let direct = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&targets)
        .validate_against(Granularity::Day)
        .run()
        .await
        .unwrap();

    assert_eq!(chained.entries, direct.entries);
    let day = chained.get(AAPL, Granularity::Day).unwrap();
    let validation = day.validation.as_ref().unwrap();
    assert!(validation.is_valid, "{validation:?}");
    assert_eq!(validation.common, 3);
    assert!(chained.get(AAPL, Granularity::M5).unwrap().validation.is_none());
}

#[tokio::test]
async fn plan_writes_outputs() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let out = tempfile::tempdir().unwrap();
    let kbar = kbar_with_output(&dir, out.path());

    let report = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&[Granularity::M5, Granularity::Day])
        .chained(true)
        .write_outputs(true)
        .run()
        .await
        .unwrap();

    for g in [Granularity::M5, Granularity::Day] {
        let entry = report.get(AAPL, g).unwrap();
        let path = entry.output.as_ref().unwrap();
        assert_eq!(path, &out.path().join(g.file_name(AAPL)));
        let rows = std::fs::read_to_string(path).unwrap().lines().count();
        assert_eq!(rows, entry.bars + 1);
    }
}

#[tokio::test]
async fn plan_reports_failed_validation_without_failing() {
    let dir = MockDataDir::with_sessions(&[AAPL, MSFT], 2).unwrap();
    tamper_daily_close(&dir, MSFT, 2, 0.25);
    let kbar = kbar_for(&dir);

    let report = kbar
        .plan()
        .instruments(&[AAPL, MSFT])
        .unwrap()
        .targets(&[Granularity::Day])
        .validate_against(Granularity::Day)
        .run()
        .await
        .unwrap();

    assert!(report.warnings.is_empty());
    assert!(!report.is_clean());
    let aapl = report.get(AAPL, Granularity::Day).unwrap();
    assert!(aapl.validation.as_ref().unwrap().is_valid);
    let msft = report.get(MSFT, Granularity::Day).unwrap();
    let v = msft.validation.as_ref().unwrap();
    assert!(!v.is_valid);
    assert!(v.mismatches.contains_key("close"));
}

#[tokio::test]
async fn plan_range_limits_every_job() {
    let dir = MockDataDir::with_sessions(&[AAPL], 5).unwrap();
    let kbar = kbar_for(&dir);
    let range = DateRange::new(Some(day(2024, 1, 4)), None).unwrap();

    let report = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&[Granularity::Day])
        .validate_against(Granularity::Day)
        .range(range)
        .run()
        .await
        .unwrap();
    let entry = report.get(AAPL, Granularity::Day).unwrap();
    assert_eq!(entry.bars, 3);
    assert_eq!(entry.validation.as_ref().unwrap().common, 3);
}

#[tokio::test]
async fn plan_rejects_inconsistent_requests() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_for(&dir);

    let dup = kbar.plan().instruments(&[AAPL, AAPL]).err();
    assert!(matches!(dup, Some(KbarError::InvalidArg(_))));

    let empty = kbar.plan().targets(&[Granularity::Day]).run().await;
    assert!(matches!(empty, Err(KbarError::InvalidArg(_))));

    let no_targets = kbar.plan().instruments(&[AAPL]).unwrap().run().await;
    assert!(matches!(no_targets, Err(KbarError::InvalidArg(_))));

    let finer = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .source(Granularity::M5)
        .targets(&[Granularity::M1])
        .run()
        .await;
    assert!(matches!(finer, Err(KbarError::InvalidArg(_))));

    let stray_validation = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&[Granularity::M5])
        .validate_against(Granularity::Day)
        .run()
        .await;
    assert!(matches!(stray_validation, Err(KbarError::InvalidArg(_))));

    let nowhere_to_write = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&[Granularity::Day])
        .write_outputs(true)
        .run()
        .await;
    assert!(matches!(nowhere_to_write, Err(KbarError::InvalidArg(_))));
}

#[tokio::test]
async fn plan_outputs_load_back() {
    let dir = MockDataDir::with_sessions(&[AAPL], 2).unwrap();
    let out = tempfile::tempdir().unwrap();
    let kbar = kbar_with_output(&dir, out.path());

    kbar.plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&[Granularity::M30])
        .write_outputs(true)
        .run()
        .await
        .unwrap();

    let reader = kbar::Kbar::builder().data_dir(out.path()).build().unwrap();
    let thirty = reader.load(AAPL, Granularity::M30, DateRange::all()).unwrap();
    assert_eq!(thirty.len(), 2 * 8);
    assert_eq!(reader.check(AAPL, Granularity::M30).unwrap(), 2 * 8);
}

#[tokio::test]
async fn plan_rejects_misaligned_targets() {
    let dir = MockDataDir::with_sessions(&[AAPL], 1).unwrap();
    let kbar = kbar_for(&dir);
    let seven = Granularity::minutes(7).unwrap();

    let chained = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&[Granularity::M5, seven])
        .chained(true)
        .run()
        .await;
    assert!(matches!(chained, Err(KbarError::InvalidArg(_))), "{chained:?}");

    let from_five = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .source(Granularity::M5)
        .targets(&[seven])
        .run()
        .await;
    assert!(matches!(from_five, Err(KbarError::InvalidArg(_))));

    // Independent jobs from one-minute bars may use any width.
    let direct = kbar
        .plan()
        .instruments(&[AAPL])
        .unwrap()
        .targets(&[Granularity::M5, seven])
        .run()
        .await
        .unwrap();
    // 09:30 falls in the 09:27 bucket; 13:29 in the 13:25 one.
    assert_eq!(direct.get(AAPL, seven).unwrap().bars, 35);
}
