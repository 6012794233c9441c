use std::time::Duration;

use crate::helpers::*;
use kbar::{Granularity, Kbar, KbarError, ParseMode, Tolerance};

#[test]
fn build_requires_data_dir() {
    let err = Kbar::builder().build().unwrap_err();
    assert!(matches!(err, KbarError::InvalidArg(_)), "got {err:?}");
}

#[test]
fn build_rejects_zero_workers() {
    let err = Kbar::builder()
        .data_dir("data")
        .max_workers(0)
        .build()
        .unwrap_err();
    match err {
        KbarError::InvalidArg(msg) => assert!(msg.contains("max_workers")),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn builder_settings_reach_config() {
    let kbar = Kbar::builder()
        .data_dir("data")
        .output_dir("out")
        .has_header(false)
        .parse_mode(ParseMode::Lenient)
        .tolerance(Tolerance::price(0.01))
        .strict_ordering(true)
        .max_workers(2)
        .job_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let cfg = kbar.config();
    assert!(!cfg.has_header);
    assert_eq!(cfg.parse_mode, ParseMode::Lenient);
    assert!(approx(cfg.tolerance.price, 0.01));
    assert!(cfg.strict_ordering);
    assert_eq!(cfg.max_workers, 2);
    assert_eq!(cfg.job_timeout, Some(Duration::from_secs(5)));
    assert_eq!(kbar.data_dir(), std::path::Path::new("data"));
}

#[test]
fn paths_follow_code_and_token() {
    let kbar = Kbar::builder()
        .data_dir("data")
        .output_dir("out")
        .build()
        .unwrap();
    assert_eq!(
        kbar.path_for(AAPL, Granularity::M5),
        std::path::Path::new("data").join("AAPL_5m.csv")
    );
    assert_eq!(
        kbar.path_for(AAPL, Granularity::Day),
        std::path::Path::new("data").join("AAPL_day.csv")
    );
    assert_eq!(
        kbar.output_path_for(MSFT, Granularity::Week).unwrap(),
        std::path::Path::new("out").join("MSFT_week.csv")
    );
}

#[test]
fn output_path_requires_output_dir() {
    let kbar = Kbar::builder().data_dir("data").build().unwrap();
    let err = kbar.output_path_for(AAPL, Granularity::Day).unwrap_err();
    assert!(matches!(err, KbarError::InvalidArg(_)));
}
