use kbar::{DateRange, Granularity, Kbar, Tolerance};
use kbar_mock::MockDataDir;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,kbar=debug,kbar_core=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    // Five synthetic sessions per code plus the matching daily reference files.
    let data = MockDataDir::with_sessions(&["AAPL", "MSFT"], 5)?;
    let out = tempfile::tempdir()?;

    let kbar = Kbar::builder()
        .data_dir(data.path())
        .output_dir(out.path())
        .tolerance(Tolerance::price(1e-4))
        .build()?;

    // Stream one instrument without loading the file.
    let mut thirty = kbar.resample("AAPL", Granularity::M1, Granularity::M30, DateRange::all())?;
    if let Some(bar) = thirty.next() {
        let bar = bar?;
        println!(
            "first 30m bar {}: o={} h={} l={} c={} v={}",
            bar.ts, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }

    // Chained batch over both codes, written out and checked against `_day.csv`.
    let report = kbar
        .plan()
        .instruments(&["AAPL", "MSFT"])?
        .targets(&[Granularity::M5, Granularity::M30, Granularity::Day])
        .chained(true)
        .validate_against(Granularity::Day)
        .write_outputs(true)
        .run()
        .await?;

    for entry in &report.entries {
        let status = match &entry.validation {
            Some(v) if v.is_valid => "valid",
            Some(_) => "MISMATCH",
            None => "-",
        };
        println!(
            "{:<5} {:>4} {:>5} bars  {:<8} {}",
            entry.instrument,
            entry.granularity,
            entry.bars,
            status,
            entry
                .output
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        );
    }
    for w in &report.warnings {
        eprintln!("warning: {w}");
    }

    Ok(())
}
