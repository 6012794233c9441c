//! Invariant checks over single bars and whole series.

use kbar_types::{Bar, Granularity, KbarError};

use super::infer::{estimate_step_minutes, infer_granularity, is_subdaily};

/// Ensure `low <= open, close <= high`, finite prices and a non-negative volume.
///
/// `source` names the file or series in the error.
///
/// # Errors
/// Returns `DataFormat` describing the first violated rule.
pub fn ensure_bar_invariants(bar: &Bar, source: &str) -> Result<(), KbarError> {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    if prices.iter().any(|p| !p.is_finite()) || !bar.volume.is_finite() {
        return Err(KbarError::data_format(
            source,
            format!("bar at {} has a non-finite value", bar.ts),
        ));
    }
    if bar.low > bar.high {
        return Err(KbarError::data_format(
            source,
            format!("bar at {}: low {} above high {}", bar.ts, bar.low, bar.high),
        ));
    }
    for (name, v) in [("open", bar.open), ("close", bar.close)] {
        if v < bar.low || v > bar.high {
            return Err(KbarError::data_format(
                source,
                format!(
                    "bar at {}: {name} {v} outside [{}, {}]",
                    bar.ts, bar.low, bar.high
                ),
            ));
        }
    }
    if bar.volume < 0.0 {
        return Err(KbarError::data_format(
            source,
            format!("bar at {}: negative volume {}", bar.ts, bar.volume),
        ));
    }
    Ok(())
}

/// Ensure timestamps are strictly increasing.
///
/// # Errors
/// Returns `DataFormat` naming the first offending pair.
pub fn ensure_ordered(bars: &[Bar], source: &str) -> Result<(), KbarError> {
    for w in bars.windows(2) {
        if w[1].ts <= w[0].ts {
            return Err(KbarError::data_format(
                source,
                format!("timestamp {} does not follow {}", w[1].ts, w[0].ts),
            ));
        }
    }
    Ok(())
}

/// Run [`ensure_bar_invariants`] on every bar, then [`ensure_ordered`].
///
/// # Errors
/// Returns the first violation found.
pub fn ensure_series(bars: &[Bar], source: &str) -> Result<(), KbarError> {
    for bar in bars {
        ensure_bar_invariants(bar, source)?;
    }
    ensure_ordered(bars, source)
}

/// Ensure the row spacing is compatible with the declared granularity.
///
/// Fails when most rows of an intraday file are a day or more apart, or when
/// the dominant step is coarser than `declared`. Finer rows are accepted.
/// Series with too few rows to estimate a step pass.
///
/// # Errors
/// Returns `DataFormat` naming the observed step.
pub fn ensure_cadence(bars: &[Bar], declared: Granularity, source: &str) -> Result<(), KbarError> {
    let Some(step) = estimate_step_minutes(bars) else {
        return Ok(());
    };
    if declared.is_intraday() && bars.len() > 3 && !is_subdaily(bars) {
        return Err(KbarError::data_format(
            source,
            format!("declared {declared} but most rows are a day or more apart (step {step}m)"),
        ));
    }
    match infer_granularity(bars) {
        Some(observed) if observed.is_coarser_than(declared) => Err(KbarError::data_format(
            source,
            format!("declared {declared} but rows are {step} minutes apart"),
        )),
        _ => Ok(()),
    }
}
