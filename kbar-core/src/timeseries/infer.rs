use kbar_types::{Bar, Granularity};

/// Positive adjacent deltas in minutes after sorting; duplicates ignored.
fn positive_deltas(bars: &[Bar]) -> Vec<i64> {
    let mut ts: Vec<_> = bars.iter().map(|b| b.ts).collect();
    ts.sort_unstable();
    ts.dedup();
    ts.windows(2).map(|w| w[1].minutes_since(w[0])).collect()
}

/// Estimate a representative step (in minutes) from positive adjacent
/// timestamp deltas.
///
/// Prefer the mode (most frequent delta); if there is no unique mode, return
/// the lower median.
///
/// ```
/// use kbar_core::{estimate_step_minutes, Bar, KTime};
///
/// let t0 = KTime::from_ymd_hm(2024, 1, 2, 9, 30).unwrap();
/// let mk = |m: i64| Bar::new(t0.plus_minutes(m), 1.0, 1.0, 1.0, 1.0, 0.0);
/// // deltas 1,1,1,2,3 => unique mode 1
/// let bars = [mk(0), mk(1), mk(2), mk(3), mk(5), mk(8)];
/// assert_eq!(estimate_step_minutes(&bars), Some(1));
/// // deltas 1,1,2,2 => lower median 1
/// let bars = [mk(0), mk(1), mk(2), mk(4), mk(6)];
/// assert_eq!(estimate_step_minutes(&bars), Some(1));
/// ```
///
/// Input order does not matter. Returns `None` if fewer than two distinct
/// timestamps are present.
#[must_use]
pub fn estimate_step_minutes(bars: &[Bar]) -> Option<i64> {
    let mut deltas = positive_deltas(bars);
    if deltas.is_empty() {
        return None;
    }
    deltas.sort_unstable();

    let mut best_delta = deltas[0];
    let mut best_count = 0usize;
    let mut ties = 0usize;
    let mut run_start = 0usize;
    for i in 1..=deltas.len() {
        if i < deltas.len() && deltas[i] == deltas[run_start] {
            continue;
        }
        let count = i - run_start;
        if count > best_count {
            best_count = count;
            best_delta = deltas[run_start];
            ties = 1;
        } else if count == best_count {
            ties += 1;
        }
        run_start = i;
    }

    if ties == 1 {
        return Some(best_delta);
    }
    let mid = deltas.len() / 2;
    if deltas.len() % 2 == 1 {
        Some(deltas[mid])
    } else {
        Some(deltas[mid - 1])
    }
}

/// Granularity matching the estimated step.
///
/// Steps of one day up to (but excluding) one week map to `Day`, a step of
/// exactly seven days to `Week`. Anything else that is not a valid minute
/// width yields `None`.
#[must_use]
pub fn infer_granularity(bars: &[Bar]) -> Option<Granularity> {
    let step = estimate_step_minutes(bars)?;
    let day = i64::from(Granularity::Day.nominal_minutes());
    let week = i64::from(Granularity::Week.nominal_minutes());
    match step {
        s if s == week => Some(Granularity::Week),
        s if (day..week).contains(&s) => Some(Granularity::Day),
        s => u32::try_from(s).ok().and_then(|m| Granularity::minutes(m).ok()),
    }
}

/// Heuristic: the series has sub-daily cadence.
///
/// True only when at least 3 adjacent deltas are shorter than a day and those
/// make up at least 60% of all deltas.
#[must_use]
pub fn is_subdaily(bars: &[Bar]) -> bool {
    const MIN_COUNT: usize = 3;
    let deltas = positive_deltas(bars);
    if deltas.is_empty() {
        return false;
    }
    let day = i64::from(Granularity::Day.nominal_minutes());
    let total = deltas.len();
    let subdaily = deltas.iter().filter(|&&d| d < day).count();
    if subdaily < MIN_COUNT {
        return false;
    }
    // subdaily / total >= 3 / 5
    subdaily.saturating_mul(5) >= total.saturating_mul(3)
}
