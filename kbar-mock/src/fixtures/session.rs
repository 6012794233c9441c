use kbar_core::{Bar, KTime};

use super::daily::base_price;

/// Session open used by the fixtures.
pub const SESSION_OPEN: (u32, u32) = (9, 30);

/// Bars per synthetic session (four hours of one-minute bars).
pub const SESSION_BARS: usize = 240;

/// `n` consecutive one-minute bars starting at `start`.
///
/// Bar `i` has open `base + 0.1 * i`, high `open + 0.5`, low `open - 0.5`,
/// close `open + 0.2`, volume 1000 and turnover 100000, where `base` is the
/// symbol's fixture price (100 for unknown symbols).
#[must_use]
pub fn minute_session(symbol: &str, start: KTime, n: usize) -> Vec<Bar> {
    let base = base_price(symbol);
    (0..n)
        .map(|i| {
            let step = i32::try_from(i).unwrap_or(i32::MAX);
            let open = base + f64::from(step) * 0.1;
            Bar::new(
                start.plus_minutes(i64::from(step)),
                open,
                open + 0.5,
                open - 0.5,
                open + 0.2,
                1000.0,
            )
            .with_turnover(100_000.0)
            .with_symbol(symbol)
        })
        .collect()
}

/// One full session per calendar day, `days` consecutive days from
/// `first_day` (weekends included).
///
/// Returns `None` if `first_day` is not a valid date.
#[must_use]
pub fn minute_days(symbol: &str, first_day: (i32, u32, u32), days: u32) -> Option<Vec<Bar>> {
    let (y, m, d) = first_day;
    let first = KTime::from_ymd_hm(y, m, d, SESSION_OPEN.0, SESSION_OPEN.1)?;
    let mut out = Vec::with_capacity(SESSION_BARS * days as usize);
    for day in 0..days {
        let start = first.plus_minutes(i64::from(day) * i64::from(KTime::MINUTES_PER_DAY));
        out.extend(minute_session(symbol, start, SESSION_BARS));
    }
    Some(out)
}
