use kbar_core::{Bar, KTime};

pub(crate) fn base_price(symbol: &str) -> f64 {
    match symbol {
        "AAPL" => 140.0,
        "MSFT" => 240.0,
        "GOOG" => 100.0,
        "TSLA" => 300.0,
        _ => 100.0,
    }
}

/// Static daily bars for a handful of well-known codes.
#[must_use]
pub fn by_symbol(s: &str) -> Option<Vec<Bar>> {
    match s {
        "AAPL" => Some(build(
            s,
            &[
                ((2023, 1, 3), 140.0, 142.0, 139.0, 141.0, 10_000_000.0),
                ((2023, 1, 4), 141.0, 143.0, 140.0, 142.0, 11_000_000.0),
            ],
        )),
        "MSFT" => Some(build(
            s,
            &[
                ((2023, 1, 3), 240.0, 245.0, 238.0, 244.0, 9_000_000.0),
                ((2023, 1, 4), 244.0, 246.0, 243.0, 245.0, 9_500_000.0),
            ],
        )),
        "TSLA" => Some(build(
            s,
            &[
                ((2023, 1, 3), 300.0, 310.0, 295.0, 305.0, 8_000_000.0),
                ((2023, 1, 4), 305.0, 315.0, 300.0, 312.0, 8_500_000.0),
            ],
        )),
        _ => None,
    }
}

type Row = ((i32, u32, u32), f64, f64, f64, f64, f64);

fn build(symbol: &str, rows: &[Row]) -> Vec<Bar> {
    rows.iter()
        .filter_map(|&((y, m, d), o, h, l, c, v)| {
            KTime::from_ymd(y, m, d).map(|ts| Bar::new(ts, o, h, l, c, v).with_symbol(symbol))
        })
        .collect()
}
