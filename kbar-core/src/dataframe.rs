//! Columnar export of bar series (feature `dataframe`).

use polars::prelude::*;

use kbar_types::Bar;

/// Build a `DataFrame` with columns
/// `time, open, high, low, close, volume, turnover, symbol`.
///
/// `time` holds `YYYY-MM-DD HH:MM` strings; absent turnover and symbol values
/// are nulls.
///
/// # Errors
/// Propagates polars construction errors.
pub fn bars_to_dataframe(bars: &[Bar]) -> PolarsResult<DataFrame> {
    let times: Vec<String> = bars.iter().map(|b| b.ts.to_string()).collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let turnovers: Vec<Option<f64>> = bars.iter().map(|b| b.turnover).collect();
    let symbols: Vec<Option<String>> = bars.iter().map(|b| b.symbol.clone()).collect();

    DataFrame::new(vec![
        Column::new("time".into(), &times),
        Column::new("open".into(), &opens),
        Column::new("high".into(), &highs),
        Column::new("low".into(), &lows),
        Column::new("close".into(), &closes),
        Column::new("volume".into(), &volumes),
        Column::new("turnover".into(), &turnovers),
        Column::new("symbol".into(), &symbols),
    ])
}
