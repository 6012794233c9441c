//! kbar-core
//!
//! Algorithms over minute-resolution OHLCV bars, free of any async runtime.
//!
//! - `timestamp`: ordered timestamp layouts and the `TimestampParser`.
//! - `schema`: explicit column layout shared by reader and writer.
//! - `source`: `CsvBarSource`, a lazy range-filtered bar reader.
//! - `sink`: `BarWriter` and `write_bars`.
//! - `timeseries`: streaming resampler, validator, cadence inference and
//!   invariant checks.
//!
//! Everything here is synchronous and pull based. A `CsvBarSource` owns its
//! file handle; dropping it ends the read.
//!
#![warn(missing_docs)]

/// Columnar export (feature `dataframe`).
#[cfg(feature = "dataframe")]
pub mod dataframe;
/// Column schema for bar files.
pub mod schema;
/// CSV bar writer.
pub mod sink;
/// Lazy CSV bar reader.
pub mod source;
/// Timestamp layouts and parser.
pub mod timestamp;
/// Time-series algorithms for resampling, validation and inference.
pub mod timeseries;
pub mod types;

#[cfg(feature = "dataframe")]
pub use dataframe::bars_to_dataframe;
pub use schema::{Column, ColumnKind, ColumnRole, Schema};
pub use sink::{BarWriter, format_time, write_bars};
pub use source::{CsvBarSource, CsvOptions};
pub use timeseries::infer::{estimate_step_minutes, infer_granularity, is_subdaily};
pub use timeseries::resample::{
    Resample, Resampler, TryResample, chain, chain_all, resample, resample_to_daily,
    resample_to_minutes, resample_to_weekly,
};
pub use timeseries::util::{ensure_bar_invariants, ensure_cadence, ensure_ordered, ensure_series};
pub use timeseries::validate::{Validator, validate_bars};
pub use timestamp::{LAYOUTS, TimeLayout, TimestampParser, parse_time};
pub use types::*;
