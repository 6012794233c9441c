//! Time-series algorithms over bar sequences.
//!
//! Modules include:
//! - `resample`: streaming OHLCV aggregation to coarser granularities
//! - `validate`: field-by-field comparison of two series
//! - `infer`: cadence estimation and sub-daily detection
//! - `util`: bar and series invariant checks
/// Cadence estimation and sub-daily detection helpers.
pub mod infer;
/// Streaming resampler and resampling helpers.
pub mod resample;
pub mod util;
/// Series comparison within tolerance.
pub mod validate;
