//! Kbar loads, resamples and validates OHLCV bar files.
//!
//! Overview
//! - Reads `{code}_{token}.csv` files from a data directory (`AAPL_1m.csv`,
//!   `AAPL_day.csv`, ...) through the streaming reader in `kbar_core`.
//! - Aggregates bars into coarser granularities, either directly or by
//!   chaining steps (1m → 5m → 30m → day).
//! - Compares a derived series with a reference file and reports mismatches
//!   per field.
//! - Runs batches over many instruments on a bounded worker pool.
//!
//! Key behaviors and trade-offs
//! - Streaming: `resample` yields each bucket as soon as it closes, so memory
//!   stays proportional to one bucket. Batch jobs load a whole file so that
//!   several targets can share one read.
//! - Ordering: a bar that arrives after its bucket has closed is dropped with
//!   a warning; enable `strict_ordering` to reject such files instead.
//! - Output: derived files are only written under the configured output
//!   directory, never next to the inputs.
//!
//! Examples
//! Building an orchestrator:
//! ```rust,ignore
//! use kbar::{Kbar, Tolerance};
//!
//! let kbar = Kbar::builder()
//!     .data_dir("data")
//!     .output_dir("data/generated")
//!     .tolerance(Tolerance::price(0.01))
//!     .build()?;
//! ```
//!
//! Streaming a five-minute series out of a one-minute file:
//! ```rust,ignore
//! use kbar::{DateRange, Granularity};
//!
//! for bar in kbar.resample("AAPL", Granularity::M1, Granularity::M5, DateRange::all())? {
//!     let bar = bar?;
//!     println!("{} {}", bar.ts, bar.close);
//! }
//! ```
//!
//! Batch run with validation against the daily reference files:
//! ```rust,ignore
//! use kbar::Granularity;
//!
//! let report = kbar
//!     .plan()
//!     .instruments(&["AAPL", "MSFT"])?
//!     .targets(&[Granularity::M5, Granularity::M30, Granularity::Day])
//!     .chained(true)
//!     .validate_against(Granularity::Day)
//!     .run()
//!     .await?;
//! for entry in &report.entries {
//!     println!("{} {} -> {} bars", entry.instrument, entry.granularity, entry.bars);
//! }
//! ```
//!
//! See `kbar/examples/` for a runnable end-to-end demonstration.
#![warn(missing_docs)]

pub(crate) mod core;
mod router;

pub use core::{Kbar, KbarBuilder};
pub use router::plan::PlanBuilder;
pub use router::util::{collapse_errors, join_with_deadline};

#[cfg(feature = "dataframe")]
pub use kbar_core::bars_to_dataframe;

// Re-export core types for convenience
pub use kbar_core::{
    Bar, BatchEntry, BatchReport, CsvBarSource, DateRange, Field, Granularity, KTime, KbarConfig,
    KbarError, ParseMode, Resample, Schema, Tolerance, TryResample, ValidationReport, Validator,
    chain, chain_all, parse_time, resample, resample_to_daily, resample_to_minutes,
    resample_to_weekly,
};
