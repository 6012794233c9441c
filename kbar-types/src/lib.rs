//! Value types and configuration primitives shared by every kbar crate.
#![warn(missing_docs)]

mod bar;
mod config;
mod granularity;
mod range;
mod reports;
mod time;

pub use bar::{Bar, Field};
pub use config::{KbarConfig, ParseMode, Tolerance};
pub use granularity::Granularity;
pub use range::DateRange;
pub use reports::{BatchEntry, BatchReport, ValidationReport};
pub use time::KTime;

/// Error types shared across the workspace.
pub mod error;
pub use error::KbarError;
