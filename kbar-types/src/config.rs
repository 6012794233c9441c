//! Configuration types shared by readers, validators and the orchestrator.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How strictly timestamp strings are matched against the known layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ParseMode {
    /// Digits and separators must both be where the layout puts them.
    #[default]
    Strict,
    /// Only digit positions are read; separator characters are ignored.
    /// Calendar ranges are still enforced.
    Lenient,
}

/// Absolute tolerances used when comparing two bar series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Allowed absolute difference for open/high/low/close and turnover.
    pub price: f64,
    /// Allowed absolute difference for volume, in units.
    pub volume: f64,
}

impl Tolerance {
    /// Same price tolerance, default volume tolerance.
    #[must_use]
    pub const fn price(price: f64) -> Self {
        Self { price, volume: 1.0 }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            price: 1e-6,
            volume: 1.0,
        }
    }
}

/// Global configuration for the `Kbar` orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbarConfig {
    /// Skip the first row of every data file.
    pub has_header: bool,
    /// Timestamp matching mode for the time column and range bounds.
    pub parse_mode: ParseMode,
    /// Tolerances used by validation.
    pub tolerance: Tolerance,
    /// Fail on non-increasing timestamps instead of passing them through.
    pub strict_ordering: bool,
    /// Upper bound on concurrently running batch jobs.
    pub max_workers: usize,
    /// Optional deadline for a whole batch.
    pub job_timeout: Option<Duration>,
    /// Where derived files are written. Writing is refused while unset.
    pub output_dir: Option<PathBuf>,
}

impl Default for KbarConfig {
    fn default() -> Self {
        Self {
            has_header: true,
            parse_mode: ParseMode::Strict,
            tolerance: Tolerance::default(),
            strict_ordering: false,
            max_workers: 4,
            job_timeout: None,
            output_dir: None,
        }
    }
}
