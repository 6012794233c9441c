//! Report envelopes produced by the validator and the batch runner.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Granularity, KbarError};

/// Outcome of comparing two bar series.
///
/// `mismatches` holds at most one entry per failing field, keyed by field
/// name. A series pair without common timestamps is reported under the key
/// [`ValidationReport::NO_OVERLAP_KEY`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    /// True iff every checked field matched at every common timestamp.
    pub is_valid: bool,
    /// Field name to discrepancy description.
    pub mismatches: BTreeMap<String, String>,
    /// Number of timestamps present in both series.
    pub common: usize,
}

impl ValidationReport {
    /// Key used for the "no common timestamps" finding.
    pub const NO_OVERLAP_KEY: &'static str = "error";

    /// A passing report over `common` timestamps.
    #[must_use]
    pub const fn passed(common: usize) -> Self {
        Self {
            is_valid: true,
            mismatches: BTreeMap::new(),
            common,
        }
    }

    /// The series share no timestamp.
    #[must_use]
    pub fn no_overlap() -> Self {
        let mut mismatches = BTreeMap::new();
        mismatches.insert(
            Self::NO_OVERLAP_KEY.to_string(),
            "no common timestamps".to_string(),
        );
        Self {
            is_valid: false,
            mismatches,
            common: 0,
        }
    }

    /// Record a failing field; marks the report invalid.
    pub fn record(&mut self, field: impl Into<String>, description: impl Into<String>) {
        self.is_valid = false;
        self.mismatches.insert(field.into(), description.into());
    }
}

/// Result of one batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Instrument code the job ran for.
    pub instrument: String,
    /// Target granularity of the produced series.
    pub granularity: Granularity,
    /// Number of bars produced.
    pub bars: usize,
    /// Written file, when outputs are enabled.
    pub output: Option<PathBuf>,
    /// Comparison against the reference series, when requested.
    pub validation: Option<ValidationReport>,
}

/// Summary of a batch run.
///
/// Jobs that fail do not abort the batch; their errors are collected in
/// `warnings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BatchReport {
    /// Successful jobs, sorted by instrument then granularity.
    pub entries: Vec<BatchEntry>,
    /// Non-fatal failures encountered while running the batch.
    pub warnings: Vec<KbarError>,
}

impl BatchReport {
    /// Look up the entry for an instrument and granularity.
    #[must_use]
    pub fn get(&self, instrument: &str, granularity: Granularity) -> Option<&BatchEntry> {
        self.entries
            .iter()
            .find(|e| e.instrument == instrument && e.granularity == granularity)
    }

    /// True when no job failed and every validated entry passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
            && self
                .entries
                .iter()
                .all(|e| e.validation.as_ref().is_none_or(|v| v.is_valid))
    }
}
