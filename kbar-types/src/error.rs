use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the kbar workspace.
///
/// Ingestion and parsing failures are fatal to the read that produced them and
/// are never retried. Validation findings are not errors; they are returned in
/// a `ValidationReport`.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KbarError {
    /// The requested data file does not exist.
    #[error("file not exist: {path}")]
    DataSourceNotFound {
        /// Path that was looked up.
        path: String,
    },

    /// A row or cell did not match the expected column schema.
    #[error("file format error: {path}: {reason}")]
    DataFormat {
        /// File the malformed row came from.
        path: String,
        /// What was wrong with the row.
        reason: String,
    },

    /// A timestamp string matched none of the known formats.
    #[error("unknown time format: {raw:?} (length: {len}): {reason}")]
    TimeFormat {
        /// Offending input, verbatim.
        raw: String,
        /// Character length of the input.
        len: usize,
        /// Why the best candidate format rejected it.
        reason: String,
    },

    /// Invalid input argument or configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// Any other I/O failure while reading or writing a file.
    #[error("i/o error on {path}: {msg}")]
    Io {
        /// File involved in the failed operation.
        path: String,
        /// Underlying error message.
        msg: String,
    },

    /// A batch job failed outside of the data path (panic, cancelled worker).
    #[error("job {job} failed: {msg}")]
    JobFailed {
        /// Job label, e.g. "AAPL@5m".
        job: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A batch exceeded the configured deadline.
    #[error("request timed out: {what}")]
    RequestTimeout {
        /// Label of the operation that timed out.
        what: String,
    },

    /// Every job of a batch failed; contains the individual failures.
    #[error("all jobs failed: {0:?}")]
    AllJobsFailed(Vec<KbarError>),
}

impl KbarError {
    /// Helper: build a `DataSourceNotFound` error for a path.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::DataSourceNotFound { path: path.into() }
    }

    /// Helper: build a `DataFormat` error naming the file and the reason.
    pub fn data_format(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Helper: build a `TimeFormat` error; the length is taken in characters.
    pub fn time_format(raw: &str, reason: impl Into<String>) -> Self {
        Self::TimeFormat {
            raw: raw.to_string(),
            len: raw.chars().count(),
            reason: reason.into(),
        }
    }

    /// Helper: build an `Io` error from a path and any displayable error.
    pub fn io(path: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.into(),
            msg: err.to_string(),
        }
    }

    /// Helper: build a `JobFailed` error.
    pub fn job_failed(job: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::JobFailed {
            job: job.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `RequestTimeout` error.
    #[must_use]
    pub fn request_timeout(what: impl Into<String>) -> Self {
        Self::RequestTimeout { what: what.into() }
    }

    /// Returns true if the error points at bad data or configuration the
    /// caller can fix, as opposed to a missing file.
    ///
    /// Aggregates are classified based on their contents.
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        match self {
            Self::DataSourceNotFound { .. } => false,
            Self::AllJobsFailed(inner) => inner.iter().any(Self::is_actionable),
            _ => true,
        }
    }

    /// Flatten nested `AllJobsFailed` structures into a plain vector.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::AllJobsFailed(list) => list.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }
}
