use serde::{Deserialize, Serialize};

use crate::{KTime, KbarError};

/// Inclusive `[begin, end]` time filter; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest accepted timestamp, inclusive.
    pub begin: Option<KTime>,
    /// Latest accepted timestamp, inclusive.
    pub end: Option<KTime>,
}

impl DateRange {
    /// Unbounded on both sides.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            begin: None,
            end: None,
        }
    }

    /// Build a range, rejecting `begin > end`.
    ///
    /// # Errors
    /// Returns `InvalidArg` when both bounds are present and reversed.
    pub fn new(begin: Option<KTime>, end: Option<KTime>) -> Result<Self, KbarError> {
        if let (Some(b), Some(e)) = (begin, end)
            && b > e
        {
            return Err(KbarError::InvalidArg(format!(
                "range begin {b} is after end {e}"
            )));
        }
        Ok(Self { begin, end })
    }

    /// `(begin absent OR ts >= begin) AND (end absent OR ts <= end)`.
    #[must_use]
    pub fn contains(&self, ts: KTime) -> bool {
        self.begin.is_none_or(|b| ts >= b) && self.end.is_none_or(|e| ts <= e)
    }

    /// True once `ts` is past the end bound; later rows of an ordered file
    /// cannot match either.
    #[must_use]
    pub fn is_past(&self, ts: KTime) -> bool {
        self.end.is_some_and(|e| ts > e)
    }
}
