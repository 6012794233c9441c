//! Re-export of the value types from `kbar-types`.
// Downstream crates can depend on `kbar-core` only

pub use kbar_types::{
    Bar, BatchEntry, BatchReport, DateRange, Field, Granularity, KTime, KbarConfig, KbarError,
    ParseMode, Tolerance, ValidationReport,
};
