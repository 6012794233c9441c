//! Deterministic bar series.

pub mod daily;
pub mod session;
