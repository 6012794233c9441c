//! Deterministic fixtures for kbar tests and examples.
//!
//! [`MockDataDir`] is a temporary data directory laid out the way the
//! orchestrator expects (`{code}_{token}.csv`). It is removed on drop.

use std::path::{Path, PathBuf};

use kbar_core::{Bar, Granularity, KbarError, Schema, resample_to_daily, write_bars};
use tempfile::TempDir;

pub mod fixtures;

pub use fixtures::daily::by_symbol as daily_fixture;
pub use fixtures::session::{SESSION_BARS, minute_days, minute_session};

/// Temporary directory of bar files.
pub struct MockDataDir {
    dir: TempDir,
}

impl MockDataDir {
    /// Empty directory.
    ///
    /// # Errors
    /// Returns `Io` if the directory cannot be created.
    pub fn new() -> Result<Self, KbarError> {
        let dir = TempDir::new().map_err(|e| KbarError::io("<tempdir>", e))?;
        Ok(Self { dir })
    }

    /// Directory with, for each code, `days` synthetic one-minute sessions
    /// starting 2024-01-02 (`{code}_1m.csv`) and the matching daily reference
    /// (`{code}_day.csv`).
    ///
    /// # Errors
    /// Returns `Io` on write failure.
    pub fn with_sessions(codes: &[&str], days: u32) -> Result<Self, KbarError> {
        let dir = Self::new()?;
        for code in codes {
            let minutes = minute_days(code, (2024, 1, 2), days).unwrap_or_default();
            dir.write(code, Granularity::M1, &minutes)?;
            dir.write(code, Granularity::Day, &resample_to_daily(minutes))?;
        }
        Ok(dir)
    }

    /// Root of the directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Conventional file path for `code` at `granularity`.
    #[must_use]
    pub fn file(&self, code: &str, granularity: Granularity) -> PathBuf {
        self.dir.path().join(granularity.file_name(code))
    }

    /// Write `bars` with the full eight-column layout.
    ///
    /// # Errors
    /// Returns `Io` on write failure.
    pub fn write(
        &self,
        code: &str,
        granularity: Granularity,
        bars: &[Bar],
    ) -> Result<PathBuf, KbarError> {
        let path = self.file(code, granularity);
        write_bars(&path, Schema::standard(), granularity, bars)?;
        Ok(path)
    }

    /// Write arbitrary text, e.g. a malformed file.
    ///
    /// # Errors
    /// Returns `Io` on write failure.
    pub fn write_raw(
        &self,
        code: &str,
        granularity: Granularity,
        contents: &str,
    ) -> Result<PathBuf, KbarError> {
        let path = self.file(code, granularity);
        std::fs::write(&path, contents).map_err(|e| KbarError::io(path.display().to_string(), e))?;
        Ok(path)
    }
}
