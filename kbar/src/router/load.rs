use crate::Kbar;
use kbar_core::{Bar, CsvBarSource, DateRange, Granularity, KbarError, Schema};

impl Kbar {
    /// Lazily read `{code}_{token}.csv` from the data directory.
    ///
    /// Uses the standard eight-column schema and stamps each bar with `code`.
    ///
    /// # Errors
    /// Returns `DataSourceNotFound` if the file does not exist. Row-level
    /// errors are yielded by the returned iterator.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "kbar::router",
            skip(self, range),
            fields(code = code, granularity = %granularity),
        )
    )]
    pub fn bars(
        &self,
        code: &str,
        granularity: Granularity,
        range: DateRange,
    ) -> Result<CsvBarSource, KbarError> {
        let source = CsvBarSource::open(
            self.path_for(code, granularity),
            Schema::standard(),
            self.csv_options(),
            range,
        )?;
        Ok(source.with_symbol(code))
    }

    /// Read a whole file into memory.
    ///
    /// # Errors
    /// Returns the first error encountered while opening or reading.
    pub fn load(
        &self,
        code: &str,
        granularity: Granularity,
        range: DateRange,
    ) -> Result<Vec<Bar>, KbarError> {
        self.bars(code, granularity, range)?.collect()
    }
}
