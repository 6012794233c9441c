//! CSV writer for bar series.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use kbar_types::{Bar, Granularity, KTime, KbarError};

use crate::schema::{ColumnRole, Schema};

/// Format a timestamp the way files of `granularity` store it: `YYYY-MM-DD`
/// for day and week bars, `YYYY-MM-DD HH:MM` otherwise.
#[must_use]
pub fn format_time(ts: KTime, granularity: Granularity) -> String {
    if granularity.is_intraday() {
        ts.to_string()
    } else {
        ts.date_str()
    }
}

/// Row-at-a-time bar writer.
///
/// The header row is written on construction. Absent optional values become
/// empty cells, which `CsvBarSource` reads back as absent.
pub struct BarWriter<W: Write> {
    inner: csv::Writer<W>,
    schema: Schema,
    granularity: Granularity,
    label: String,
    rows: usize,
}

impl BarWriter<File> {
    /// Create (or truncate) `path`, creating missing parent directories.
    ///
    /// # Errors
    /// Returns `Io` if the directory or file cannot be created or the header
    /// cannot be written.
    pub fn create(
        path: impl AsRef<Path>,
        schema: Schema,
        granularity: Granularity,
    ) -> Result<Self, KbarError> {
        let path = path.as_ref();
        let label = path.display().to_string();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| KbarError::io(&label, e))?;
        }
        let file = File::create(path).map_err(|e| KbarError::io(&label, e))?;
        Self::with_label(file, schema, granularity, label)
    }
}

impl<W: Write> BarWriter<W> {
    /// Wrap any writer.
    ///
    /// # Errors
    /// Returns `Io` if the header cannot be written.
    pub fn new(writer: W, schema: Schema, granularity: Granularity) -> Result<Self, KbarError> {
        Self::with_label(writer, schema, granularity, "<writer>".to_string())
    }

    fn with_label(
        writer: W,
        schema: Schema,
        granularity: Granularity,
        label: String,
    ) -> Result<Self, KbarError> {
        let mut inner = csv::Writer::from_writer(writer);
        inner
            .write_record(schema.header())
            .map_err(|e| KbarError::io(&label, e))?;
        Ok(Self {
            inner,
            schema,
            granularity,
            label,
            rows: 0,
        })
    }

    /// Append one bar.
    ///
    /// # Errors
    /// Returns `Io` on write failure.
    pub fn write(&mut self, bar: &Bar) -> Result<(), KbarError> {
        let row: Vec<String> = self
            .schema
            .columns()
            .iter()
            .map(|col| match col.role {
                ColumnRole::Time => format_time(bar.ts, self.granularity),
                ColumnRole::Value(field) => bar.get(field).map(|v| v.to_string()).unwrap_or_default(),
            })
            .collect();
        self.inner
            .write_record(&row)
            .map_err(|e| KbarError::io(&self.label, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of data rows written.
    ///
    /// # Errors
    /// Returns `Io` if flushing fails.
    pub fn finish(mut self) -> Result<usize, KbarError> {
        self.inner
            .flush()
            .map_err(|e| KbarError::io(&self.label, e))?;
        Ok(self.rows)
    }
}

/// Write a whole series to `path`; returns the number of rows written.
///
/// # Errors
/// Returns `Io` on any create or write failure.
pub fn write_bars<'a, I>(
    path: impl AsRef<Path>,
    schema: Schema,
    granularity: Granularity,
    bars: I,
) -> Result<usize, KbarError>
where
    I: IntoIterator<Item = &'a Bar>,
{
    let mut writer = BarWriter::create(path, schema, granularity)?;
    for bar in bars {
        writer.write(bar)?;
    }
    writer.finish()
}
