//! Lazy, range-filtered bar reader over delimited files.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use kbar_types::{Bar, DateRange, Field, KTime, KbarError, ParseMode};

use crate::schema::{Column, ColumnRole, Schema};
use crate::timestamp::TimestampParser;

/// Reader options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// Skip the first row. Not auto-detected.
    pub has_header: bool,
    /// Field delimiter.
    pub delimiter: u8,
    /// Timestamp matching mode.
    pub parse_mode: ParseMode,
    /// Treat a non-increasing timestamp as a format error. When enabled the
    /// reader also stops at the first row past the range end.
    pub strict_ordering: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            parse_mode: ParseMode::Strict,
            strict_ordering: false,
        }
    }
}

/// Forward-only iterator of bars read from one file.
///
/// Rows are decoded one at a time; the file is never buffered whole. The first
/// error ends the iteration. Dropping the iterator closes the file, so
/// stopping early is the way to cancel a read. Calling
/// [`CsvBarSource::open`] again re-reads the file from the start.
pub struct CsvBarSource {
    path: String,
    schema: Schema,
    parser: TimestampParser,
    range: DateRange,
    strict_ordering: bool,
    symbol: Option<String>,
    records: StringRecordsIntoIter<File>,
    line: u64,
    last_ts: Option<KTime>,
    done: bool,
}

impl std::fmt::Debug for CsvBarSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvBarSource")
            .field("path", &self.path)
            .field("range", &self.range)
            .field("line", &self.line)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl CsvBarSource {
    /// Open `path` for reading.
    ///
    /// # Errors
    /// Returns `DataSourceNotFound` if the file does not exist and `Io` for any
    /// other open failure. Nothing is read before this returns.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            target = "kbar_core::source",
            skip_all,
            fields(path = %path.as_ref().display()),
        )
    )]
    pub fn open(
        path: impl AsRef<Path>,
        schema: Schema,
        options: CsvOptions,
        range: DateRange,
    ) -> Result<Self, KbarError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let file = File::open(path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                KbarError::not_found(display.clone())
            } else {
                KbarError::io(display.clone(), e)
            }
        })?;
        let reader = ReaderBuilder::new()
            .has_headers(options.has_header)
            .delimiter(options.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "kbar_core::source", columns = schema.len(), "opened bar file");
        Ok(Self {
            path: display,
            schema,
            parser: TimestampParser::new(options.parse_mode),
            range,
            strict_ordering: options.strict_ordering,
            symbol: None,
            records: reader.into_records(),
            line: 0,
            last_ts: None,
            done: false,
        })
    }

    /// Stamp every produced bar with `symbol`.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// File being read.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Physical line of the most recently decoded row (1-based, 0 before the
    /// first row).
    #[must_use]
    pub const fn line(&self) -> u64 {
        self.line
    }

    fn fail(&mut self, err: KbarError) -> Option<Result<Bar, KbarError>> {
        self.done = true;
        #[cfg(feature = "tracing")]
        tracing::warn!(target: "kbar_core::source", path = %self.path, line = self.line, error = %err, "aborting read");
        Some(Err(err))
    }

    fn decode(&self, record: &StringRecord) -> Result<Bar, KbarError> {
        if record.len() != self.schema.len() {
            return Err(KbarError::data_format(
                &self.path,
                format!(
                    "line {}: expected {} columns, found {}",
                    self.line,
                    self.schema.len(),
                    record.len()
                ),
            ));
        }

        let mut ts: Option<KTime> = None;
        let mut row = RowValues::default();
        for (col, cell) in self.schema.columns().iter().zip(record.iter()) {
            match col.role {
                ColumnRole::Time => ts = Some(self.parser.parse(cell)?),
                ColumnRole::Value(field) => row.set(field, self.number(col, cell)?),
            }
        }

        let ts = ts.ok_or_else(|| KbarError::data_format(&self.path, "row has no time value"))?;
        let required = |field: Field, v: Option<f64>| {
            v.ok_or_else(|| {
                KbarError::data_format(
                    &self.path,
                    format!("line {}: missing value for {field}", self.line),
                )
            })
        };
        Ok(Bar {
            ts,
            open: required(Field::Open, row.open)?,
            high: required(Field::High, row.high)?,
            low: required(Field::Low, row.low)?,
            close: required(Field::Close, row.close)?,
            volume: required(Field::Volume, row.volume)?,
            turnover: row.turnover,
            turnover_rate: row.turnover_rate,
            symbol: self.symbol.clone(),
        })
    }

    fn number(&self, col: &Column, cell: &str) -> Result<Option<f64>, KbarError> {
        if cell.is_empty() {
            if col.required {
                return Err(KbarError::data_format(
                    &self.path,
                    format!("line {}: empty value in column '{}'", self.line, col.name),
                ));
            }
            return Ok(None);
        }
        cell.parse::<f64>().map(Some).map_err(|_| {
            KbarError::data_format(
                &self.path,
                format!(
                    "line {}: invalid number {cell:?} in column '{}'",
                    self.line, col.name
                ),
            )
        })
    }
}

#[derive(Default)]
struct RowValues {
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
    turnover: Option<f64>,
    turnover_rate: Option<f64>,
}

impl RowValues {
    fn set(&mut self, field: Field, v: Option<f64>) {
        let slot = match field {
            Field::Open => &mut self.open,
            Field::High => &mut self.high,
            Field::Low => &mut self.low,
            Field::Close => &mut self.close,
            Field::Volume => &mut self.volume,
            Field::Turnover => &mut self.turnover,
            Field::TurnoverRate => &mut self.turnover_rate,
        };
        *slot = v;
    }
}

impl Iterator for CsvBarSource {
    type Item = Result<Bar, KbarError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            let record = match self.records.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    let err = if e.is_io_error() {
                        KbarError::io(&self.path, e)
                    } else {
                        KbarError::data_format(&self.path, e.to_string())
                    };
                    return self.fail(err);
                }
                Some(Ok(r)) => r,
            };
            self.line = record.position().map_or(self.line + 1, csv::Position::line);

            let bar = match self.decode(&record) {
                Ok(bar) => bar,
                Err(e) => return self.fail(e),
            };

            if self.strict_ordering {
                if let Some(prev) = self.last_ts
                    && bar.ts <= prev
                {
                    let err = KbarError::data_format(
                        &self.path,
                        format!(
                            "line {}: timestamp {} does not follow {prev}",
                            self.line, bar.ts
                        ),
                    );
                    return self.fail(err);
                }
                if self.range.is_past(bar.ts) {
                    self.done = true;
                    return None;
                }
            }
            self.last_ts = Some(bar.ts);

            if self.range.contains(bar.ts) {
                return Some(Ok(bar));
            }
        }
    }
}

impl std::iter::FusedIterator for CsvBarSource {}
