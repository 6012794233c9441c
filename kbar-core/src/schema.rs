//! Explicit column schema shared by the CSV reader and writer.

use kbar_types::{Field, KbarError};

/// Value type stored in a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Timestamp string, parsed by `TimestampParser`.
    Time,
    /// Price (open/high/low/close).
    Price,
    /// Traded quantity.
    Volume,
    /// Money value.
    Amount,
    /// Dimensionless ratio.
    Ratio,
}

/// What a column feeds in a `Bar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// The bar timestamp.
    Time,
    /// A numeric bar field.
    Value(Field),
}

/// One declared column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Header name.
    pub name: &'static str,
    /// Bar slot the column fills.
    pub role: ColumnRole,
    /// Declared value type.
    pub kind: ColumnKind,
    /// Required columns reject empty cells.
    pub required: bool,
}

impl Column {
    /// The timestamp column.
    #[must_use]
    pub const fn time(name: &'static str) -> Self {
        Self {
            name,
            role: ColumnRole::Time,
            kind: ColumnKind::Time,
            required: true,
        }
    }

    /// A numeric column; kind and required-ness follow from the field.
    #[must_use]
    pub const fn value(field: Field) -> Self {
        Self {
            name: field.name(),
            role: ColumnRole::Value(field),
            kind: kind_of(field),
            required: !field.is_optional(),
        }
    }
}

const fn kind_of(field: Field) -> ColumnKind {
    match field {
        Field::Open | Field::High | Field::Low | Field::Close => ColumnKind::Price,
        Field::Volume => ColumnKind::Volume,
        Field::Turnover => ColumnKind::Amount,
        Field::TurnoverRate => ColumnKind::Ratio,
    }
}

const STANDARD: [Column; 8] = [
    Column::time("time"),
    Column::value(Field::Open),
    Column::value(Field::High),
    Column::value(Field::Low),
    Column::value(Field::Close),
    Column::value(Field::Volume),
    Column::value(Field::Turnover),
    Column::value(Field::TurnoverRate),
];

/// Ordered column layout of a bar file.
///
/// Constructed once and handed to both `CsvBarSource` and `BarWriter`, so a
/// producer and a consumer sharing a schema cannot drift apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
    time_idx: usize,
}

impl Schema {
    /// Validate and build a schema.
    ///
    /// # Errors
    /// Returns `InvalidArg` when there is not exactly one time column, a bar
    /// field appears twice, one of open/high/low/close/volume is missing, or a
    /// column's kind disagrees with its field.
    pub fn new(columns: Vec<Column>) -> Result<Self, KbarError> {
        let mut time_idx: Option<usize> = None;
        let mut seen: Vec<Field> = Vec::with_capacity(columns.len());
        for (idx, col) in columns.iter().enumerate() {
            match col.role {
                ColumnRole::Time => {
                    if col.kind != ColumnKind::Time {
                        return Err(KbarError::InvalidArg(format!(
                            "time column '{}' must have kind Time",
                            col.name
                        )));
                    }
                    if time_idx.replace(idx).is_some() {
                        return Err(KbarError::InvalidArg(
                            "schema declares more than one time column".into(),
                        ));
                    }
                }
                ColumnRole::Value(field) => {
                    if col.kind != kind_of(field) {
                        return Err(KbarError::InvalidArg(format!(
                            "column '{}' declares {:?} but field {field} is {:?}",
                            col.name,
                            col.kind,
                            kind_of(field)
                        )));
                    }
                    if seen.contains(&field) {
                        return Err(KbarError::InvalidArg(format!(
                            "field {field} declared twice"
                        )));
                    }
                    seen.push(field);
                }
            }
        }
        let time_idx = time_idx
            .ok_or_else(|| KbarError::InvalidArg("schema has no time column".into()))?;
        for field in Field::DEFAULT_CHECKED {
            if !seen.contains(&field) {
                return Err(KbarError::InvalidArg(format!(
                    "schema is missing required field {field}"
                )));
            }
        }
        Ok(Self { columns, time_idx })
    }

    /// `time, open, high, low, close, volume, turnover, turnover_rate`.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            columns: STANDARD.to_vec(),
            time_idx: 0,
        }
    }

    /// `time, open, high, low, close, volume`.
    #[must_use]
    pub fn ohlcv() -> Self {
        Self {
            columns: STANDARD[..6].to_vec(),
            time_idx: 0,
        }
    }

    /// `time, open, high, low, close, volume, turnover`.
    #[must_use]
    pub fn with_turnover() -> Self {
        Self {
            columns: STANDARD[..7].to_vec(),
            time_idx: 0,
        }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Schemas always have at least the time column.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in file order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of the time column.
    #[must_use]
    pub const fn time_index(&self) -> usize {
        self.time_idx
    }

    /// Whether the schema carries a field.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        self.columns
            .iter()
            .any(|c| c.role == ColumnRole::Value(field))
    }

    /// Header row.
    #[must_use]
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::standard()
    }
}
