//! Timestamp parsing for the time column of bar files.
//!
//! Layouts are tried in a fixed priority order. The input length selects the
//! candidate layouts; each candidate then checks digit and separator positions
//! and the calendar ranges of the extracted components.

use kbar_types::{DateRange, KTime, KbarError, ParseMode};

/// One accepted timestamp layout.
///
/// In `pattern`, `D` marks a digit, `S` a date/time separator (space or `T`),
/// and any other character must appear literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLayout {
    /// Short name used in diagnostics.
    pub name: &'static str,
    /// Character pattern; its length is the accepted input length.
    pub pattern: &'static str,
    year: (usize, usize),
    month: (usize, usize),
    day: (usize, usize),
    hour: Option<(usize, usize)>,
    minute: Option<(usize, usize)>,
    second: Option<(usize, usize)>,
}

impl TimeLayout {
    /// Accepted input length in characters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.pattern.len()
    }

    /// Layouts are never empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    fn check_shape(&self, raw: &[u8], mode: ParseMode) -> Result<(), String> {
        for (pos, (&want, &got)) in self.pattern.as_bytes().iter().zip(raw).enumerate() {
            let ok = match (want, mode) {
                (b'D', _) => got.is_ascii_digit(),
                (_, ParseMode::Lenient) => true,
                (b'S', _) => got == b' ' || got == b'T',
                (lit, _) => got == lit,
            };
            if !ok {
                return Err(format!(
                    "unexpected character {:?} at offset {pos} for layout {}",
                    char::from(got),
                    self.name
                ));
            }
        }
        Ok(())
    }

    fn extract(&self, raw: &[u8], mode: ParseMode) -> Result<KTime, String> {
        self.check_shape(raw, mode)?;
        let year = digits(raw, self.year);
        let month = digits(raw, self.month);
        let day = digits(raw, self.day);
        let hour = self.hour.map_or(0, |f| digits(raw, f));
        let minute = self.minute.map_or(0, |f| digits(raw, f));
        if let Some(f) = self.second {
            let second = digits(raw, f);
            if second > 59 {
                return Err(format!("second {second} out of range"));
            }
        }
        let year = i32::try_from(year).map_err(|_| format!("year {year} out of range"))?;
        KTime::from_ymd_hm(year, month, day, hour, minute).ok_or_else(|| {
            format!(
                "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02} is not a calendar date/time"
            )
        })
    }
}

fn digits(raw: &[u8], (start, len): (usize, usize)) -> u32 {
    raw[start..start + len]
        .iter()
        .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0'))
}

/// `2021-09-13`
pub const DATE: TimeLayout = TimeLayout {
    name: "date",
    pattern: "DDDD-DD-DD",
    year: (0, 4),
    month: (5, 2),
    day: (8, 2),
    hour: None,
    minute: None,
    second: None,
};

/// `2021-09-13 09:30`
pub const DATE_MINUTE: TimeLayout = TimeLayout {
    name: "date-minute",
    pattern: "DDDD-DD-DDSDD:DD",
    year: (0, 4),
    month: (5, 2),
    day: (8, 2),
    hour: Some((11, 2)),
    minute: Some((14, 2)),
    second: None,
};

/// `20210902113000000`; seconds and milliseconds are read but discarded.
pub const COMPACT: TimeLayout = TimeLayout {
    name: "compact",
    pattern: "DDDDDDDDDDDDDDDDD",
    year: (0, 4),
    month: (4, 2),
    day: (6, 2),
    hour: Some((8, 2)),
    minute: Some((10, 2)),
    second: Some((12, 2)),
};

/// `2021-09-13 09:30:00`; seconds are discarded.
pub const DATE_SECOND: TimeLayout = TimeLayout {
    name: "date-second",
    pattern: "DDDD-DD-DDSDD:DD:DD",
    year: (0, 4),
    month: (5, 2),
    day: (8, 2),
    hour: Some((11, 2)),
    minute: Some((14, 2)),
    second: Some((17, 2)),
};

/// All layouts, in the order they are tried.
pub const LAYOUTS: [TimeLayout; 4] = [DATE, DATE_MINUTE, COMPACT, DATE_SECOND];

/// Stateless timestamp parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampParser {
    mode: ParseMode,
}

impl TimestampParser {
    /// Parser with the given matching mode.
    #[must_use]
    pub const fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    /// Matching mode in use.
    #[must_use]
    pub const fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Parse `raw` into a minute-resolution timestamp.
    ///
    /// ```
    /// use kbar_core::TimestampParser;
    ///
    /// let p = TimestampParser::default();
    /// let t = p.parse("20240102093000000").unwrap();
    /// assert_eq!((t.year(), t.month(), t.day(), t.hour(), t.minute()), (2024, 1, 2, 9, 30));
    /// assert!(p.parse("2024-01-02-X").is_err());
    /// ```
    ///
    /// # Errors
    /// Returns `TimeFormat` when no layout has the input's length, or when every
    /// layout of that length rejects it (bad characters, out-of-range
    /// components).
    pub fn parse(&self, raw: &str) -> Result<KTime, KbarError> {
        if !raw.is_ascii() {
            return Err(KbarError::time_format(raw, "non-ASCII characters"));
        }
        let bytes = raw.as_bytes();
        let mut last_reason: Option<String> = None;
        for layout in LAYOUTS.iter().filter(|l| l.len() == bytes.len()) {
            match layout.extract(bytes, self.mode) {
                Ok(ts) => return Ok(ts),
                Err(reason) => last_reason = Some(reason),
            }
        }
        Err(KbarError::time_format(
            raw,
            last_reason.unwrap_or_else(|| "no layout of this length".to_string()),
        ))
    }

    /// Parse optional range bounds with this parser.
    ///
    /// # Errors
    /// Returns `TimeFormat` for an unparseable bound and `InvalidArg` when
    /// `begin` is after `end`.
    pub fn parse_range(
        &self,
        begin: Option<&str>,
        end: Option<&str>,
    ) -> Result<DateRange, KbarError> {
        let begin = begin.map(|s| self.parse(s)).transpose()?;
        let end = end.map(|s| self.parse(s)).transpose()?;
        DateRange::new(begin, end)
    }
}

/// Parse with the default (strict) parser.
///
/// # Errors
/// See [`TimestampParser::parse`].
pub fn parse_time(raw: &str) -> Result<KTime, KbarError> {
    TimestampParser::default().parse(raw)
}
