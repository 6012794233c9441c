//! The bar record and its addressable fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{KTime, KbarError};

/// One OHLCV record at minute resolution.
///
/// Bars are plain values: readers construct them, resamplers and validators
/// consume them, nothing mutates them in place. Callers are expected to keep
/// `low <= open, close <= high` and `volume >= 0`; the checks live in
/// `kbar_core::timeseries::util`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar timestamp (for aggregated bars, the left edge of the bucket).
    pub ts: KTime,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded quantity.
    pub volume: f64,
    /// Traded money value, when the source provides it.
    pub turnover: Option<f64>,
    /// Turnover rate, when the source provides it. Never aggregated.
    pub turnover_rate: Option<f64>,
    /// Instrument identifier, passed through untouched.
    pub symbol: Option<String>,
}

impl Bar {
    /// Build a bar without turnover, turnover rate or symbol.
    #[must_use]
    pub const fn new(ts: KTime, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
            turnover: None,
            turnover_rate: None,
            symbol: None,
        }
    }

    /// Set the turnover value.
    #[must_use]
    pub const fn with_turnover(mut self, turnover: f64) -> Self {
        self.turnover = Some(turnover);
        self
    }

    /// Set the symbol.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Numeric value of a field; `None` for an absent optional field.
    #[must_use]
    pub const fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::Open => Some(self.open),
            Field::High => Some(self.high),
            Field::Low => Some(self.low),
            Field::Close => Some(self.close),
            Field::Volume => Some(self.volume),
            Field::Turnover => self.turnover,
            Field::TurnoverRate => self.turnover_rate,
        }
    }
}

/// Numeric bar fields addressable by schema columns and the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    Close,
    /// Traded quantity.
    Volume,
    /// Traded money value.
    Turnover,
    /// Turnover rate.
    TurnoverRate,
}

impl Field {
    /// Fields compared by default when validating two series.
    pub const DEFAULT_CHECKED: [Self; 5] =
        [Self::Open, Self::High, Self::Low, Self::Close, Self::Volume];

    /// Lower-case column name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
            Self::Turnover => "turnover",
            Self::TurnoverRate => "turnover_rate",
        }
    }

    /// Price-like fields are compared with the price tolerance.
    #[must_use]
    pub const fn is_price(self) -> bool {
        matches!(self, Self::Open | Self::High | Self::Low | Self::Close)
    }

    /// Optional fields may be absent from a bar.
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self, Self::Turnover | Self::TurnoverRate)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = KbarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "high" => Ok(Self::High),
            "low" => Ok(Self::Low),
            "close" => Ok(Self::Close),
            "volume" => Ok(Self::Volume),
            "turnover" => Ok(Self::Turnover),
            "turnover_rate" | "turnrate" => Ok(Self::TurnoverRate),
            other => Err(KbarError::InvalidArg(format!("unknown bar field '{other}'"))),
        }
    }
}
