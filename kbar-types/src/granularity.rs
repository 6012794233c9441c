//! Bucket widths and their file-name tokens.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{KTime, KbarError};

/// Width of a bar bucket.
///
/// Sub-day widths are anchored at minute 0 of each day, so a width that does
/// not divide 1440 restarts at midnight. Weeks start on Monday 00:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Granularity {
    /// `n` minutes, `1..1440`. Build with [`Granularity::minutes`].
    Minutes(u32),
    /// One calendar day, labeled at midnight.
    Day,
    /// One calendar week, labeled at Monday midnight.
    Week,
}

impl Granularity {
    /// One-minute bars.
    pub const M1: Self = Self::Minutes(1);
    /// Five-minute bars.
    pub const M5: Self = Self::Minutes(5);
    /// Fifteen-minute bars.
    pub const M15: Self = Self::Minutes(15);
    /// Thirty-minute bars.
    pub const M30: Self = Self::Minutes(30);
    /// Sixty-minute bars.
    pub const M60: Self = Self::Minutes(60);

    /// Build a minute granularity.
    ///
    /// `1440` normalizes to [`Granularity::Day`].
    ///
    /// # Errors
    /// Returns `InvalidArg` for `0` or anything above one day.
    pub fn minutes(n: u32) -> Result<Self, KbarError> {
        match n {
            0 => Err(KbarError::InvalidArg(
                "granularity must be at least one minute".into(),
            )),
            KTime::MINUTES_PER_DAY => Ok(Self::Day),
            n if n > KTime::MINUTES_PER_DAY => Err(KbarError::InvalidArg(format!(
                "minute granularity {n} exceeds one day; use Day or Week"
            ))),
            n => Ok(Self::Minutes(n)),
        }
    }

    /// Nominal width in minutes.
    #[must_use]
    pub const fn nominal_minutes(self) -> u32 {
        match self {
            Self::Minutes(n) => n,
            Self::Day => KTime::MINUTES_PER_DAY,
            Self::Week => KTime::MINUTES_PER_DAY * 7,
        }
    }

    /// True for widths shorter than a day.
    #[must_use]
    pub const fn is_intraday(self) -> bool {
        matches!(self, Self::Minutes(_))
    }

    /// Strictly wider than `other`.
    #[must_use]
    pub const fn is_coarser_than(self, other: Self) -> bool {
        self.nominal_minutes() > other.nominal_minutes()
    }

    /// Every bucket of `self` is an exact union of `finer` buckets.
    ///
    /// Holds for day and week targets over any finer source, and for minute
    /// targets whose width is a multiple of the source width.
    #[must_use]
    pub const fn is_aligned_with(self, finer: Self) -> bool {
        match (self, finer) {
            (Self::Minutes(n), Self::Minutes(m)) => m != 0 && n % m == 0,
            (Self::Minutes(_), _) => false,
            (Self::Day, Self::Week) => false,
            (Self::Day | Self::Week, _) => true,
        }
    }

    /// Left edge of the bucket containing `ts`.
    #[must_use]
    pub fn floor(self, ts: KTime) -> KTime {
        match self {
            Self::Minutes(n) => {
                let step = n.max(1);
                let mod_day = ts.minute_of_day();
                ts.start_of_day()
                    .plus_minutes(i64::from(mod_day - mod_day % step))
            }
            Self::Day => ts.start_of_day(),
            Self::Week => ts
                .start_of_day()
                .plus_minutes(-i64::from(ts.days_from_monday() * KTime::MINUTES_PER_DAY)),
        }
    }

    /// File-name token: `5m`, `day`, `week`.
    #[must_use]
    pub fn token(self) -> String {
        match self {
            Self::Minutes(n) => format!("{n}m"),
            Self::Day => "day".to_string(),
            Self::Week => "week".to_string(),
        }
    }

    /// Conventional data file name: `{code}_{token}.csv`.
    #[must_use]
    pub fn file_name(self, code: &str) -> String {
        format!("{code}_{}.csv", self.token())
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.token())
    }
}

impl FromStr for Granularity {
    type Err = KbarError;

    /// Accepts file tokens (`1m`, `30m`, `day`, `week`), pandas-like aliases
    /// (`5min`, `1d`, `w`) and legacy kind names (`K_5M`, `K_DAY`, `K_WEEK`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let key = lower.strip_prefix("k_").unwrap_or(&lower);
        match key {
            "day" | "d" | "1d" | "daily" => return Ok(Self::Day),
            "week" | "w" | "1w" | "weekly" => return Ok(Self::Week),
            _ => {}
        }
        let digits = key
            .strip_suffix("min")
            .or_else(|| key.strip_suffix('m'))
            .ok_or_else(|| KbarError::InvalidArg(format!("unknown granularity '{s}'")))?;
        let n: u32 = digits
            .parse()
            .map_err(|_| KbarError::InvalidArg(format!("unknown granularity '{s}'")))?;
        Self::minutes(n)
    }
}

impl TryFrom<String> for Granularity {
    type Error = KbarError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Granularity> for String {
    fn from(g: Granularity) -> Self {
        g.token()
    }
}
