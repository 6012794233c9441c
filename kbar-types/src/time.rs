//! Canonical minute-resolution timestamp.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar-valid local timestamp truncated to the minute.
///
/// Ordering is chronological. Seconds and sub-second parts are always zero,
/// so two `KTime` values compare equal iff they name the same minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KTime(NaiveDateTime);

impl KTime {
    /// Build from calendar components; `None` if any component is out of range
    /// (month 13, hour 24, February 30, ...).
    #[must_use]
    pub fn from_ymd_hm(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, 0)
            .map(Self)
    }

    /// Midnight of the given date; `None` if the date is not on the calendar.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        Self::from_ymd_hm(year, month, day, 0, 0)
    }

    /// Truncate a `NaiveDateTime` to the minute.
    #[must_use]
    pub fn from_naive(dt: NaiveDateTime) -> Self {
        let time = NaiveTime::from_hms_opt(dt.hour(), dt.minute(), 0).unwrap_or(NaiveTime::MIN);
        Self(dt.date().and_time(time))
    }

    /// Underlying `NaiveDateTime` (seconds are zero).
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Calendar year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month, 1-based.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month, 1-based.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Hour of day, 0..=23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Minute of hour, 0..=59.
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Minutes elapsed since midnight, 0..1440.
    #[must_use]
    pub fn minute_of_day(&self) -> u32 {
        self.hour() * 60 + self.minute()
    }

    /// Days since the most recent Monday, 0..=6.
    #[must_use]
    pub fn days_from_monday(&self) -> u32 {
        self.0.weekday().num_days_from_monday()
    }

    /// Midnight of the same day.
    #[must_use]
    pub fn start_of_day(&self) -> Self {
        Self(self.0.date().and_time(NaiveTime::MIN))
    }

    /// Shift by a signed number of minutes.
    #[must_use]
    pub fn plus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + TimeDelta::minutes(minutes))
    }

    /// Signed minutes from `earlier` to `self`.
    #[must_use]
    pub fn minutes_since(&self, earlier: Self) -> i64 {
        (self.0 - earlier.0).num_minutes()
    }

    /// Midnight-aligned values carry no intraday information.
    #[must_use]
    pub fn is_midnight(&self) -> bool {
        self.minute_of_day() == 0
    }

    /// Date part formatted as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_str(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// Number of minutes in a calendar day.
    pub const MINUTES_PER_DAY: u32 = 1_440;
}

impl From<NaiveDateTime> for KTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self::from_naive(dt)
    }
}

impl fmt::Display for KTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M"))
    }
}
