//! Calendar-day keys and text parsing errors.
//!
//! # Responsibility
//! - Provide the `YYYY-MM-DD` key shared by all journal streams.
//! - Provide day arithmetic for range cutoffs.
//!
//! # Invariants
//! - Text form is always zero-padded ISO 8601 calendar date.
//! - `Ord` on `DayKey` agrees with lexicographic order of the text form.

use chrono::{Days, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

static DAY_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid day key regex"));

/// Error returned when journal text input does not match its expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not a zero-padded `YYYY-MM-DD` calendar date.
    InvalidDayKey(String),
    /// Not a 24h `HH:MM` clock time.
    InvalidClockTime(String),
    /// Not one of `great|tired|sleepy`.
    UnknownSleepQuality(String),
    /// Not one of the five meal slots.
    UnknownMealType(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDayKey(value) => {
                write!(f, "invalid day key `{value}`; expected YYYY-MM-DD")
            }
            Self::InvalidClockTime(value) => {
                write!(f, "invalid clock time `{value}`; expected HH:MM (24h)")
            }
            Self::UnknownSleepQuality(value) => write!(
                f,
                "unknown sleep quality `{value}`; expected great|tired|sleepy"
            ),
            Self::UnknownMealType(value) => write!(
                f,
                "unknown meal type `{value}`; expected breakfast|morningSnack|lunch|afternoonSnack|dinner"
            ),
        }
    }
}

impl Error for ParseError {}

/// Calendar-day key used as (part of) the natural key of every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(NaiveDate);

impl DayKey {
    /// Parses a `YYYY-MM-DD` key.
    ///
    /// # Errors
    /// - Returns `ParseError::InvalidDayKey` for unpadded, out-of-range or
    ///   otherwise malformed input (e.g. `2024-5-1`, `2024-02-30`).
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        if !DAY_KEY_RE.is_match(value) {
            return Err(ParseError::InvalidDayKey(value.to_string()));
        }
        NaiveDate::parse_from_str(value, DAY_KEY_FORMAT)
            .map(Self)
            .map_err(|_| ParseError::InvalidDayKey(value.to_string()))
    }

    /// Builds a key from calendar components.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Current calendar day in the device's local timezone.
    pub fn today_local() -> Self {
        Self(Local::now().date_naive())
    }

    /// Returns the key `days` calendar days earlier.
    ///
    /// Saturates at the earliest representable date instead of failing.
    pub fn days_before(self, days: u32) -> Self {
        Self(
            self.0
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
        )
    }

    /// Returns the key `days` calendar days later, saturating at the latest
    /// representable date.
    pub fn days_after(self, days: u32) -> Self {
        Self(
            self.0
                .checked_add_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    pub fn as_naive_date(self) -> NaiveDate {
        self.0
    }
}

impl Display for DayKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DAY_KEY_FORMAT))
    }
}

impl FromStr for DayKey {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DayKey {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<DayKey> for String {
    fn from(value: DayKey) -> Self {
        value.to_string()
    }
}
