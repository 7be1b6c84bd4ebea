//! User settings singleton and partial updates.
//!
//! # Responsibility
//! - Define reminder settings consumed by the notification collaborator.
//! - Provide shallow-merge semantics for partial updates.
//!
//! # Invariants
//! - Exactly one `UserSettings` value exists; missing values take defaults.
//! - Clock times are always valid 24h `HH:MM`.

use crate::model::day::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static CLOCK_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid clock time regex"));

/// Wall-clock time of day, 24h, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Builds a clock time from components.
    ///
    /// # Errors
    /// - Returns `ParseError::InvalidClockTime` when `hour > 23` or `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ParseError> {
        if hour > 23 || minute > 59 {
            return Err(ParseError::InvalidClockTime(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Parses zero-padded `HH:MM` text.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let captures = CLOCK_TIME_RE
            .captures(value)
            .ok_or_else(|| ParseError::InvalidClockTime(value.to_string()))?;
        let hour = captures[1]
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidClockTime(value.to_string()))?;
        let minute = captures[2]
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidClockTime(value.to_string()))?;
        Self::new(hour, minute)
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Reminder settings. Also the read-only snapshot handed to notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    pub wake_up_time: ClockTime,
    pub bed_time: ClockTime,
    pub notifications_enabled: bool,
}

impl Default for UserSettings {
    /// `06:00` wake-up, `22:00` bed time, notifications on.
    fn default() -> Self {
        Self {
            wake_up_time: ClockTime { hour: 6, minute: 0 },
            bed_time: ClockTime {
                hour: 22,
                minute: 0,
            },
            notifications_enabled: true,
        }
    }
}

impl UserSettings {
    /// Returns a copy with every field present in `patch` overwritten.
    pub fn merged(self, patch: &UserSettingsPatch) -> Self {
        Self {
            wake_up_time: patch.wake_up_time.unwrap_or(self.wake_up_time),
            bed_time: patch.bed_time.unwrap_or(self.bed_time),
            notifications_enabled: patch
                .notifications_enabled
                .unwrap_or(self.notifications_enabled),
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserSettingsPatch {
    pub wake_up_time: Option<ClockTime>,
    pub bed_time: Option<ClockTime>,
    pub notifications_enabled: Option<bool>,
}

impl UserSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.wake_up_time.is_none() && self.bed_time.is_none() && self.notifications_enabled.is_none()
    }
}
