//! Journal entry records.
//!
//! # Responsibility
//! - Define sleep, meal and exercise entries and their natural keys.
//! - Fix the persisted JSON field names (`camelCase`).
//!
//! # Invariants
//! - Sleep and exercise entries are unique per `date` inside a collection.
//! - Meal entries are unique per `(date, meal_type)` inside a collection.
//! - Range checks (e.g. room temperature) are advisory and never enforced.

use crate::model::day::{DayKey, ParseError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Room temperature (Fahrenheit) pre-filled for a new sleep entry.
pub const DEFAULT_ROOM_TEMPERATURE_F: i32 = 70;
/// Expected slider domain for room temperature. Not enforced on write.
pub const ROOM_TEMPERATURE_RANGE_F: std::ops::RangeInclusive<i32> = 60..=80;

/// Self-reported sleep quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepQuality {
    Great,
    Tired,
    Sleepy,
}

impl SleepQuality {
    pub const ALL: [SleepQuality; 3] = [Self::Great, Self::Tired, Self::Sleepy];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Great => "great",
            Self::Tired => "tired",
            Self::Sleepy => "sleepy",
        }
    }
}

impl Display for SleepQuality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SleepQuality {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|quality| quality.as_str() == s)
            .ok_or_else(|| ParseError::UnknownSleepQuality(s.to_string()))
    }
}

/// Meal slot within a day, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MealType {
    Breakfast,
    MorningSnack,
    Lunch,
    AfternoonSnack,
    Dinner,
}

impl MealType {
    /// All slots in the order they appear on a day.
    pub const ALL: [MealType; 5] = [
        Self::Breakfast,
        Self::MorningSnack,
        Self::Lunch,
        Self::AfternoonSnack,
        Self::Dinner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::MorningSnack => "morningSnack",
            Self::Lunch => "lunch",
            Self::AfternoonSnack => "afternoonSnack",
            Self::Dinner => "dinner",
        }
    }

    /// Position of this slot in `MealType::ALL`.
    pub fn slot_index(self) -> usize {
        match self {
            Self::Breakfast => 0,
            Self::MorningSnack => 1,
            Self::Lunch => 2,
            Self::AfternoonSnack => 3,
            Self::Dinner => 4,
        }
    }
}

impl Display for MealType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|meal_type| meal_type.as_str() == s)
            .ok_or_else(|| ParseError::UnknownMealType(s.to_string()))
    }
}

/// One night's sleep record. Natural key: `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepEntry {
    pub date: DayKey,
    /// `None` means the user has not rated the night yet.
    pub sleep_quality: Option<SleepQuality>,
    /// Fahrenheit; expected within `ROOM_TEMPERATURE_RANGE_F`.
    pub room_temperature: i32,
    pub thoughts: String,
}

impl SleepEntry {
    /// Creates an unrated entry with the default room temperature.
    pub fn new(date: DayKey) -> Self {
        Self {
            date,
            sleep_quality: None,
            room_temperature: DEFAULT_ROOM_TEMPERATURE_F,
            thoughts: String::new(),
        }
    }

    /// Whether `room_temperature` lies in the slider's expected domain.
    pub fn has_expected_temperature(&self) -> bool {
        ROOM_TEMPERATURE_RANGE_F.contains(&self.room_temperature)
    }
}

/// One meal slot record. Natural key: `(date, meal_type)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealEntry {
    pub date: DayKey,
    pub meal_type: MealType,
    pub eaten: bool,
    pub notes: String,
    /// Opaque reference to a locally stored photo. Omitted from JSON when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
}

impl MealEntry {
    /// Creates a not-eaten entry without notes or photo.
    pub fn new(date: DayKey, meal_type: MealType) -> Self {
        Self {
            date,
            meal_type,
            eaten: false,
            notes: String::new(),
            image_uri: None,
        }
    }

    pub fn key(&self) -> (DayKey, MealType) {
        (self.date, self.meal_type)
    }
}

/// One day's workout record. Natural key: `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseEntry {
    pub date: DayKey,
    pub completed: bool,
    pub notes: String,
}

impl ExerciseEntry {
    pub fn new(date: DayKey) -> Self {
        Self {
            date,
            completed: false,
            notes: String::new(),
        }
    }
}
