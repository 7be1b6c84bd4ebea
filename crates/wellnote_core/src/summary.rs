//! Rolling multi-day wellness summary.
//!
//! Projects recent entries onto a fixed day grid (oldest first) so a review
//! screen can render one column per day without searching collections.

use crate::model::day::DayKey;
use crate::model::entry::{MealType, SleepQuality};
use crate::storage::KeyValueStore;
use crate::store::{JournalStore, RecentEntries};

/// Days shown by the summary screen.
pub const SUMMARY_DAYS: u32 = 7;

/// Eaten/skipped state of one meal slot on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealSlot {
    pub meal_type: MealType,
    /// `false` both for "skipped" and for "no entry recorded".
    pub eaten: bool,
}

/// One column of the summary grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: DayKey,
    pub sleep_quality: Option<SleepQuality>,
    /// `None` when no sleep entry exists for the day.
    pub room_temperature: Option<i32>,
    pub exercise_completed: bool,
    /// Always five slots, in `MealType::ALL` order.
    pub meals: [MealSlot; 5],
}

impl DaySummary {
    pub fn meals_eaten(&self) -> usize {
        self.meals.iter().filter(|slot| slot.eaten).count()
    }
}

/// The last `days` calendar days ending at `today`, oldest first.
pub fn recent_day_keys(today: DayKey, days: u32) -> Vec<DayKey> {
    (0..days).rev().map(|offset| today.days_before(offset)).collect()
}

/// Builds one `DaySummary` per day of `recent_day_keys(today, days)`.
pub fn summarize_days(recent: &RecentEntries, today: DayKey, days: u32) -> Vec<DaySummary> {
    recent_day_keys(today, days)
        .into_iter()
        .map(|date| summarize_day(recent, date))
        .collect()
}

/// Convenience over `JournalStore::recent_entries` + `summarize_days`.
pub fn summarize_store<S: KeyValueStore>(
    store: &JournalStore<S>,
    today: DayKey,
    days: u32,
) -> Vec<DaySummary> {
    let recent = store.recent_entries(today, days);
    summarize_days(&recent, today, days)
}

fn summarize_day(recent: &RecentEntries, date: DayKey) -> DaySummary {
    let sleep = recent.sleep_on(date);
    let mut meals = MealType::ALL.map(|meal_type| MealSlot {
        meal_type,
        eaten: false,
    });
    for entry in recent.meals_on(date) {
        meals[entry.meal_type.slot_index()].eaten = entry.eaten;
    }

    DaySummary {
        date,
        sleep_quality: sleep.and_then(|entry| entry.sleep_quality),
        room_temperature: sleep.map(|entry| entry.room_temperature),
        exercise_completed: recent.exercise_on(date).is_some_and(|entry| entry.completed),
        meals,
    }
}

#[cfg(test)]
mod tests {
    use super::recent_day_keys;
    use crate::model::day::DayKey;

    #[test]
    fn recent_day_keys_are_oldest_first_and_end_today() {
        let today = DayKey::parse("2024-05-02").unwrap();
        let keys = recent_day_keys(today, 3)
            .into_iter()
            .map(|day| day.to_string())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["2024-04-30", "2024-05-01", "2024-05-02"]);
        assert!(recent_day_keys(today, 0).is_empty());
    }
}
