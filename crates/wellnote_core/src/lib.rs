//! Core of the WellNote wellness journal.
//!
//! Owns the journal domain model, the session-wide journal store and its
//! on-device persistence. UI shells reach it through `wellnote_ffi`.

pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod summary;

pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::day::{DayKey, ParseError};
pub use model::entry::{
    ExerciseEntry, MealEntry, MealType, SleepEntry, SleepQuality, DEFAULT_ROOM_TEMPERATURE_F,
    ROOM_TEMPERATURE_RANGE_F,
};
pub use model::settings::{ClockTime, UserSettings, UserSettingsPatch};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use store::{
    FlushBatch, JournalStore, KeyLoadStatus, LoadReport, RecentEntries, StoreError, StoreResult,
    TodayEntries,
};
pub use summary::{recent_day_keys, summarize_days, summarize_store, DaySummary, MealSlot, SUMMARY_DAYS};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
