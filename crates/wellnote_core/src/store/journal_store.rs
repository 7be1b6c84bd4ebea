//! Journal store: upsert-by-natural-key collections with write-through flush.
//!
//! # Responsibility
//! - Hold the four journal collections for the session.
//! - Provide today-scoped and range-scoped read projections.
//! - Re-serialize and write all persisted keys after every mutation.
//!
//! # Invariants
//! - Upsert removes any entry with the same natural key, then appends.
//! - Reads never mutate state and never touch storage.
//! - A failed flush is logged and swallowed; nothing is rolled back.
//! - Every mutation bumps the state revision, including deferred ones.

use super::{KeyLoadStatus, LoadReport, StoreError, StoreResult};
use crate::model::day::DayKey;
use crate::model::entry::{ExerciseEntry, MealEntry, MealType, SleepEntry};
use crate::model::settings::{UserSettings, UserSettingsPatch};
use crate::storage::{
    KeyValueStore, EXERCISE_ENTRIES_KEY, MEAL_ENTRIES_KEY, SLEEP_ENTRIES_KEY, USER_SETTINGS_KEY,
};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

/// Entries recorded for a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodayEntries {
    pub sleep: Option<SleepEntry>,
    pub meals: Vec<MealEntry>,
    pub exercise: Option<ExerciseEntry>,
}

impl TodayEntries {
    /// Returns the entry for one meal slot, if recorded.
    pub fn meal(&self, meal_type: MealType) -> Option<&MealEntry> {
        self.meals.iter().find(|entry| entry.meal_type == meal_type)
    }
}

/// Entries on or after a cutoff day, in collection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentEntries {
    pub sleep: Vec<SleepEntry>,
    pub meals: Vec<MealEntry>,
    pub exercise: Vec<ExerciseEntry>,
}

impl RecentEntries {
    pub fn sleep_on(&self, day: DayKey) -> Option<&SleepEntry> {
        self.sleep.iter().find(|entry| entry.date == day)
    }

    pub fn exercise_on(&self, day: DayKey) -> Option<&ExerciseEntry> {
        self.exercise.iter().find(|entry| entry.date == day)
    }

    pub fn meals_on(&self, day: DayKey) -> impl Iterator<Item = &MealEntry> {
        self.meals.iter().filter(move |entry| entry.date == day)
    }
}

/// Encoded blobs for every journal key, captured at one state revision.
///
/// Produced under the store's borrow and written later, so a caller holding
/// the store behind a lock can release it before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushBatch {
    revision: u64,
    blobs: Vec<(&'static str, String)>,
}

impl FlushBatch {
    /// Store revision this batch reflects. Higher is newer.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.blobs.iter().map(|(key, _)| *key)
    }

    /// Writes every blob through `storage.set_many`.
    ///
    /// # Errors
    /// - `StoreError::StorageUnavailable` if the adapter rejects the write.
    pub fn write_to<K: KeyValueStore + ?Sized>(&self, storage: &K) -> StoreResult<()> {
        storage
            .set_many(&self.blobs)
            .map_err(|source| StoreError::StorageUnavailable { key: None, source })
    }
}

/// Authoritative in-memory journal state for one session.
///
/// Created once at startup and handed to consumers by reference. The store
/// exclusively owns its collections; callers only ever receive copies.
pub struct JournalStore<S: KeyValueStore> {
    storage: S,
    sleep_entries: Vec<SleepEntry>,
    meal_entries: Vec<MealEntry>,
    exercise_entries: Vec<ExerciseEntry>,
    user_settings: UserSettings,
    loaded: bool,
    flushes_deferred: bool,
    revision: u64,
}

impl<S: KeyValueStore> JournalStore<S> {
    /// Creates an unloaded store with empty collections and default settings.
    ///
    /// Mutations made before `load` stay in memory only and are replaced by
    /// whatever `load` reads. Use `open` unless that ordering is intended.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            sleep_entries: Vec::new(),
            meal_entries: Vec::new(),
            exercise_entries: Vec::new(),
            user_settings: UserSettings::default(),
            loaded: false,
            flushes_deferred: false,
            revision: 0,
        }
    }

    /// Creates a store and loads persisted state before returning it.
    pub fn open(storage: S) -> (Self, LoadReport) {
        let mut store = Self::new(storage);
        let report = store.load();
        (store, report)
    }

    /// Replaces in-memory state with what the adapter holds, then flushes.
    ///
    /// Never fails: a key that is absent, unreadable or malformed falls back
    /// to an empty collection (or default settings). Persisted duplicates of
    /// a natural key collapse to the last occurrence.
    ///
    /// The store counts as loaded afterwards even when keys were degraded.
    /// If a key was `Unavailable` and storage recovers later, the next
    /// successful flush replaces that key's stored history with the in-memory
    /// (default) value. The loss is silent apart from the `LoadReport` and a
    /// `warn` log line; check `LoadReport::degraded_keys` to detect it.
    pub fn load(&mut self) -> LoadReport {
        let started_at = Instant::now();

        let (sleep, sleep_status) =
            self.load_collection(SLEEP_ENTRIES_KEY, |entry: &SleepEntry| entry.date);
        let (meals, meal_status) = self.load_collection(MEAL_ENTRIES_KEY, MealEntry::key);
        let (exercise, exercise_status) =
            self.load_collection(EXERCISE_ENTRIES_KEY, |entry: &ExerciseEntry| entry.date);
        let (settings, settings_status) =
            match recover(USER_SETTINGS_KEY, self.read_key::<UserSettings>(USER_SETTINGS_KEY)) {
                Ok(settings) => (settings, KeyLoadStatus::Loaded { records: 1 }),
                Err(status) => (UserSettings::default(), status),
            };

        self.sleep_entries = sleep;
        self.meal_entries = meals;
        self.exercise_entries = exercise;
        self.user_settings = settings;
        self.loaded = true;

        let flushed = self.persist("load");
        let report = LoadReport {
            sleep_entries: sleep_status,
            meal_entries: meal_status,
            exercise_entries: exercise_status,
            user_settings: settings_status,
            flushed,
        };

        info!(
            "event=store_load module=store status={} degraded_keys={} flushed={} duration_ms={}",
            if report.degraded_keys().is_empty() {
                "ok"
            } else {
                "degraded"
            },
            report.degraded_keys().len(),
            flushed,
            started_at.elapsed().as_millis()
        );
        report
    }

    /// Inserts or replaces the sleep entry for `entry.date`.
    pub fn add_sleep_entry(&mut self, entry: SleepEntry) {
        let replaced = upsert_by(&mut self.sleep_entries, entry, |item| item.date);
        debug!("event=entry_upsert module=store kind=sleep replaced={replaced}");
        self.persist("add_sleep_entry");
    }

    /// Inserts or replaces the meal entry for `(entry.date, entry.meal_type)`.
    pub fn add_meal_entry(&mut self, entry: MealEntry) {
        let replaced = upsert_by(&mut self.meal_entries, entry, MealEntry::key);
        debug!("event=entry_upsert module=store kind=meal replaced={replaced}");
        self.persist("add_meal_entry");
    }

    /// Inserts or replaces the exercise entry for `entry.date`.
    pub fn add_exercise_entry(&mut self, entry: ExerciseEntry) {
        let replaced = upsert_by(&mut self.exercise_entries, entry, |item| item.date);
        debug!("event=entry_upsert module=store kind=exercise replaced={replaced}");
        self.persist("add_exercise_entry");
    }

    /// Shallow-merges `patch` into the current settings.
    pub fn update_user_settings(&mut self, patch: &UserSettingsPatch) {
        self.user_settings = self.user_settings.merged(patch);
        debug!(
            "event=settings_update module=store notifications_enabled={}",
            self.user_settings.notifications_enabled
        );
        self.persist("update_user_settings");
    }

    /// Entries recorded on `today`.
    pub fn today_entries(&self, today: DayKey) -> TodayEntries {
        TodayEntries {
            sleep: self
                .sleep_entries
                .iter()
                .find(|entry| entry.date == today)
                .cloned(),
            meals: self
                .meal_entries
                .iter()
                .filter(|entry| entry.date == today)
                .cloned()
                .collect(),
            exercise: self
                .exercise_entries
                .iter()
                .find(|entry| entry.date == today)
                .cloned(),
        }
    }

    /// `today_entries` for the device's local calendar day.
    pub fn today_entries_now(&self) -> TodayEntries {
        self.today_entries(DayKey::today_local())
    }

    /// Entries dated on or after `today - days`.
    ///
    /// Both the cutoff day and `today` are included. Entries dated after
    /// `today` are kept as well.
    pub fn recent_entries(&self, today: DayKey, days: u32) -> RecentEntries {
        let cutoff = today.days_before(days);
        RecentEntries {
            sleep: on_or_after(&self.sleep_entries, cutoff, |entry| entry.date),
            meals: on_or_after(&self.meal_entries, cutoff, |entry| entry.date),
            exercise: on_or_after(&self.exercise_entries, cutoff, |entry| entry.date),
        }
    }

    /// `recent_entries` relative to the device's local calendar day.
    pub fn recent_entries_now(&self, days: u32) -> RecentEntries {
        self.recent_entries(DayKey::today_local(), days)
    }

    pub fn sleep_entries(&self) -> &[SleepEntry] {
        &self.sleep_entries
    }

    pub fn meal_entries(&self) -> &[MealEntry] {
        &self.meal_entries
    }

    pub fn exercise_entries(&self) -> &[ExerciseEntry] {
        &self.exercise_entries
    }

    pub fn user_settings(&self) -> &UserSettings {
        &self.user_settings
    }

    /// Read-only copy of the settings for the notification scheduler.
    pub fn settings_snapshot(&self) -> UserSettings {
        self.user_settings
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Writes all four persisted keys.
    ///
    /// # Errors
    /// - `StoreError::Serialize` if a collection cannot be encoded.
    /// - `StoreError::StorageUnavailable` if the adapter rejects the write.
    pub fn flush(&self) -> StoreResult<()> {
        self.flush_batch()?.write_to(&self.storage)
    }

    /// Encodes all four persisted keys without writing them.
    ///
    /// # Errors
    /// - `StoreError::Serialize` if a collection cannot be encoded.
    pub fn flush_batch(&self) -> StoreResult<FlushBatch> {
        Ok(FlushBatch {
            revision: self.revision,
            blobs: vec![
                (SLEEP_ENTRIES_KEY, encode(SLEEP_ENTRIES_KEY, &self.sleep_entries)?),
                (MEAL_ENTRIES_KEY, encode(MEAL_ENTRIES_KEY, &self.meal_entries)?),
                (
                    EXERCISE_ENTRIES_KEY,
                    encode(EXERCISE_ENTRIES_KEY, &self.exercise_entries)?,
                ),
                (USER_SETTINGS_KEY, encode(USER_SETTINGS_KEY, &self.user_settings)?),
            ],
        })
    }

    /// Stops mutations from writing; the caller writes `flush_batch` itself.
    pub fn defer_flushes(&mut self) {
        self.flushes_deferred = true;
    }

    pub fn flushes_deferred(&self) -> bool {
        self.flushes_deferred
    }

    /// Number of state changes so far (load and every mutation).
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `load` has completed at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn persist(&mut self, trigger: &'static str) -> bool {
        self.revision += 1;
        if !self.loaded {
            // Flushing pre-load defaults would clobber persisted state.
            debug!("event=store_flush module=store status=deferred trigger={trigger}");
            return false;
        }
        if self.flushes_deferred {
            debug!(
                "event=store_flush module=store status=staged trigger={trigger} revision={}",
                self.revision
            );
            return false;
        }
        match self.flush() {
            Ok(()) => {
                debug!("event=store_flush module=store status=ok trigger={trigger}");
                true
            }
            Err(err) => {
                warn!("event=store_flush module=store status=error trigger={trigger} error={err}");
                false
            }
        }
    }

    fn read_key<T: DeserializeOwned>(&self, key: &'static str) -> StoreResult<Option<T>> {
        let blob = self
            .storage
            .get(key)
            .map_err(|source| StoreError::StorageUnavailable {
                key: Some(key),
                source,
            })?;
        blob.map(|raw| {
            serde_json::from_str(raw.as_str())
                .map_err(|source| StoreError::MalformedRecord { key, source })
        })
        .transpose()
    }

    fn load_collection<T, K>(
        &self,
        key: &'static str,
        natural_key: impl Fn(&T) -> K,
    ) -> (Vec<T>, KeyLoadStatus)
    where
        T: DeserializeOwned,
        K: PartialEq,
    {
        let persisted = match recover(key, self.read_key::<Vec<T>>(key)) {
            Ok(entries) => entries,
            Err(status) => return (Vec::new(), status),
        };

        let persisted_len = persisted.len();
        let mut entries = Vec::with_capacity(persisted_len);
        for entry in persisted {
            upsert_by(&mut entries, entry, &natural_key);
        }
        if entries.len() != persisted_len {
            warn!(
                "event=store_load module=store status=dedup key={} collapsed={}",
                key,
                persisted_len - entries.len()
            );
        }

        let records = entries.len();
        (entries, KeyLoadStatus::Loaded { records })
    }
}

/// Maps a key read to its value or to the status explaining the fallback.
fn recover<T>(key: &'static str, result: StoreResult<Option<T>>) -> Result<T, KeyLoadStatus> {
    match result {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            debug!("event=store_load module=store status=missing key={key}");
            Err(KeyLoadStatus::Missing)
        }
        Err(err @ StoreError::MalformedRecord { .. }) => {
            warn!("event=store_load module=store status=malformed key={key} error={err}");
            Err(KeyLoadStatus::Malformed)
        }
        Err(err) => {
            warn!("event=store_load module=store status=unavailable key={key} error={err}");
            Err(KeyLoadStatus::Unavailable)
        }
    }
}

/// Filter-then-append upsert. Returns whether an existing entry was replaced.
fn upsert_by<T, K: PartialEq>(entries: &mut Vec<T>, entry: T, natural_key: impl Fn(&T) -> K) -> bool {
    let key = natural_key(&entry);
    let before = entries.len();
    entries.retain(|existing| natural_key(existing) != key);
    let replaced = entries.len() != before;
    entries.push(entry);
    replaced
}

fn on_or_after<T: Clone>(entries: &[T], cutoff: DayKey, date: impl Fn(&T) -> DayKey) -> Vec<T> {
    entries
        .iter()
        .filter(|entry| date(*entry) >= cutoff)
        .cloned()
        .collect()
}

fn encode<T: Serialize + ?Sized>(key: &'static str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Serialize { key, source })
}
