//! FFI use-case API for the Flutter journal shell.
//!
//! # Responsibility
//! - Expose journal store operations to Dart via FRB.
//! - Own the session's `JournalHandle` composition (storage choice, load).
//! - Translate between string-typed DTOs and validated core types.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Invalid dates, times and enum strings are rejected here, before the store.
//! - Storage failures never surface as errors; they degrade to memory-only.
//! - The store lock is never held across a storage write, so sync reads
//!   never wait on a flush.

use log::{debug, warn};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use wellnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    summarize_store, ClockTime, DaySummary, DayKey, ExerciseEntry, FlushBatch, JournalStore,
    KeyValueStore,
    LoadReport, MealEntry, MealType, MemoryKeyValueStore, SleepEntry, SleepQuality,
    SqliteKeyValueStore, UserSettings, UserSettingsPatch, SUMMARY_DAYS,
};

const JOURNAL_DB_FILE_NAME: &str = "wellnote_journal.sqlite3";
const JOURNAL_DB_PATH_ENV: &str = "WELLNOTE_DB_PATH";
const RECENT_DAYS_MAX: u32 = 366;

type SessionStorage = Arc<Mutex<Box<dyn KeyValueStore + Send>>>;
type SessionStore = JournalStore<SessionStorage>;

/// Session handle owning the journal store for the app lifetime.
///
/// Created once by `journal_open` and passed to every other journal call.
#[flutter_rust_bridge::frb(opaque)]
pub struct JournalHandle {
    store: Mutex<SessionStore>,
    storage: SessionStorage,
    /// Newest store revision known to be on disk; held while writing.
    written_revision: Mutex<u64>,
    backend: &'static str,
    load_report: LoadReport,
}

/// Storage and load diagnostics for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStatus {
    /// `sqlite` for the on-device file, `memory` after a degraded open.
    pub backend: String,
    /// Persisted keys that fell back to defaults during load.
    pub degraded_keys: Vec<String>,
    /// Whether the post-load flush reached storage.
    pub flushed_after_load: bool,
}

/// Sleep entry wire shape. `sleep_quality` is `great|tired|sleepy` or null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SleepEntryDto {
    pub date: String,
    pub sleep_quality: Option<String>,
    pub room_temperature: i32,
    pub thoughts: String,
}

/// Meal entry wire shape. `meal_type` uses the persisted camelCase names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealEntryDto {
    pub date: String,
    pub meal_type: String,
    pub eaten: bool,
    pub notes: String,
    pub image_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseEntryDto {
    pub date: String,
    pub completed: bool,
    pub notes: String,
}

/// Settings snapshot, also consumed by the notification scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSettingsDto {
    pub wake_up_time: String,
    pub bed_time: String,
    pub notifications_enabled: bool,
}

/// Partial settings update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettingsPatchDto {
    pub wake_up_time: Option<String>,
    pub bed_time: Option<String>,
    pub notifications_enabled: Option<bool>,
}

/// Generic action response envelope for journal writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalActionResponse {
    /// Whether the input was accepted.
    pub ok: bool,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl JournalActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Entries for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodayEntriesResponse {
    pub ok: bool,
    pub message: String,
    /// The day the entries belong to (`YYYY-MM-DD`).
    pub date: String,
    pub sleep: Option<SleepEntryDto>,
    pub meals: Vec<MealEntryDto>,
    pub exercise: Option<ExerciseEntryDto>,
}

/// Entries on or after `today - applied_days`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntriesResponse {
    pub ok: bool,
    pub message: String,
    /// Effective window after normalization.
    pub applied_days: u32,
    pub sleep: Vec<SleepEntryDto>,
    pub meals: Vec<MealEntryDto>,
    pub exercise: Vec<ExerciseEntryDto>,
}

/// One summary column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummaryDto {
    pub date: String,
    pub sleep_quality: Option<String>,
    pub room_temperature: Option<i32>,
    pub exercise_completed: bool,
    /// Eaten flags for breakfast, morning snack, lunch, afternoon snack, dinner.
    pub meals_eaten: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    pub ok: bool,
    pub message: String,
    /// Oldest day first.
    pub days: Vec<DaySummaryDto>,
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Opens the journal session and loads persisted state.
///
/// Path resolution: `db_path` argument, then `WELLNOTE_DB_PATH`, then the
/// platform temp directory.
///
/// # FFI contract
/// - Async call (runs off the UI isolate); performs file I/O.
/// - Never fails: an unopenable database degrades to an in-memory session.
pub fn journal_open(db_path: Option<String>) -> JournalHandle {
    let path = resolve_journal_db_path(db_path);
    let (storage, backend): (Box<dyn KeyValueStore + Send>, &'static str) =
        match SqliteKeyValueStore::open(&path) {
            Ok(storage) => (Box::new(storage), "sqlite"),
            Err(err) => {
                warn!(
                    "event=journal_open module=ffi status=degraded backend=memory error={}",
                    err
                );
                (Box::new(MemoryKeyValueStore::new()), "memory")
            }
        };

    let storage: SessionStorage = Arc::new(Mutex::new(storage));
    let (mut store, load_report) = JournalStore::open(Arc::clone(&storage));
    store.defer_flushes();
    let written_revision = Mutex::new(store.revision());
    JournalHandle {
        store: Mutex::new(store),
        storage,
        written_revision,
        backend,
        load_report,
    }
}

/// Returns storage backend and load diagnostics.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_status(handle: &JournalHandle) -> JournalStatus {
    JournalStatus {
        backend: handle.backend.to_string(),
        degraded_keys: handle
            .load_report
            .degraded_keys()
            .into_iter()
            .map(str::to_string)
            .collect(),
        flushed_after_load: handle.load_report.flushed,
    }
}

/// Records (or replaces) the sleep entry for `entry.date`.
///
/// # FFI contract
/// - Async call; writes all journal keys.
/// - Rejects malformed date or unknown quality without touching state.
pub fn journal_add_sleep_entry(handle: &JournalHandle, entry: SleepEntryDto) -> JournalActionResponse {
    match sleep_from_dto(entry) {
        Ok(entry) => {
            apply_mutation(handle, "add_sleep_entry", |store| store.add_sleep_entry(entry));
            JournalActionResponse::success("Sleep entry saved.")
        }
        Err(err) => JournalActionResponse::failure(format!("journal_add_sleep_entry failed: {err}")),
    }
}

/// Records (or replaces) the meal entry for `(entry.date, entry.meal_type)`.
pub fn journal_add_meal_entry(handle: &JournalHandle, entry: MealEntryDto) -> JournalActionResponse {
    match meal_from_dto(entry) {
        Ok(entry) => {
            apply_mutation(handle, "add_meal_entry", |store| store.add_meal_entry(entry));
            JournalActionResponse::success("Meal entry saved.")
        }
        Err(err) => JournalActionResponse::failure(format!("journal_add_meal_entry failed: {err}")),
    }
}

/// Records (or replaces) the exercise entry for `entry.date`.
pub fn journal_add_exercise_entry(
    handle: &JournalHandle,
    entry: ExerciseEntryDto,
) -> JournalActionResponse {
    match exercise_from_dto(entry) {
        Ok(entry) => {
            apply_mutation(handle, "add_exercise_entry", |store| store.add_exercise_entry(entry));
            JournalActionResponse::success("Exercise entry saved.")
        }
        Err(err) => {
            JournalActionResponse::failure(format!("journal_add_exercise_entry failed: {err}"))
        }
    }
}

/// Merges the provided settings fields; absent fields are kept.
///
/// Rescheduling reminders after a change is the caller's job.
pub fn journal_update_user_settings(
    handle: &JournalHandle,
    patch: UserSettingsPatchDto,
) -> JournalActionResponse {
    match patch_from_dto(patch) {
        Ok(patch) => {
            apply_mutation(handle, "update_user_settings", |store| {
                store.update_user_settings(&patch)
            });
            JournalActionResponse::success("Settings updated.")
        }
        Err(err) => {
            JournalActionResponse::failure(format!("journal_update_user_settings failed: {err}"))
        }
    }
}

/// Current settings snapshot (e.g. for scheduling reminders at startup).
#[flutter_rust_bridge::frb(sync)]
pub fn journal_user_settings(handle: &JournalHandle) -> UserSettingsDto {
    settings_to_dto(lock_store(handle).settings_snapshot())
}

/// Entries for `today` (`YYYY-MM-DD`), or for the device's local day when
/// `today` is `None` or blank.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_today_entries(handle: &JournalHandle, today: Option<String>) -> TodayEntriesResponse {
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => {
            return TodayEntriesResponse {
                ok: false,
                message: format!("journal_today_entries failed: {err}"),
                date: String::new(),
                sleep: None,
                meals: Vec::new(),
                exercise: None,
            };
        }
    };

    let entries = lock_store(handle).today_entries(today);
    TodayEntriesResponse {
        ok: true,
        message: format!("Loaded {} meal(s) for {today}.", entries.meals.len()),
        date: today.to_string(),
        sleep: entries.sleep.map(sleep_to_dto),
        meals: entries.meals.into_iter().map(meal_to_dto).collect(),
        exercise: entries.exercise.map(exercise_to_dto),
    }
}

/// Entries dated on or after `today - days`.
///
/// `days = None` uses the summary window. `Some(0)` keeps today and later
/// entries only. Values above one year are capped.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_recent_entries(
    handle: &JournalHandle,
    days: Option<u32>,
    today: Option<String>,
) -> RecentEntriesResponse {
    let applied_days = normalize_recent_days(days);
    let today = match resolve_today(today) {
        Ok(today) => today,
        Err(err) => {
            return RecentEntriesResponse {
                ok: false,
                message: format!("journal_recent_entries failed: {err}"),
                applied_days,
                sleep: Vec::new(),
                meals: Vec::new(),
                exercise: Vec::new(),
            };
        }
    };

    let recent = lock_store(handle).recent_entries(today, applied_days);
    RecentEntriesResponse {
        ok: true,
        message: format!(
            "Loaded {} sleep, {} meal and {} exercise entries.",
            recent.sleep.len(),
            recent.meals.len(),
            recent.exercise.len()
        ),
        applied_days,
        sleep: recent.sleep.into_iter().map(sleep_to_dto).collect(),
        meals: recent.meals.into_iter().map(meal_to_dto).collect(),
        exercise: recent.exercise.into_iter().map(exercise_to_dto).collect(),
    }
}

/// One summary column per day for the last `days` days ending at `today`.
#[flutter_rust_bridge::frb(sync)]
pub fn journal_summary(
    handle: &JournalHandle,
    days: Option<u32>,
    today: Option<String>,
) -> SummaryResponse {
    let days = match normalize_recent_days(days) {
        0 => SUMMARY_DAYS,
        value => value,
    };
    match resolve_today(today) {
        Ok(today) => {
            let store = lock_store(handle);
            let columns = summarize_store(&*store, today, days);
            SummaryResponse {
                ok: true,
                message: format!("Summarized {} day(s).", columns.len()),
                days: columns.into_iter().map(summary_to_dto).collect(),
            }
        }
        Err(err) => SummaryResponse {
            ok: false,
            message: format!("journal_summary failed: {err}"),
            days: Vec::new(),
        },
    }
}

/// Mutates under the store lock, then writes the resulting batch after the
/// lock is released.
fn apply_mutation(
    handle: &JournalHandle,
    trigger: &'static str,
    mutate: impl FnOnce(&mut SessionStore),
) {
    let batch = {
        let mut store = lock_store(handle);
        mutate(&mut store);
        store.flush_batch()
    };
    match batch {
        Ok(batch) => write_batch(handle, trigger, &batch),
        Err(err) => {
            warn!("event=journal_flush module=ffi status=error trigger={trigger} error={err}")
        }
    }
}

/// Writes `batch` unless a newer revision already reached storage.
fn write_batch(handle: &JournalHandle, trigger: &'static str, batch: &FlushBatch) {
    let mut written = handle
        .written_revision
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if batch.revision() <= *written {
        debug!(
            "event=journal_flush module=ffi status=superseded trigger={trigger} revision={}",
            batch.revision()
        );
        return;
    }
    match batch.write_to(&handle.storage) {
        Ok(()) => {
            *written = batch.revision();
            debug!(
                "event=journal_flush module=ffi status=ok trigger={trigger} revision={}",
                batch.revision()
            );
        }
        Err(err) => warn!(
            "event=journal_flush module=ffi status=error trigger={trigger} revision={} error={err}",
            batch.revision()
        ),
    }
}

fn lock_store(handle: &JournalHandle) -> MutexGuard<'_, SessionStore> {
    handle.store.lock().unwrap_or_else(|poisoned| {
        warn!("event=journal_lock module=ffi status=recovered reason=poisoned");
        poisoned.into_inner()
    })
}

fn resolve_journal_db_path(explicit: Option<String>) -> PathBuf {
    let configured = explicit
        .or_else(|| std::env::var(JOURNAL_DB_PATH_ENV).ok())
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
    match configured {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join(JOURNAL_DB_FILE_NAME),
    }
}

fn resolve_today(today: Option<String>) -> Result<DayKey, String> {
    match today.as_deref().map(str::trim) {
        None | Some("") => Ok(DayKey::today_local()),
        Some(raw) => DayKey::parse(raw).map_err(|err| err.to_string()),
    }
}

fn normalize_recent_days(days: Option<u32>) -> u32 {
    match days {
        None => SUMMARY_DAYS,
        Some(value) if value > RECENT_DAYS_MAX => RECENT_DAYS_MAX,
        Some(value) => value,
    }
}

fn parse_optional<T: FromStr>(raw: Option<String>) -> Result<Option<T>, T::Err> {
    raw.map(|value| value.trim().parse::<T>()).transpose()
}

fn sleep_from_dto(dto: SleepEntryDto) -> Result<SleepEntry, String> {
    Ok(SleepEntry {
        date: DayKey::parse(dto.date.trim()).map_err(|err| err.to_string())?,
        sleep_quality: parse_optional::<SleepQuality>(dto.sleep_quality)
            .map_err(|err| err.to_string())?,
        room_temperature: dto.room_temperature,
        thoughts: dto.thoughts,
    })
}

fn meal_from_dto(dto: MealEntryDto) -> Result<MealEntry, String> {
    Ok(MealEntry {
        date: DayKey::parse(dto.date.trim()).map_err(|err| err.to_string())?,
        meal_type: dto
            .meal_type
            .trim()
            .parse::<MealType>()
            .map_err(|err| err.to_string())?,
        eaten: dto.eaten,
        notes: dto.notes,
        image_uri: dto.image_uri.filter(|uri| !uri.trim().is_empty()),
    })
}

fn exercise_from_dto(dto: ExerciseEntryDto) -> Result<ExerciseEntry, String> {
    Ok(ExerciseEntry {
        date: DayKey::parse(dto.date.trim()).map_err(|err| err.to_string())?,
        completed: dto.completed,
        notes: dto.notes,
    })
}

fn patch_from_dto(dto: UserSettingsPatchDto) -> Result<UserSettingsPatch, String> {
    Ok(UserSettingsPatch {
        wake_up_time: parse_optional::<ClockTime>(dto.wake_up_time).map_err(|err| err.to_string())?,
        bed_time: parse_optional::<ClockTime>(dto.bed_time).map_err(|err| err.to_string())?,
        notifications_enabled: dto.notifications_enabled,
    })
}

fn sleep_to_dto(entry: SleepEntry) -> SleepEntryDto {
    SleepEntryDto {
        date: entry.date.to_string(),
        sleep_quality: entry.sleep_quality.map(|quality| quality.as_str().to_string()),
        room_temperature: entry.room_temperature,
        thoughts: entry.thoughts,
    }
}

fn meal_to_dto(entry: MealEntry) -> MealEntryDto {
    MealEntryDto {
        date: entry.date.to_string(),
        meal_type: entry.meal_type.as_str().to_string(),
        eaten: entry.eaten,
        notes: entry.notes,
        image_uri: entry.image_uri,
    }
}

fn exercise_to_dto(entry: ExerciseEntry) -> ExerciseEntryDto {
    ExerciseEntryDto {
        date: entry.date.to_string(),
        completed: entry.completed,
        notes: entry.notes,
    }
}

fn settings_to_dto(settings: UserSettings) -> UserSettingsDto {
    UserSettingsDto {
        wake_up_time: settings.wake_up_time.to_string(),
        bed_time: settings.bed_time.to_string(),
        notifications_enabled: settings.notifications_enabled,
    }
}

fn summary_to_dto(day: DaySummary) -> DaySummaryDto {
    DaySummaryDto {
        date: day.date.to_string(),
        sleep_quality: day.sleep_quality.map(|quality| quality.as_str().to_string()),
        room_temperature: day.room_temperature,
        exercise_completed: day.exercise_completed,
        meals_eaten: day.meals.iter().map(|slot| slot.eaten).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, journal_add_exercise_entry, journal_add_meal_entry,
        journal_add_sleep_entry, journal_open, journal_recent_entries, journal_status,
        journal_summary, journal_today_entries, journal_update_user_settings,
        journal_user_settings, normalize_recent_days, ping, ExerciseEntryDto, JournalHandle,
        MealEntryDto, SleepEntryDto, UserSettingsPatchDto,
    };
    use std::time::{Duration, Instant};

    fn open_temp_journal(dir: &tempfile::TempDir) -> JournalHandle {
        let path = dir.path().join("journal.sqlite3");
        journal_open(Some(path.to_string_lossy().into_owned()))
    }

    fn sleep_dto(date: &str, quality: Option<&str>) -> SleepEntryDto {
        SleepEntryDto {
            date: date.to_string(),
            sleep_quality: quality.map(str::to_string),
            room_temperature: 70,
            thoughts: String::new(),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn journal_open_uses_sqlite_and_reports_clean_load() {
        let dir = tempfile::tempdir().unwrap();
        let handle = open_temp_journal(&dir);

        let status = journal_status(&handle);
        assert_eq!(status.backend, "sqlite");
        assert!(status.degraded_keys.is_empty());
        assert!(status.flushed_after_load);
    }

    #[test]
    fn journal_open_degrades_to_memory_when_path_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("not-a-dir");
        std::fs::write(&blocked, b"file").unwrap();
        let path = blocked.join("journal.sqlite3");

        let handle = journal_open(Some(path.to_string_lossy().into_owned()));
        assert_eq!(journal_status(&handle).backend, "memory");

        let response = journal_add_sleep_entry(&handle, sleep_dto("2024-05-01", Some("great")));
        assert!(response.ok, "{}", response.message);
        let today = journal_today_entries(&handle, Some("2024-05-01".to_string()));
        assert_eq!(today.sleep.unwrap().sleep_quality.as_deref(), Some("great"));
    }

    #[test]
    fn sleep_entries_round_trip_through_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let handle = open_temp_journal(&dir);
            assert!(journal_add_sleep_entry(&handle, sleep_dto("2024-05-01", Some("tired"))).ok);
            assert!(journal_add_sleep_entry(&handle, sleep_dto("2024-05-01", None)).ok);
        }

        let handle = open_temp_journal(&dir);
        let today = journal_today_entries(&handle, Some("2024-05-01".to_string()));
        assert!(today.ok, "{}", today.message);
        let sleep = today.sleep.expect("sleep entry should survive reopen");
        assert_eq!(sleep.sleep_quality, None);
    }

    #[test]
    fn invalid_inputs_are_rejected_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let handle = open_temp_journal(&dir);

        let bad_date = journal_add_sleep_entry(&handle, sleep_dto("2024-5-1", Some("great")));
        assert!(!bad_date.ok);
        assert!(bad_date.message.contains("YYYY-MM-DD"));

        let bad_quality = journal_add_sleep_entry(&handle, sleep_dto("2024-05-01", Some("meh")));
        assert!(!bad_quality.ok);

        let bad_meal = journal_add_meal_entry(
            &handle,
            MealEntryDto {
                date: "2024-05-01".to_string(),
                meal_type: "brunch".to_string(),
                eaten: true,
                notes: String::new(),
                image_uri: None,
            },
        );
        assert!(!bad_meal.ok);

        let bad_time = journal_update_user_settings(
            &handle,
            UserSettingsPatchDto {
                bed_time: Some("25:00".to_string()),
                ..UserSettingsPatchDto::default()
            },
        );
        assert!(!bad_time.ok);
        assert_eq!(journal_user_settings(&handle).bed_time, "22:00");

        let recent = journal_recent_entries(&handle, Some(3650), Some("2024-05-01".to_string()));
        assert_eq!(recent.applied_days, 366);
        assert!(recent.sleep.is_empty());
        assert!(recent.meals.is_empty());
    }

    #[test]
    fn settings_patch_merges_fields() {
        let dir = tempfile::tempdir().unwrap();
        let handle = open_temp_journal(&dir);

        let response = journal_update_user_settings(
            &handle,
            UserSettingsPatchDto {
                bed_time: Some("23:00".to_string()),
                ..UserSettingsPatchDto::default()
            },
        );
        assert!(response.ok, "{}", response.message);

        let settings = journal_user_settings(&handle);
        assert_eq!(settings.wake_up_time, "06:00");
        assert_eq!(settings.bed_time, "23:00");
        assert!(settings.notifications_enabled);
    }

    #[test]
    fn summary_and_recent_entries_use_requested_today() {
        let dir = tempfile::tempdir().unwrap();
        let handle = open_temp_journal(&dir);
        assert!(journal_add_exercise_entry(
            &handle,
            ExerciseEntryDto {
                date: "2024-05-09".to_string(),
                completed: true,
                notes: String::new(),
            },
        )
        .ok);
        assert!(journal_add_meal_entry(
            &handle,
            MealEntryDto {
                date: "2024-05-10".to_string(),
                meal_type: "dinner".to_string(),
                eaten: true,
                notes: "pasta".to_string(),
                image_uri: Some(" ".to_string()),
            },
        )
        .ok);

        let recent = journal_recent_entries(&handle, Some(7), Some("2024-05-10".to_string()));
        assert_eq!(recent.exercise.len(), 1);
        assert_eq!(recent.meals[0].image_uri, None);

        let summary = journal_summary(&handle, None, Some("2024-05-10".to_string()));
        assert!(summary.ok, "{}", summary.message);
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[6].meals_eaten, vec![false, false, false, false, true]);
        assert!(summary.days[5].exercise_completed);

        let bad = journal_summary(&handle, None, Some("yesterday".to_string()));
        assert!(!bad.ok);
    }

    #[test]
    fn reads_do_not_wait_for_a_write_blocked_on_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.sqlite3");
        let handle = journal_open(Some(path.to_string_lossy().into_owned()));
        assert_eq!(journal_status(&handle).backend, "sqlite");

        let blocker = rusqlite::Connection::open(&path).unwrap();
        blocker.execute_batch("BEGIN IMMEDIATE").unwrap();

        std::thread::scope(|scope| {
            let writer = scope.spawn(|| {
                journal_add_sleep_entry(&handle, sleep_dto("2024-05-01", Some("great")))
            });
            std::thread::sleep(Duration::from_millis(200));

            let started = Instant::now();
            let settings = journal_user_settings(&handle);
            let today = journal_today_entries(&handle, Some("2024-05-01".to_string()));
            let elapsed = started.elapsed();

            blocker.execute_batch("COMMIT").unwrap();
            assert!(writer.join().unwrap().ok);
            assert!(elapsed < Duration::from_secs(1), "reads took {elapsed:?}");
            assert_eq!(settings.bed_time, "22:00");
            assert_eq!(
                today.sleep.unwrap().sleep_quality.as_deref(),
                Some("great")
            );
        });
        drop(handle);

        let reopened = journal_open(Some(path.to_string_lossy().into_owned()));
        let today = journal_today_entries(&reopened, Some("2024-05-01".to_string()));
        assert!(today.sleep.is_some());
    }

    #[test]
    fn normalize_recent_days_defaults_and_caps() {
        assert_eq!(normalize_recent_days(None), 7);
        assert_eq!(normalize_recent_days(Some(0)), 0);
        assert_eq!(normalize_recent_days(Some(30)), 30);
        assert_eq!(normalize_recent_days(Some(10_000)), 366);
    }
}
