//! Session-wide journal state and its persistence orchestration.
//!
//! # Responsibility
//! - Own the sleep/meal/exercise collections and the settings singleton.
//! - Decide when state is written to the key-value adapter.
//! - Recover locally from storage and parse failures.
//!
//! # Invariants
//! - Natural keys are unique per collection after every operation.
//! - Store operations never surface storage errors to callers; the in-memory
//!   state stays the source of truth for the session.

use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod journal_store;

pub use journal_store::{FlushBatch, JournalStore, RecentEntries, TodayEntries};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure observed while loading or flushing journal state.
///
/// Mutations and `load` recover from these internally; only `flush` returns
/// them to the caller.
#[derive(Debug)]
pub enum StoreError {
    /// Adapter failed. `key` is `None` for multi-key flushes.
    StorageUnavailable {
        key: Option<&'static str>,
        source: StorageError,
    },
    /// Persisted blob did not decode into the expected shape.
    MalformedRecord {
        key: &'static str,
        source: serde_json::Error,
    },
    /// In-memory state could not be encoded.
    Serialize {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageUnavailable {
                key: Some(key),
                source,
            } => write!(f, "storage unavailable for `{key}`: {source}"),
            Self::StorageUnavailable { key: None, source } => {
                write!(f, "storage unavailable: {source}")
            }
            Self::MalformedRecord { key, source } => {
                write!(f, "malformed record under `{key}`: {source}")
            }
            Self::Serialize { key, source } => write!(f, "failed to encode `{key}`: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageUnavailable { source, .. } => Some(source),
            Self::MalformedRecord { source, .. } | Self::Serialize { source, .. } => Some(source),
        }
    }
}

/// Outcome of loading one persisted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLoadStatus {
    /// Blob decoded; `records` entries kept after duplicate collapse.
    Loaded { records: usize },
    /// Key never written; default used.
    Missing,
    /// Blob failed to decode; default used.
    Malformed,
    /// Adapter failed; default used.
    Unavailable,
}

impl KeyLoadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loaded { .. } => "loaded",
            Self::Missing => "missing",
            Self::Malformed => "malformed",
            Self::Unavailable => "unavailable",
        }
    }

    /// `true` when the default was used because of a failure.
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Malformed | Self::Unavailable)
    }
}

/// Per-key result of `JournalStore::load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub sleep_entries: KeyLoadStatus,
    pub meal_entries: KeyLoadStatus,
    pub exercise_entries: KeyLoadStatus,
    pub user_settings: KeyLoadStatus,
    /// Whether the post-load self-heal flush succeeded.
    pub flushed: bool,
}

impl LoadReport {
    /// `(key, status)` pairs in persisted-key order.
    pub fn statuses(&self) -> [(&'static str, KeyLoadStatus); 4] {
        [
            (crate::storage::SLEEP_ENTRIES_KEY, self.sleep_entries),
            (crate::storage::MEAL_ENTRIES_KEY, self.meal_entries),
            (crate::storage::EXERCISE_ENTRIES_KEY, self.exercise_entries),
            (crate::storage::USER_SETTINGS_KEY, self.user_settings),
        ]
    }

    /// Keys that fell back to defaults because of a failure.
    pub fn degraded_keys(&self) -> Vec<&'static str> {
        self.statuses()
            .into_iter()
            .filter(|(_, status)| status.is_degraded())
            .map(|(key, _)| key)
            .collect()
    }
}
