//! Key-value persistence adapters for journal blobs.
//!
//! # Responsibility
//! - Define the `KeyValueStore` capability consumed by the journal store.
//! - Provide SQLite (on-device) and in-memory implementations.
//!
//! # Invariants
//! - Values are opaque UTF-8 blobs; adapters never inspect them.
//! - `set` replaces any previous value for the same key.
//! - SQLite schema version is tracked via `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

mod memory;
pub mod migrations;
mod open;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use open::{open_db, open_db_in_memory};
pub use sqlite::SqliteKeyValueStore;

/// Key holding the serialized sleep entry array.
pub const SLEEP_ENTRIES_KEY: &str = "sleepEntries";
/// Key holding the serialized meal entry array.
pub const MEAL_ENTRIES_KEY: &str = "mealEntries";
/// Key holding the serialized exercise entry array.
pub const EXERCISE_ENTRIES_KEY: &str = "exerciseEntries";
/// Key holding the serialized settings object.
pub const USER_SETTINGS_KEY: &str = "userSettings";

/// All keys owned by the journal, in flush order.
pub const JOURNAL_KEYS: [&str; 4] = [
    SLEEP_ENTRIES_KEY,
    MEAL_ENTRIES_KEY,
    EXERCISE_ENTRIES_KEY,
    USER_SETTINGS_KEY,
];

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure raised by a key-value adapter.
#[derive(Debug)]
pub enum StorageError {
    /// Backend could not serve the request (offline, poisoned, simulated outage).
    Unavailable(String),
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Unavailable(_) | Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String-keyed blob storage used by the journal store.
pub trait KeyValueStore {
    /// Returns the stored blob, or `None` when the key was never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Stores several keys.
    ///
    /// The default writes one key at a time and stops at the first failure,
    /// so earlier keys may already be updated. Adapters with transactions
    /// should override this to commit all keys or none.
    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value.as_str())?;
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        (**self).set_many(entries)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        (**self).set_many(entries)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        (**self).set_many(entries)
    }
}

/// Serializes access to an adapter that is not `Sync` (e.g. a SQLite
/// connection) so it can be shared across threads.
impl<T: KeyValueStore + ?Sized> KeyValueStore for Mutex<T> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        lock_adapter(self)?.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        lock_adapter(self)?.set(key, value)
    }

    fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        lock_adapter(self)?.set_many(entries)
    }
}

fn lock_adapter<T: ?Sized>(adapter: &Mutex<T>) -> StorageResult<std::sync::MutexGuard<'_, T>> {
    adapter
        .lock()
        .map_err(|_| StorageError::Unavailable("storage adapter lock poisoned".to_string()))
}
