//! In-memory key-value adapter.
//!
//! Used by tests and as the degraded fallback when the device database cannot
//! be opened. Supports a simulated outage switch.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Volatile adapter backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `(key, blob)` pairs.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        if let Ok(mut map) = store.entries.lock() {
            map.extend(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into())),
            );
        }
        store
    }

    /// While `true`, every `get`/`set` fails with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> StorageResult<HashMap<String, String>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, String>>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn unavailable_switch_fails_reads_and_writes() {
        let store = MemoryKeyValueStore::with_entries([("userSettings", "{}")]);
        store.set_unavailable(true);

        assert!(matches!(
            store.get("userSettings"),
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            store.set("userSettings", "{}"),
            Err(StorageError::Unavailable(_))
        ));
        assert_eq!(store.write_count(), 0);

        store.set_unavailable(false);
        assert_eq!(store.get("userSettings").unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn default_set_many_writes_every_key() {
        let store = MemoryKeyValueStore::new();
        store
            .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.snapshot().unwrap().len(), 2);
    }

    #[test]
    fn shared_wrappers_forward_to_the_inner_store() {
        let inner: Box<dyn KeyValueStore + Send> = Box::new(MemoryKeyValueStore::new());
        let shared = std::sync::Arc::new(std::sync::Mutex::new(inner));

        shared
            .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        assert_eq!(shared.get("b").unwrap().as_deref(), Some("2"));
        assert_eq!(shared.get("c").unwrap(), None);
    }
}
