//! In-memory key-value store

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{KeyValueStore, Result, StorageError};

/// Process-local store, lost on drop.
///
/// Writes can be switched off with [`MemoryStore::set_available`] to exercise
/// the storage-failure paths of the components built on top of it.
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Seed a raw value, bypassing the availability switch.
    pub fn with_entry(self, key: &str, value: impl Into<Vec<u8>>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.into());
        }
        self
    }

    /// When `false`, every `set`/`remove` fails with `StorageError::Unavailable`.
    /// Reads keep working.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory store is read-only".to_string()))
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Init("Memory store lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Init("Memory store lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.check_writable()?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Init("Memory store lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}
