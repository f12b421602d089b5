//! In-process backend, the equivalent of a browser's local storage for
//! tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;

/// `HashMap`-backed [`KeyValueStore`]. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.remove(key).is_some())
    }
}
