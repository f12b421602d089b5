//! JSON codec over a [`KeyValueStore`].
//!
//! Callers hand typed values in and out; the raw backend is never touched
//! directly outside this module.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;

/// Cloneable handle that (de)serializes values as JSON documents.
#[derive(Clone)]
pub struct JsonStore {
    backend: Arc<dyn KeyValueStore>,
}

impl JsonStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Decode the record under `key`. `Ok(None)` when absent.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Json {
                key: key.to_string(),
                source,
            })
    }

    /// Like [`load`](Self::load), but a record that no longer decodes is
    /// logged and treated as absent.
    pub fn load_or_discard<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.load(key) {
            Err(StoreError::Json { key, source }) => {
                tracing::warn!(key = %key, error = %source, "discarding undecodable record");
                Ok(None)
            }
            other => other,
        }
    }

    /// Encode `value` and overwrite the record under `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Json {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<bool> {
        self.backend.remove(key)
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }
}
