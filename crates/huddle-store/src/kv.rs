//! The string key-value contract every backend implements.
//!
//! This is the whole surface the rest of the application sees of durable
//! storage: named string records, read and overwritten as a unit.

use crate::error::Result;

/// A durable string store keyed by name.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Returns `true` if a value was present.
    fn remove(&self, key: &str) -> Result<bool>;
}
