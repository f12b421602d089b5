//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration.

use std::path::PathBuf;

use huddle_shared::constants::DEFAULT_KEY_PREFIX;

/// Where persisted records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// SQLite file in the data directory.
    Sqlite,
    /// Process memory; nothing survives a restart.
    Memory,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Directory holding `huddle.db`.
    /// Env: `HUDDLE_DATA_DIR`
    /// Default: `None` (platform data directory).
    pub data_dir: Option<PathBuf>,

    /// Env: `HUDDLE_STORAGE` (`sqlite` / `memory`)
    /// Default: `sqlite`
    pub storage: StorageBackend,

    /// Prefix of every persisted key.
    /// Env: `HUDDLE_KEY_PREFIX`
    /// Default: `slack-clone`
    pub key_prefix: String,

    /// Log filter used when `RUST_LOG` is not set.
    /// Env: `HUDDLE_LOG`
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            storage: StorageBackend::Sqlite,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            log_filter: "huddle_client=debug,huddle_store=info,warn".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("HUDDLE_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(storage) = lookup("HUDDLE_STORAGE") {
            match storage.trim().to_ascii_lowercase().as_str() {
                "sqlite" => config.storage = StorageBackend::Sqlite,
                "memory" => config.storage = StorageBackend::Memory,
                other => {
                    tracing::warn!(value = %other, "Invalid HUDDLE_STORAGE, using default");
                }
            }
        }

        if let Some(prefix) = lookup("HUDDLE_KEY_PREFIX") {
            let prefix = prefix.trim();
            if prefix.is_empty() {
                tracing::warn!("Empty HUDDLE_KEY_PREFIX, using default");
            } else {
                config.key_prefix = prefix.to_string();
            }
        }

        if let Some(filter) = lookup("HUDDLE_LOG").filter(|f| !f.trim().is_empty()) {
            config.log_filter = filter;
        }

        config
    }
}
