//! SQLite-backed key-value storage.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation. Every record lives in the
//! single `kv_entries` table; the JSON inside a value is never inspected here.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
///
/// The connection sits behind a mutex so the handle can be shared as an
/// `Arc<dyn KeyValueStore>`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/huddle/huddle.db`
    /// - macOS:   `~/Library/Application Support/com.huddle.huddle/huddle.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\huddle\huddle\data\huddle.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "huddle", "huddle").ok_or(StoreError::NoDataDir)?;

        Self::open_in_dir(project_dirs.data_dir())
    }

    /// Open (or create) `huddle.db` inside `data_dir`, creating the directory.
    pub fn open_in_dir(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("huddle.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database. Useful for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock and return the underlying connection.
    ///
    /// Callers should prefer the [`KeyValueStore`] methods, but direct access
    /// is occasionally needed for ad-hoc queries.
    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn
            .lock()
            .ok()
            .and_then(|c| c.path().filter(|p| !p.is_empty()).map(PathBuf::from))
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!(key, bytes = value.len(), "stored record");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let affected = conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}
