//! Schema upgrades for the SQLite backend.
//!
//! The schema version lives in `PRAGMA user_version`. Opening a database
//! applies every step above the stored version, in order, and records each
//! step as it lands.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// Ordered upgrade steps; the version a step produces is its position + 1.
const STEPS: &[(&str, Step)] = &[("v001_initial", v001_initial::up)];

fn target_version() -> u32 {
    STEPS.len() as u32
}

/// Bring the schema of `conn` up to date.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let target = target_version();

    if found >= target {
        tracing::debug!(version = found, "schema up to date");
        return Ok(());
    }

    for (version, (name, step)) in (1u32..).zip(STEPS).skip(found as usize) {
        tracing::info!(version, step = %name, "upgrading schema");
        step(conn).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}
