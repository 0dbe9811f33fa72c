// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection handling and schema for `swarm.db`.

use crate::error::SwarmError;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

/// Schema version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const BUSY_TIMEOUT: Duration = Duration::from_millis(2_000);

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id           TEXT PRIMARY KEY,
    description  TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'pending',
    claimed_by   TEXT,
    claimed_at   INTEGER,
    retry_count  INTEGER NOT NULL DEFAULT 0,
    max_retries  INTEGER NOT NULL DEFAULT 3,
    result       TEXT,
    error        TEXT,
    created_at   INTEGER NOT NULL,
    completed_at INTEGER
);

CREATE TABLE IF NOT EXISTS heartbeats (
    agent_id        TEXT PRIMARY KEY,
    current_task_id TEXT,
    last_heartbeat  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS session (
    id          TEXT PRIMARY KEY,
    agent_count INTEGER NOT NULL,
    started_at  INTEGER NOT NULL
);
";

/// Handle over the shared swarm database.
#[derive(Debug)]
pub struct SwarmDb {
    pub(crate) conn: Connection,
}

impl SwarmDb {
    /// Open (and initialize if new) the database at `path`.
    ///
    /// Refuses databases stamped with an incompatible schema version.
    pub fn open(path: &Path) -> Result<Self, SwarmError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(omc_store::StoreError::from)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        match version {
            0 => {
                conn.execute_batch(SCHEMA)?;
                conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            }
            SCHEMA_VERSION => {}
            found => {
                return Err(SwarmError::SchemaVersion {
                    found,
                    expected: SCHEMA_VERSION,
                })
            }
        }
        Ok(Self { conn })
    }

    /// Open an in-memory database (tests).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, SwarmError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(Self { conn })
    }

    /// Reclaim free pages (maintenance).
    pub fn vacuum(&self) -> Result<(), SwarmError> {
        self.conn.execute_batch("VACUUM;")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
