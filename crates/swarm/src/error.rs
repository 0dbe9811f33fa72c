// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Swarm error taxonomy.

use thiserror::Error;

/// Errors from the swarm coordinator.
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The database was created by an incompatible kernel version.
    #[error("swarm.db schema version {found} is not supported (expected {expected})")]
    SchemaVersion { found: i64, expected: i64 },

    #[error(transparent)]
    Store(#[from] omc_store::StoreError),
}

impl SwarmError {
    /// `SQLITE_BUSY` past the busy timeout: reported to the caller as a
    /// structured failure, never retried indefinitely.
    pub fn is_busy(&self) -> bool {
        match self {
            SwarmError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == rusqlite::ErrorCode::DatabaseBusy
            }
            _ => false,
        }
    }
}
