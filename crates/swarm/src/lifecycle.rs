// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Swarm mode lifecycle: marker + database creation and teardown.
//!
//! Starting a swarm consults the mode registry first (swarm is exclusive),
//! then initializes `swarm.db` and drops the `swarm-active.marker` sentinel.

use crate::db::SwarmDb;
use crate::error::SwarmError;
use omc_core::{Clock, ModeName};
use omc_store::{
    can_start_mode, create_mode_marker, remove_mode_marker, resolve_omc, ModeMarker, StartCheck,
};
use std::path::{Path, PathBuf};

const DB_FILE: &str = "state/swarm.db";

/// Location of the shared task database.
pub fn swarm_db_path(root: &Path) -> Result<PathBuf, SwarmError> {
    Ok(resolve_omc(DB_FILE, root)?)
}

/// Start swarm mode: registry check, session row, marker.
///
/// A blocked start returns the failed [`StartCheck`] without touching disk.
pub fn start_swarm<C: Clock>(
    root: &Path,
    session_id: &str,
    agent_count: u32,
    clock: &C,
) -> Result<StartCheck, SwarmError> {
    let check = can_start_mode(ModeName::Swarm, root, clock.epoch_ms());
    if !check.allowed {
        return Ok(check);
    }

    let mut db = SwarmDb::open(&swarm_db_path(root)?)?;
    db.init_session(session_id, agent_count, clock.epoch_ms())?;

    let marker = ModeMarker::new(ModeName::Swarm, clock.iso_now())
        .with_field("agentCount", serde_json::json!(agent_count))
        .with_field("sessionId", serde_json::json!(session_id));
    create_mode_marker(ModeName::Swarm, root, &marker)?;
    tracing::info!(agent_count, "swarm started");
    Ok(check)
}

/// Stop swarm mode: remove the marker, optionally delete the database
/// (including WAL side files).
pub fn stop_swarm(root: &Path, delete_database: bool) -> Result<(), SwarmError> {
    remove_mode_marker(ModeName::Swarm, root)?;
    if delete_database {
        let db = swarm_db_path(root)?;
        for path in [
            db.clone(),
            db.with_extension("db-wal"),
            db.with_extension("db-shm"),
        ] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(omc_store::StoreError::from(err).into()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
