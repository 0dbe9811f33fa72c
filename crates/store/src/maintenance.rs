// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `.omc/` tree creation and aged-state sweeps.
//!
//! Every sweep tolerates individual failures: a file that cannot be statted
//! or removed is skipped, never fatal.

use crate::error::StoreError;
use crate::paths::omc_dir;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Plain state files older than this are swept by maintenance.
pub const STATE_RETENTION_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Session-scoped directories older than this are swept.
pub const SESSION_RETENTION_MS: u64 = 24 * 60 * 60 * 1000;

/// Live-mode files never swept regardless of age.
const PROTECTED: &[&str] = &[
    "autopilot-state.json",
    "ultrapilot-state.json",
    "ralph-state.json",
    "ultrawork-state.json",
    "swarm-state.json",
    "swarm-active.marker",
    "swarm.db",
    "swarm.db-wal",
    "swarm.db-shm",
];

/// Subdirectories of `.omc/` created by `init`.
const TREE: &[&str] = &[
    "state",
    "state/sessions",
    "state/checkpoints",
    "notepads",
    "plans",
    "research",
    "logs",
    "drafts",
    "skills",
];

/// Idempotently create the standard `.omc/` subtree.
pub fn ensure_tree(root: &Path) -> Result<(), StoreError> {
    let omc = omc_dir(root);
    for dir in TREE {
        fs::create_dir_all(omc.join(dir))?;
    }
    Ok(())
}

/// Sweep unprotected files under `.omc/state/` older than the retention
/// window. Returns the number removed.
pub fn sweep_state(root: &Path, now_ms: u64) -> usize {
    let state = omc_dir(root).join("state");
    let Ok(entries) = fs::read_dir(&state) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if PROTECTED.contains(&name.as_str()) {
            continue;
        }
        if age_ms(&path, now_ms).is_some_and(|age| age > STATE_RETENTION_MS)
            && fs::remove_file(&path).is_ok()
        {
            tracing::debug!(file = %name, "swept aged state file");
            removed += 1;
        }
    }
    removed
}

/// Sweep session directories under `.omc/state/sessions/` older than the
/// session retention window. Returns the number removed.
pub fn sweep_sessions(root: &Path, now_ms: u64) -> usize {
    let sessions = omc_dir(root).join("state/sessions");
    let Ok(entries) = fs::read_dir(&sessions) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if age_ms(&path, now_ms).is_some_and(|age| age > SESSION_RETENTION_MS)
            && fs::remove_dir_all(&path).is_ok()
        {
            removed += 1;
        }
    }
    removed
}

fn age_ms(path: &Path, now_ms: u64) -> Option<u64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let modified_ms = modified.duration_since(UNIX_EPOCH).ok()?.as_millis() as u64;
    Some(now_ms.saturating_sub(modified_ms))
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
