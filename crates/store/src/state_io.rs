// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed mode-record IO with session binding.
//!
//! Records are always rewritten whole (atomic rename), so readers observe a
//! consistent document. Session-bound reads return `None` for records that
//! belong to a different session — state never leaks across host processes
//! sharing a worktree.

use crate::atomic::{atomic_write_json, safe_read_json};
use crate::error::StoreError;
use crate::paths::{resolve_session_state, resolve_state};
use omc_core::state::ModeState;
use std::fs;
use std::path::{Path, PathBuf};

/// Write the worktree-level record for the state's mode.
pub fn write_state<T: ModeState>(root: &Path, state: &T) -> Result<PathBuf, StoreError> {
    let path = resolve_state(T::MODE, root)?;
    atomic_write_json(&path, state)?;
    Ok(path)
}

/// Read the worktree-level record, if present and parseable.
pub fn read_state<T: ModeState>(root: &Path) -> Option<T> {
    let path = resolve_state(T::MODE, root).ok()?;
    safe_read_json(&path)
}

/// Read the worktree-level record, rejecting one bound to another session.
pub fn read_state_for_session<T: ModeState>(root: &Path, session_id: &str) -> Option<T> {
    let state: T = read_state(root)?;
    if state.session_id() != session_id {
        tracing::debug!(
            mode = %T::MODE,
            "record belongs to another session; treating as absent"
        );
        return None;
    }
    Some(state)
}

/// Remove the worktree-level record. Returns whether a file was removed.
pub fn clear_state<T: ModeState>(root: &Path) -> Result<bool, StoreError> {
    let path = resolve_state(T::MODE, root)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Write the session-scoped copy under `state/sessions/<sid>/`.
pub fn write_session_state<T: ModeState>(
    root: &Path,
    session_id: &str,
    state: &T,
) -> Result<PathBuf, StoreError> {
    let path = resolve_session_state(T::MODE, session_id, root)?;
    atomic_write_json(&path, state)?;
    Ok(path)
}

/// Read the session-scoped copy, enforcing the session binding on the
/// record itself as well as the directory.
pub fn read_session_state<T: ModeState>(root: &Path, session_id: &str) -> Option<T> {
    let path = resolve_session_state(T::MODE, session_id, root).ok()?;
    let state: T = safe_read_json(&path)?;
    (state.session_id() == session_id).then_some(state)
}

/// Remove the session-scoped copy.
pub fn clear_session_state<T: ModeState>(
    root: &Path,
    session_id: &str,
) -> Result<bool, StoreError> {
    let path = resolve_session_state(T::MODE, session_id, root)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
#[path = "state_io_tests.rs"]
mod tests;
