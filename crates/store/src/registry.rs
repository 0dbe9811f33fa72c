// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mode registry: answers "can I start mode X now?" and tracks activations.
//!
//! JSON-backed modes are active when their record carries `active: true`.
//! Marker-backed modes are active while their sentinel exists and is fresh;
//! stale markers are removed on read and count as inactive.

use crate::atomic::{atomic_write_json, safe_read_json};
use crate::error::StoreError;
use crate::paths::resolve_omc;
use chrono::DateTime;
use omc_core::{ModeName, ModeStorage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of a start check. Not an error: callers surface `message` in the
/// hook's `systemMessage` and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCheck {
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<ModeName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StartCheck {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            blocked_by: None,
            message: None,
        }
    }

    pub fn blocked(by: ModeName, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            blocked_by: Some(by),
            message: Some(message.into()),
        }
    }
}

/// Marker file payload for marker-backed modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeMarker {
    pub mode: ModeName,
    /// RFC 3339 start stamp; staleness is judged against this.
    pub started_at: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModeMarker {
    pub fn new(mode: ModeName, started_at: impl Into<String>) -> Self {
        Self {
            mode,
            started_at: started_at.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: serde_json::Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    fn started_at_ms(&self) -> Option<u64> {
        DateTime::parse_from_rfc3339(&self.started_at)
            .ok()
            .map(|dt| dt.timestamp_millis().max(0) as u64)
    }
}

/// Can `mode` start in this worktree right now?
///
/// Exclusive modes are blocked by any active exclusive mode (including a
/// previous activation of themselves). Ralph and ultraqa additionally block
/// each other.
pub fn can_start_mode(mode: ModeName, root: &Path, now_ms: u64) -> StartCheck {
    if mode.is_exclusive() {
        for other in ModeName::ALL {
            if other.is_exclusive() && is_mode_active(other, root, now_ms) {
                return StartCheck::blocked(
                    other,
                    format!("{other} is active; cancel it before starting {mode}"),
                );
            }
        }
    }
    let mutex_partner = match mode {
        ModeName::Ralph => Some(ModeName::Ultraqa),
        ModeName::Ultraqa => Some(ModeName::Ralph),
        _ => None,
    };
    if let Some(partner) = mutex_partner {
        if is_mode_active(partner, root, now_ms) {
            return StartCheck::blocked(
                partner,
                format!("{partner} is active; cancel it before starting {mode}"),
            );
        }
    }
    StartCheck::allowed()
}

/// Is the mode currently active in this worktree?
pub fn is_mode_active(mode: ModeName, root: &Path, now_ms: u64) -> bool {
    match mode.storage() {
        ModeStorage::Marker => read_mode_marker(mode, root, now_ms).is_some(),
        ModeStorage::Json => {
            let Ok(path) = crate::paths::resolve_state(mode, root) else {
                return false;
            };
            safe_read_json::<serde_json::Value>(&path)
                .and_then(|v| v.get("active").and_then(serde_json::Value::as_bool))
                .unwrap_or(false)
        }
    }
}

/// All currently-active modes, in table order.
pub fn get_active_modes(root: &Path, now_ms: u64) -> Vec<ModeName> {
    ModeName::ALL
        .into_iter()
        .filter(|mode| is_mode_active(*mode, root, now_ms))
        .collect()
}

/// Write a marker sentinel for a marker-backed mode.
pub fn create_mode_marker(
    mode: ModeName,
    root: &Path,
    marker: &ModeMarker,
) -> Result<PathBuf, StoreError> {
    let path = marker_path(mode, root)?;
    atomic_write_json(&path, marker)?;
    Ok(path)
}

/// Read a marker, removing it when stale. `None` means "not active".
pub fn read_mode_marker(mode: ModeName, root: &Path, now_ms: u64) -> Option<ModeMarker> {
    let path = marker_path(mode, root).ok()?;
    let marker: ModeMarker = safe_read_json(&path)?;
    let stale = match marker.started_at_ms() {
        Some(started) => now_ms.saturating_sub(started) > mode.staleness_ms(),
        // Unreadable stamp: the marker cannot prove freshness.
        None => true,
    };
    if stale {
        let _ = fs::remove_file(&path);
        tracing::debug!(%mode, "removed stale mode marker");
        return None;
    }
    Some(marker)
}

/// Remove a marker sentinel. Missing marker is fine.
pub fn remove_mode_marker(mode: ModeName, root: &Path) -> Result<(), StoreError> {
    let path = marker_path(mode, root)?;
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Remove whatever persistence the mode uses (record or marker).
pub fn clear_mode(mode: ModeName, root: &Path) -> Result<(), StoreError> {
    match mode.storage() {
        ModeStorage::Marker => remove_mode_marker(mode, root),
        ModeStorage::Json => {
            let path = crate::paths::resolve_state(mode, root)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(err.into()),
            }
        }
    }
}

fn marker_path(mode: ModeName, root: &Path) -> Result<PathBuf, StoreError> {
    let file = mode
        .marker_file_name()
        .ok_or(StoreError::NoStateFile(mode))?;
    resolve_omc(&format!("state/{file}"), root)
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
