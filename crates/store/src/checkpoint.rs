// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-compact checkpoints.
//!
//! A checkpoint records a compact view of every active mode plus a "wisdom"
//! document concatenated from the per-plan notepads, so the host can rebuild
//! working context after it compacts its own.

use crate::atomic::{atomic_write, atomic_write_json, read_string};
use crate::error::StoreError;
use crate::paths::{omc_dir, resolve_omc};
use chrono::{DateTime, Utc};
use omc_core::ModeName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current checkpoint schema version
pub const CURRENT_CHECKPOINT_VERSION: u32 = 1;

/// Notepad files whose content counts as wisdom.
const WISDOM_FILES: &[&str] = &["learnings.md", "decisions.md", "issues.md", "problems.md"];

/// Compact view of one active mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSnapshot {
    pub mode: ModeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_counts: Option<String>,
    pub session_id: String,
}

/// A full pre-compact snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Schema version for migrations
    #[serde(rename = "v")]
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub session_id: String,
    pub modes: Vec<ModeSnapshot>,
}

impl Checkpoint {
    pub fn new(session_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            version: CURRENT_CHECKPOINT_VERSION,
            created_at,
            session_id: session_id.into(),
            modes: Vec::new(),
        }
    }
}

/// Write `checkpoint-<stamp>.json` under `state/checkpoints/`.
pub fn write_checkpoint(root: &Path, checkpoint: &Checkpoint) -> Result<PathBuf, StoreError> {
    let stamp = filename_stamp(checkpoint.created_at);
    let path = resolve_omc(&format!("state/checkpoints/checkpoint-{stamp}.json"), root)?;
    atomic_write_json(&path, checkpoint)?;
    Ok(path)
}

/// Concatenate wisdom files from every plan notepad under `.omc/notepads/`.
pub fn collect_wisdom(root: &Path) -> String {
    let notepads = omc_dir(root).join("notepads");
    let Ok(plans) = std::fs::read_dir(&notepads) else {
        return String::new();
    };
    let mut plan_dirs: Vec<PathBuf> = plans
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    plan_dirs.sort();

    let mut out = String::new();
    for plan in plan_dirs {
        let plan_name = plan
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for file in WISDOM_FILES {
            if let Some(text) = read_string(&plan.join(file)) {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                out.push_str(&format!("## {plan_name}/{file}\n\n{text}\n\n"));
            }
        }
    }
    out.trim_end().to_string()
}

/// Write `wisdom-<stamp>.md` when `content` is non-empty.
pub fn write_wisdom(
    root: &Path,
    created_at: DateTime<Utc>,
    content: &str,
) -> Result<Option<PathBuf>, StoreError> {
    if content.is_empty() {
        return Ok(None);
    }
    let stamp = filename_stamp(created_at);
    let path = resolve_omc(&format!("state/checkpoints/wisdom-{stamp}.md"), root)?;
    atomic_write(&path, content.as_bytes())?;
    Ok(Some(path))
}

/// RFC 3339 with `:` swapped out so the stamp is a portable filename.
fn filename_stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339().replace(':', "-")
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
