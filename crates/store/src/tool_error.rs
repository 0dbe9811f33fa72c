// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Last-tool-error record: feeds retry guidance into the stop driver.
//!
//! The record auto-expires after 60 s so a stale failure never prompts a
//! retry of work the host finished long ago.

use crate::atomic::{atomic_write_json, safe_read_json};
use crate::error::StoreError;
use crate::paths::resolve_omc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Age past which the record is ignored (and deleted on read).
pub const TOOL_ERROR_MAX_AGE_MS: u64 = 60_000;

/// Retries after which guidance switches from "retry" to "change approach".
pub const TOOL_ERROR_RETRY_LIMIT: u32 = 5;

const FILE: &str = "state/last-tool-error.json";

/// Persisted record of the most recent tool failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolErrorRecord {
    pub tool_name: String,
    pub error: String,
    pub retry_count: u32,
    pub timestamp_ms: u64,
}

impl ToolErrorRecord {
    /// The same failure keeps repeating (param tweaks are not helping).
    pub fn is_repeating(&self) -> bool {
        self.retry_count >= TOOL_ERROR_RETRY_LIMIT
    }
}

fn path(root: &Path) -> Result<PathBuf, StoreError> {
    resolve_omc(FILE, root)
}

/// Record a tool failure. A repeat of the same tool+error bumps
/// `retry_count`; a different failure resets the count.
pub fn record_tool_error(
    root: &Path,
    tool_name: &str,
    error: &str,
    now_ms: u64,
) -> Result<ToolErrorRecord, StoreError> {
    let path = path(root)?;
    let previous: Option<ToolErrorRecord> = safe_read_json(&path);
    let retry_count = match previous {
        Some(prev) if prev.tool_name == tool_name && prev.error == error => prev.retry_count + 1,
        _ => 1,
    };
    let record = ToolErrorRecord {
        tool_name: tool_name.to_string(),
        error: error.to_string(),
        retry_count,
        timestamp_ms: now_ms,
    };
    atomic_write_json(&path, &record)?;
    Ok(record)
}

/// Read and consume the record. Returns `None` when missing or older than
/// [`TOOL_ERROR_MAX_AGE_MS`]; the file is removed either way so guidance is
/// injected at most once.
pub fn take_fresh_tool_error(root: &Path, now_ms: u64) -> Option<ToolErrorRecord> {
    let path = path(root).ok()?;
    let record: Option<ToolErrorRecord> = safe_read_json(&path);
    let _ = fs::remove_file(&path);
    let record = record?;
    (now_ms.saturating_sub(record.timestamp_ms) <= TOOL_ERROR_MAX_AGE_MS).then_some(record)
}

#[cfg(test)]
#[path = "tool_error_tests.rs"]
mod tests;
