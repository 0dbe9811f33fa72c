// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store error taxonomy.

use omc_core::ModeName;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the path guard and state store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input path is absolute, `~`-prefixed, empty, or contains `..`.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A resolved path landed outside the worktree.
    #[error("path escapes worktree: {}", .0.display())]
    PathEscape(PathBuf),

    /// Session id is empty.
    #[error("invalid session id")]
    InvalidSessionId,

    /// Marker-backed modes (swarm) have no JSON state file.
    #[error("mode {0} has no JSON state file")]
    NoStateFile(ModeName),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
