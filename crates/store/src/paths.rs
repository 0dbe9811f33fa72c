// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path guard: every filesystem path the kernel touches resolves through
//! here and must land inside `<worktree>/.omc/`.
//!
//! The worktree root is the nearest ancestor carrying `.git` (directory or
//! file, so linked worktrees count), falling back to the starting cwd.
//! Successful lookups are cached per cwd; failed lookups are not, so a
//! directory that later becomes a repository is re-detected.

use crate::error::StoreError;
use omc_core::ModeName;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

fn root_cache() -> &'static Mutex<HashMap<PathBuf, PathBuf>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, PathBuf>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Clear the process-scoped worktree-root cache (tests only need this, but
/// it is part of the public contract so test isolation never depends on
/// hidden module state).
pub fn clear_worktree_cache() {
    root_cache().lock().clear();
}

/// The worktree root for `cwd`: nearest ancestor with `.git`, else `cwd`.
pub fn worktree_root(cwd: &Path) -> PathBuf {
    if let Some(root) = root_cache().lock().get(cwd) {
        return root.clone();
    }
    match find_vcs_root(cwd) {
        Some(root) => {
            root_cache().lock().insert(cwd.to_path_buf(), root.clone());
            root
        }
        // Not cached: the directory may become a repository later.
        None => cwd.to_path_buf(),
    }
}

fn find_vcs_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// The `.omc/` directory under a worktree root.
pub fn omc_dir(root: &Path) -> PathBuf {
    root.join(".omc")
}

/// Validate a relative path for use under `.omc/`.
///
/// Rejects absolute paths, `~` prefixes, empty input, interior NUL, and any
/// `..` component.
pub fn validate_relative(input: &str) -> Result<(), StoreError> {
    if input.is_empty() || input.contains('\0') || input.starts_with('~') {
        return Err(StoreError::InvalidPath(input.to_string()));
    }
    let path = Path::new(input);
    if path.is_absolute() {
        return Err(StoreError::InvalidPath(input.to_string()));
    }
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
    {
        return Err(StoreError::InvalidPath(input.to_string()));
    }
    Ok(())
}

/// Resolve a validated relative path to `<root>/.omc/<relative>`, verifying
/// the normalized result stays inside the worktree.
pub fn resolve_omc(relative: &str, root: &Path) -> Result<PathBuf, StoreError> {
    validate_relative(relative)?;
    let joined = normalize(&omc_dir(root).join(relative));
    if !joined.starts_with(root) {
        return Err(StoreError::PathEscape(joined));
    }
    Ok(joined)
}

/// `<root>/.omc/state/<mode>-state.json`. Swarm is rejected: its task state
/// lives in SQLite, not a JSON record.
pub fn resolve_state(mode: ModeName, root: &Path) -> Result<PathBuf, StoreError> {
    let file = mode
        .state_file_name()
        .ok_or(StoreError::NoStateFile(mode))?;
    resolve_omc(&format!("state/{file}"), root)
}

/// `<root>/.omc/state/sessions/<sid>/<mode>-state.json` with the session id
/// sanitized for filesystem use.
pub fn resolve_session_state(
    mode: ModeName,
    session_id: &str,
    root: &Path,
) -> Result<PathBuf, StoreError> {
    let file = mode
        .state_file_name()
        .ok_or(StoreError::NoStateFile(mode))?;
    let sid = sanitize_session_id(session_id)?;
    resolve_omc(&format!("state/sessions/{sid}/{file}"), root)
}

/// Replace path separators and NUL in a host-supplied session id so it is
/// safe as a single path component. All-dot ids are rewritten so they can
/// never alias `.` or `..`.
pub fn sanitize_session_id(session_id: &str) -> Result<String, StoreError> {
    if session_id.is_empty() {
        return Err(StoreError::InvalidSessionId);
    }
    let cleaned: String = session_id
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        return Ok("_".repeat(cleaned.len()));
    }
    Ok(cleaned)
}

/// Derive a trusted root from `cwd` and refuse a user-supplied directory
/// whose real path falls outside it. The root is never taken from user
/// input.
pub fn validate_working_directory(
    user: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf, StoreError> {
    let trusted = worktree_root(&real_path(cwd));
    let Some(user) = user else {
        return Ok(trusted);
    };
    let candidate = if user.is_absolute() {
        user.to_path_buf()
    } else {
        trusted.join(user)
    };
    let resolved = real_path(&candidate);
    if resolved.starts_with(&trusted) {
        Ok(resolved)
    } else {
        Err(StoreError::PathEscape(resolved))
    }
}

/// Canonicalize when the path exists (resolving symlinks); otherwise fall
/// back to lexical normalization so not-yet-created paths still validate.
fn real_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
}

/// Lexical normalization: resolves `.` and `..` without touching the
/// filesystem. `..` at the root is dropped rather than escaping.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
