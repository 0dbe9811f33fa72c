// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic file persistence: writes are durable or not observed.
//!
//! Every write goes through a same-directory temp file that is written,
//! fsynced, then renamed over the target. The parent directory fsync is
//! best-effort; some filesystems refuse it and the rename is already
//! atomic at that point.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `contents` to `path` atomically.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| StoreError::InvalidPath(path.display().to_string()))?;
    fs::create_dir_all(parent)?;

    let tmp = temp_path(path, parent)?;
    match write_and_rename(&tmp, path, parent, contents) {
        Ok(()) => Ok(()),
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            Err(err)
        }
    }
}

/// Serialize `value` as 2-space-indented JSON with a trailing newline and
/// write it atomically.
pub fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let mut body = serde_json::to_string_pretty(value)?;
    body.push('\n');
    atomic_write(path, body.as_bytes())
}

/// Read and parse a JSON file. Missing file or parse failure is `None`,
/// never an error: corrupt state is treated as no state.
pub fn safe_read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(path = %path.display(), %err, "unreadable state file treated as absent");
            None
        }
    }
}

/// Read a text file, `None` when missing.
pub fn read_string(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok()
}

fn temp_path(target: &Path, parent: &Path) -> Result<PathBuf, StoreError> {
    let basename = target
        .file_name()
        .ok_or_else(|| StoreError::InvalidPath(target.display().to_string()))?;
    Ok(parent.join(format!(
        ".{}.tmp.{}",
        basename.to_string_lossy(),
        nanoid::nanoid!(10)
    )))
}

fn write_and_rename(
    tmp: &Path,
    target: &Path,
    parent: &Path,
    contents: &[u8],
) -> Result<(), StoreError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(tmp)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp, target)?;

    // Best-effort parent fsync; not all platforms allow opening a directory.
    if let Ok(dir) = File::open(parent) {
        let _ = dir.sync_all();
    }
    Ok(())
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
