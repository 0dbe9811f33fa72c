// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notepad persistence: `.omc/notepad.md` loaded and saved whole.

use crate::atomic::{atomic_write, read_string};
use crate::error::StoreError;
use crate::paths::resolve_omc;
use omc_core::notepad::Notepad;
use std::path::Path;

const FILE: &str = "notepad.md";

/// Load the worktree notepad; missing file is an empty document.
pub fn load_notepad(root: &Path) -> Notepad {
    resolve_omc(FILE, root)
        .ok()
        .and_then(|path| read_string(&path))
        .map(|text| Notepad::parse(&text))
        .unwrap_or_default()
}

/// Save the notepad atomically.
pub fn save_notepad(root: &Path, notepad: &Notepad) -> Result<(), StoreError> {
    let path = resolve_omc(FILE, root)?;
    atomic_write(&path, notepad.render().as_bytes())
}

#[cfg(test)]
#[path = "notepad_io_tests.rs"]
mod tests;
