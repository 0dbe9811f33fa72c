// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations.

pub mod hook;
pub mod mode;
pub mod setup;
pub mod swarm;

use omc_core::SystemClock;
use omc_kernel::{effective_session_id, HookContext};
use std::path::PathBuf;

/// Build a hook context for operator commands: trusted root from the
/// current directory, session from `--session` or the pid fallback.
pub(crate) fn operator_context(session: Option<String>) -> anyhow::Result<HookContext<SystemClock>> {
    let cwd = std::env::current_dir()?;
    let root = omc_store::worktree_root(&cwd);
    let clock = SystemClock;
    let session_id = match session {
        Some(sid) if !sid.is_empty() => sid,
        _ => effective_session_id("", &clock),
    };
    Ok(HookContext::new(root, session_id, clock))
}

/// Print a serializable result as one JSON line on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(err) => eprintln!("omc: could not serialize result: {err}"),
    }
}

/// The swarm database under the current worktree.
pub(crate) fn open_swarm_db() -> anyhow::Result<(PathBuf, omc_swarm::SwarmDb)> {
    let cwd = std::env::current_dir()?;
    let root = omc_store::worktree_root(&cwd);
    let path = omc_swarm::swarm_db_path(&root)?;
    let db = omc_swarm::SwarmDb::open(&path)?;
    Ok((path, db))
}
