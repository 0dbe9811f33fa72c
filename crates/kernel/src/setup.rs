// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Setup hook: `init` builds the `.omc/` tree, `maintenance` sweeps it.

use crate::bus::HookContext;
use crate::config::OmcConfig;
use crate::error::KernelError;
use omc_core::{Clock, SetupTrigger, Verdict};
use std::io::Write;

const ENV_MARKER: &str = "OMC_INITIALIZED=true";

pub fn handle<C: Clock>(
    ctx: &HookContext<C>,
    trigger: SetupTrigger,
) -> Result<Verdict, KernelError> {
    match trigger {
        SetupTrigger::Init => init(ctx),
        SetupTrigger::Maintenance => maintenance(ctx),
    }
}

fn init<C: Clock>(ctx: &HookContext<C>) -> Result<Verdict, KernelError> {
    omc_store::ensure_tree(&ctx.root)?;

    let mut notes = Vec::new();
    if !OmcConfig::is_readable(&ctx.root) {
        notes.push("config unreadable; using defaults".to_string());
    }
    if let Ok(env_file) = std::env::var("CLAUDE_ENV_FILE") {
        if let Err(err) = append_env_marker(std::path::Path::new(&env_file)) {
            tracing::debug!(%err, "could not record init marker in env file");
        }
    }

    let message = if notes.is_empty() {
        "omc initialized".to_string()
    } else {
        format!("omc initialized ({})", notes.join("; "))
    };
    Ok(Verdict::allow().with_system_message(message))
}

/// Append `OMC_INITIALIZED=true` to the host's per-session env file unless
/// it is already present.
fn append_env_marker(path: &std::path::Path) -> std::io::Result<()> {
    let existing = std::fs::read_to_string(path).unwrap_or_default();
    if existing.lines().any(|line| line.trim() == ENV_MARKER) {
        return Ok(());
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{ENV_MARKER}")
}

fn maintenance<C: Clock>(ctx: &HookContext<C>) -> Result<Verdict, KernelError> {
    let now = ctx.now_ms();
    let state_removed = omc_store::sweep_state(&ctx.root, now);
    let sessions_removed = omc_store::sweep_sessions(&ctx.root, now);

    // Compact the swarm database when one exists; failures are tolerated
    // like every other maintenance step.
    if let Ok(db_path) = omc_swarm::swarm_db_path(&ctx.root) {
        if db_path.exists() {
            match omc_swarm::SwarmDb::open(&db_path) {
                Ok(db) => {
                    if let Err(err) = db.vacuum() {
                        tracing::debug!(%err, "swarm.db vacuum failed");
                    }
                }
                Err(err) => tracing::debug!(%err, "swarm.db unopenable during maintenance"),
            }
        }
    }

    Ok(Verdict::allow().with_system_message(format!(
        "maintenance: removed {state_removed} state files, {sessions_removed} session dirs"
    )))
}

#[cfg(test)]
#[path = "setup_tests.rs"]
mod tests;
