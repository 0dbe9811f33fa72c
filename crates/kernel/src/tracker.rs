// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subagent tracker: per-session counters under
//! `state/sessions/<sid>/subagents.json`.

use crate::bus::HookContext;
use crate::error::KernelError;
use omc_core::{Clock, Verdict};
use omc_store::{atomic_write_json, safe_read_json, sanitize_session_id};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Counters for subagents seen in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubagentLog {
    pub started: u32,
    pub stopped: u32,
    pub last_event_ms: u64,
}

impl SubagentLog {
    /// Currently-running subagents (never negative even after replays).
    pub fn active(&self) -> u32 {
        self.started.saturating_sub(self.stopped)
    }
}

pub fn handle_start<C: Clock>(ctx: &HookContext<C>) -> Result<Verdict, KernelError> {
    update(ctx, |log| log.started += 1)?;
    Ok(Verdict::allow())
}

pub fn handle_stop<C: Clock>(ctx: &HookContext<C>) -> Result<Verdict, KernelError> {
    update(ctx, |log| log.stopped += 1)?;
    Ok(Verdict::allow())
}

fn update<C: Clock>(
    ctx: &HookContext<C>,
    apply: impl FnOnce(&mut SubagentLog),
) -> Result<(), KernelError> {
    let path = log_path(ctx)?;
    let mut log: SubagentLog = safe_read_json(&path).unwrap_or_default();
    apply(&mut log);
    log.last_event_ms = ctx.now_ms();
    atomic_write_json(&path, &log)?;
    Ok(())
}

fn log_path<C: Clock>(ctx: &HookContext<C>) -> Result<PathBuf, KernelError> {
    let sid = sanitize_session_id(&ctx.session_id)?;
    Ok(omc_store::resolve_omc(
        &format!("state/sessions/{sid}/subagents.json"),
        &ctx.root,
    )?)
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
