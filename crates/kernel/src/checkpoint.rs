// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PreCompact checkpointer: snapshot every active mode and the accumulated
//! plan wisdom before the host compacts its context.

use crate::bus::HookContext;
use crate::error::KernelError;
use omc_core::{
    AutopilotState, Clock, ModeName, RalphState, TeamState, UltraQaState, UltrapilotState,
    UltraworkState, Verdict,
};
use omc_store::{
    collect_wisdom, read_mode_marker, read_state, write_checkpoint, write_wisdom, Checkpoint,
    ModeSnapshot,
};

pub fn handle<C: Clock>(ctx: &HookContext<C>, manual: bool) -> Result<Verdict, KernelError> {
    let now = ctx.clock.utc_now();
    let mut checkpoint = Checkpoint::new(ctx.session_id.clone(), now);
    checkpoint.modes = snapshot_active_modes(ctx);

    let wisdom = collect_wisdom(&ctx.root);
    let checkpoint_path = write_checkpoint(&ctx.root, &checkpoint)?;
    let wisdom_path = write_wisdom(&ctx.root, now, &wisdom)?;

    let mode_names: Vec<String> = checkpoint
        .modes
        .iter()
        .map(|m| m.mode.to_string())
        .collect();
    let mut message = if mode_names.is_empty() {
        "Pre-compact checkpoint saved (no active modes)".to_string()
    } else {
        format!("Pre-compact checkpoint saved: {}", mode_names.join(", "))
    };
    if wisdom_path.is_some() {
        message.push_str(" (wisdom preserved)");
    }
    tracing::info!(
        manual,
        path = %checkpoint_path.display(),
        modes = mode_names.len(),
        "pre-compact checkpoint written"
    );
    Ok(Verdict::allow().with_system_message(message))
}

/// A compact view of every active mode record in the worktree.
fn snapshot_active_modes<C: Clock>(ctx: &HookContext<C>) -> Vec<ModeSnapshot> {
    let root = &ctx.root;
    let mut modes = Vec::new();

    if let Some(s) = read_state::<AutopilotState>(root).filter(|s| s.active) {
        modes.push(ModeSnapshot {
            mode: ModeName::Autopilot,
            phase: Some(s.phase.to_string()),
            iteration: None,
            prompt: Some(s.prompt),
            task_counts: Some(format!("{} agents spawned", s.agent_count)),
            session_id: s.session_id,
        });
    }
    if let Some(s) = read_state::<UltrapilotState>(root).filter(|s| s.active) {
        modes.push(ModeSnapshot {
            mode: ModeName::Ultrapilot,
            phase: Some(s.phase.to_string()),
            iteration: Some(s.validation_attempts),
            prompt: None,
            task_counts: Some(format!("{} workers", s.workers.len())),
            session_id: s.session_id,
        });
    }
    if let Some(s) = read_state::<TeamState>(root).filter(|s| s.active) {
        modes.push(ModeSnapshot {
            mode: ModeName::TeamPipeline,
            phase: Some(s.phase.to_string()),
            iteration: Some(s.fix_loop.attempt),
            prompt: Some(s.prompt),
            task_counts: Some(format!(
                "{}/{} tasks",
                s.artifacts.tasks_completed, s.artifacts.tasks_total
            )),
            session_id: s.session_id,
        });
    }
    if let Some(s) = read_state::<RalphState>(root).filter(|s| s.active) {
        modes.push(ModeSnapshot {
            mode: ModeName::Ralph,
            phase: None,
            iteration: Some(s.iteration),
            prompt: Some(s.prompt),
            task_counts: None,
            session_id: s.session_id,
        });
    }
    if let Some(s) = read_state::<UltraworkState>(root).filter(|s| s.active) {
        modes.push(ModeSnapshot {
            mode: ModeName::Ultrawork,
            phase: None,
            iteration: Some(s.reinforcement_count),
            prompt: Some(s.original_prompt),
            task_counts: None,
            session_id: s.session_id,
        });
    }
    if let Some(s) = read_state::<UltraQaState>(root).filter(|s| s.active) {
        modes.push(ModeSnapshot {
            mode: ModeName::Ultraqa,
            phase: Some(s.goal_type.to_string()),
            iteration: Some(s.cycle),
            prompt: None,
            task_counts: None,
            session_id: s.session_id,
        });
    }

    // Swarm marker + best-effort task counts from the live database.
    if let Some(marker) = read_mode_marker(ModeName::Swarm, root, ctx.now_ms()) {
        let task_counts = omc_swarm::swarm_db_path(root)
            .ok()
            .filter(|p| p.exists())
            .and_then(|p| omc_swarm::SwarmDb::open(&p).ok())
            .and_then(|db| db.task_counts().ok())
            .map(|counts| counts.summary());
        modes.push(ModeSnapshot {
            mode: ModeName::Swarm,
            phase: None,
            iteration: None,
            prompt: None,
            task_counts,
            session_id: marker
                .extra
                .get("sessionId")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }
    modes
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
