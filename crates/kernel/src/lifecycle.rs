// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mode lifecycle: guarded starts and cancellation.
//!
//! Every start consults the registry first (invariants M1/M3) and returns
//! the failed [`StartCheck`] as data rather than an error; hooks surface the
//! message and move on.

use crate::bus::HookContext;
use crate::error::KernelError;
use omc_core::{
    AutopilotState, Clock, GoalType, ModeName, RalphState, TeamState, UltraQaState,
    UltrapilotState, UltraworkState,
};
use omc_store::{
    can_start_mode, clear_session_state, clear_state, read_state, read_state_for_session,
    write_session_state, write_state, StartCheck,
};

/// Result of a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub check: StartCheck,
    /// A linked ultrawork record was created alongside ralph.
    pub linked_ultrawork: bool,
}

impl StartOutcome {
    fn plain(check: StartCheck) -> Self {
        Self {
            check,
            linked_ultrawork: false,
        }
    }
}

/// Start the ralph loop. Unless disabled by config, a linked ultrawork
/// record is created in the same stroke and shares ralph's lifecycle.
pub fn start_ralph<C: Clock>(
    ctx: &HookContext<C>,
    prompt: &str,
    max_iterations: Option<u32>,
    prd_mode: bool,
) -> Result<StartOutcome, KernelError> {
    let now = ctx.now_ms();
    let check = can_start_mode(ModeName::Ralph, &ctx.root, now);
    if !check.allowed {
        return Ok(StartOutcome::plain(check));
    }

    let max = max_iterations.unwrap_or(ctx.config.default_max_iterations);
    let linked = !ctx.config.disable_ultrawork;
    let mut state = RalphState::new(prompt, ctx.session_id.clone(), ctx.root.clone(), max, now);
    state.prd_mode = prd_mode;
    state.linked_ultrawork = linked;
    write_state(&ctx.root, &state)?;
    // Session-scoped copy: survives cross-session reads of the shared file.
    write_session_state(&ctx.root, &ctx.session_id, &state)?;

    if linked {
        let ultrawork =
            UltraworkState::new(prompt, ctx.session_id.clone(), ctx.root.clone(), now).linked();
        write_state(&ctx.root, &ultrawork)?;
    }
    tracing::info!(max_iterations = max, prd_mode, "ralph started");
    Ok(StartOutcome {
        check,
        linked_ultrawork: linked,
    })
}

/// Activate ultrawork. Re-activation while already active is a no-op.
pub fn start_ultrawork<C: Clock>(
    ctx: &HookContext<C>,
    prompt: &str,
) -> Result<StartOutcome, KernelError> {
    if read_state::<UltraworkState>(&ctx.root).is_some_and(|s| s.active) {
        return Ok(StartOutcome::plain(StartCheck::allowed()));
    }
    let state = UltraworkState::new(
        prompt,
        ctx.session_id.clone(),
        ctx.root.clone(),
        ctx.now_ms(),
    );
    write_state(&ctx.root, &state)?;
    Ok(StartOutcome::plain(StartCheck::allowed()))
}

/// Start ultraqa. Refused while ralph is active (M3).
pub fn start_ultraqa<C: Clock>(
    ctx: &HookContext<C>,
    goal_type: GoalType,
    goal_pattern: Option<String>,
    max_cycles: u32,
) -> Result<StartOutcome, KernelError> {
    let now = ctx.now_ms();
    let check = can_start_mode(ModeName::Ultraqa, &ctx.root, now);
    if !check.allowed {
        return Ok(StartOutcome::plain(check));
    }
    let mut state = UltraQaState::new(
        goal_type,
        ctx.session_id.clone(),
        ctx.root.clone(),
        max_cycles,
        now,
    );
    state.goal_pattern = goal_pattern;
    write_state(&ctx.root, &state)?;
    Ok(StartOutcome::plain(check))
}

/// Start autopilot (exclusive).
pub fn start_autopilot<C: Clock>(
    ctx: &HookContext<C>,
    prompt: &str,
    max_validation_rounds: u32,
) -> Result<StartOutcome, KernelError> {
    let now = ctx.now_ms();
    let check = can_start_mode(ModeName::Autopilot, &ctx.root, now);
    if !check.allowed {
        return Ok(StartOutcome::plain(check));
    }
    let state = AutopilotState::new(
        prompt,
        ctx.session_id.clone(),
        ctx.root.clone(),
        max_validation_rounds,
        now,
    );
    write_state(&ctx.root, &state)?;
    Ok(StartOutcome::plain(check))
}

/// Start the team pipeline (exclusive).
pub fn start_team<C: Clock>(ctx: &HookContext<C>, prompt: &str) -> Result<StartOutcome, KernelError> {
    let now = ctx.now_ms();
    let check = can_start_mode(ModeName::TeamPipeline, &ctx.root, now);
    if !check.allowed {
        return Ok(StartOutcome::plain(check));
    }
    let state = TeamState::new(prompt, ctx.session_id.clone(), ctx.root.clone(), now);
    write_state(&ctx.root, &state)?;
    Ok(StartOutcome::plain(check))
}

/// Start ultrapilot (exclusive).
pub fn start_ultrapilot<C: Clock>(ctx: &HookContext<C>) -> Result<StartOutcome, KernelError> {
    let now = ctx.now_ms();
    let check = can_start_mode(ModeName::Ultrapilot, &ctx.root, now);
    if !check.allowed {
        return Ok(StartOutcome::plain(check));
    }
    let state = UltrapilotState::new(ctx.session_id.clone(), ctx.root.clone(), now);
    write_state(&ctx.root, &state)?;
    Ok(StartOutcome::plain(check))
}

/// Cancel one mode. Cancelling ralph also removes its linked ultrawork;
/// cancelling swarm removes the marker but keeps the database.
pub fn cancel_mode<C: Clock>(
    ctx: &HookContext<C>,
    mode: ModeName,
) -> Result<Vec<ModeName>, KernelError> {
    let mut cleared = Vec::new();
    match mode {
        ModeName::Ralph => {
            let linked = read_state::<RalphState>(&ctx.root)
                .map(|s| s.linked_ultrawork)
                .unwrap_or(false);
            if clear_state::<RalphState>(&ctx.root)? {
                cleared.push(ModeName::Ralph);
            }
            clear_session_state::<RalphState>(&ctx.root, &ctx.session_id)?;
            if linked && clear_state::<UltraworkState>(&ctx.root)? {
                cleared.push(ModeName::Ultrawork);
            }
        }
        ModeName::Swarm => {
            omc_swarm::stop_swarm(&ctx.root, false)?;
            cleared.push(ModeName::Swarm);
        }
        other => {
            omc_store::clear_mode(other, &ctx.root)?;
            cleared.push(other);
        }
    }
    Ok(cleared)
}

/// Cancel every mode bound to this session (the cancel-keyword path).
/// Returns the modes actually cleared.
pub fn cancel_all_for_session<C: Clock>(
    ctx: &HookContext<C>,
) -> Result<Vec<ModeName>, KernelError> {
    let mut cleared = Vec::new();

    if read_state_for_session::<RalphState>(&ctx.root, &ctx.session_id)
        .is_some_and(|s| s.active)
    {
        cleared.extend(cancel_mode(ctx, ModeName::Ralph)?);
    }
    if read_state_for_session::<UltraworkState>(&ctx.root, &ctx.session_id)
        .is_some_and(|s| s.active)
        && clear_state::<UltraworkState>(&ctx.root)?
    {
        cleared.push(ModeName::Ultrawork);
    }
    if read_state_for_session::<UltraQaState>(&ctx.root, &ctx.session_id)
        .is_some_and(|s| s.active)
        && clear_state::<UltraQaState>(&ctx.root)?
    {
        cleared.push(ModeName::Ultraqa);
    }
    if read_state_for_session::<AutopilotState>(&ctx.root, &ctx.session_id)
        .is_some_and(|s| s.active)
        && clear_state::<AutopilotState>(&ctx.root)?
    {
        cleared.push(ModeName::Autopilot);
    }
    if read_state_for_session::<TeamState>(&ctx.root, &ctx.session_id).is_some_and(|s| s.active)
        && clear_state::<TeamState>(&ctx.root)?
    {
        cleared.push(ModeName::TeamPipeline);
    }
    if read_state_for_session::<UltrapilotState>(&ctx.root, &ctx.session_id)
        .is_some_and(|s| s.active)
        && clear_state::<UltrapilotState>(&ctx.root)?
    {
        cleared.push(ModeName::Ultrapilot);
    }
    Ok(cleared)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
