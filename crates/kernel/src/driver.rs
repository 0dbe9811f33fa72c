// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent-mode driver: decides whether a `Stop` is suppressed and what
//! continuation prompt the host sees.
//!
//! The deny-stop verdict carries the continuation in `decision.reason` AND
//! mirrors it into `systemMessage` — some host versions ignore the decision
//! field, and this implementation commits to emitting both.

use crate::bus::HookContext;
use crate::callbacks::{run_stop_callbacks, CALLBACK_TIMEOUT};
use crate::error::KernelError;
use omc_core::progress::ProgressLog;
use omc_core::{
    AutopilotState, Clock, ModeState, Prd, RalphState, TeamState, UltraQaState, UltrapilotState,
    UltraworkState, Verdict,
};
use omc_store::{
    clear_session_state, clear_state, read_session_state, read_state_for_session, read_string,
    resolve_omc, take_fresh_tool_error, write_session_state, write_state, ToolErrorRecord,
    TOOL_ERROR_RETRY_LIMIT,
};

pub fn handle<C: Clock>(
    ctx: &HookContext<C>,
    stop_hook_active: bool,
) -> Result<Verdict, KernelError> {
    // Already inside a stop-hook chain: let the host exit or we loop forever.
    if stop_hook_active {
        return Ok(Verdict::allow());
    }
    let now = ctx.now_ms();

    if let Some(verdict) = drive_ralph(ctx, now)? {
        return Ok(verdict);
    }
    if let Some(verdict) = drive_ultraqa(ctx, now)? {
        return Ok(verdict);
    }
    if let Some(verdict) = drive_autopilot(ctx, now)? {
        return Ok(verdict);
    }
    if let Some(verdict) = drive_team(ctx, now)? {
        return Ok(verdict);
    }
    if let Some(verdict) = drive_ultrapilot(ctx, now)? {
        return Ok(verdict);
    }
    if let Some(verdict) = drive_ultrawork(ctx, now)? {
        return Ok(verdict);
    }

    // No persistent mode holds the session: the stop stands.
    run_stop_callbacks(&ctx.config.stop_callbacks, CALLBACK_TIMEOUT);
    Ok(Verdict::allow())
}

fn drive_ralph<C: Clock>(
    ctx: &HookContext<C>,
    now: u64,
) -> Result<Option<Verdict>, KernelError> {
    // Prefer the session-scoped copy; the shared file is the fallback and
    // still refuses records bound to another session.
    let Some(mut ralph) = read_session_state::<RalphState>(&ctx.root, &ctx.session_id)
        .or_else(|| read_state_for_session::<RalphState>(&ctx.root, &ctx.session_id))
        .filter(|s| s.active)
    else {
        return Ok(None);
    };

    // PRD completion ends the loop regardless of iteration budget.
    if ralph.prd_mode {
        if let Some(prd) = load_prd(ctx) {
            if prd.is_complete() && !prd.stories.is_empty() {
                return finish_ralph(
                    ctx,
                    &ralph,
                    format!(
                        "Ralph complete: all {} PRD stories passing after {} iterations.",
                        prd.stories.len(),
                        ralph.iteration
                    ),
                )
                .map(Some);
            }
        }
    }

    ralph.increment(now);
    if ralph.is_exhausted() {
        return finish_ralph(
            ctx,
            &ralph,
            format!(
                "Ralph stopped after reaching the {}-iteration budget.",
                ralph.max_iterations
            ),
        )
        .map(Some);
    }
    write_state(&ctx.root, &ralph)?;
    write_session_state(&ctx.root, &ctx.session_id, &ralph)?;

    let mut parts = Vec::new();
    if ralph.prd_mode {
        if let Some(prd) = load_prd(ctx) {
            parts.push(prd.status_line());
        }
        parts.extend(progress_context(ctx));
    }
    if let Some(record) = take_fresh_tool_error(&ctx.root, now) {
        parts.push(tool_error_banner(&record));
    }
    parts.push(format!("{} Mode active. Continue working.", ralph.banner()));
    Ok(Some(Verdict::deny_stop(parts.join("\n"))))
}

fn finish_ralph<C: Clock>(
    ctx: &HookContext<C>,
    ralph: &RalphState,
    summary: String,
) -> Result<Verdict, KernelError> {
    clear_state::<RalphState>(&ctx.root)?;
    clear_session_state::<RalphState>(&ctx.root, &ctx.session_id)?;
    if ralph.linked_ultrawork {
        clear_state::<UltraworkState>(&ctx.root)?;
    }
    run_stop_callbacks(&ctx.config.stop_callbacks, CALLBACK_TIMEOUT);
    Ok(Verdict::allow().with_system_message(summary))
}

fn drive_ultraqa<C: Clock>(
    ctx: &HookContext<C>,
    now: u64,
) -> Result<Option<Verdict>, KernelError> {
    let Some(qa) =
        read_state_for_session::<UltraQaState>(&ctx.root, &ctx.session_id).filter(|s| s.active)
    else {
        return Ok(None);
    };

    let mut parts = Vec::new();
    if let Some(record) = take_fresh_tool_error(&ctx.root, now) {
        parts.push(tool_error_banner(&record));
    }
    let goal = match &qa.goal_pattern {
        Some(pattern) => format!("{} ({pattern})", qa.goal_type),
        None => qa.goal_type.to_string(),
    };
    parts.push(format!(
        "{} Goal: make {goal} pass. Mode active. Continue working.",
        qa.banner()
    ));
    Ok(Some(Verdict::deny_stop(parts.join("\n"))))
}

fn drive_autopilot<C: Clock>(
    ctx: &HookContext<C>,
    now: u64,
) -> Result<Option<Verdict>, KernelError> {
    let Some(mut autopilot) =
        read_state_for_session::<AutopilotState>(&ctx.root, &ctx.session_id)
            .filter(|s| s.active)
    else {
        return Ok(None);
    };
    autopilot.touch(now);
    write_state(&ctx.root, &autopilot)?;

    let mut parts = Vec::new();
    if let Some(record) = take_fresh_tool_error(&ctx.root, now) {
        parts.push(tool_error_banner(&record));
    }
    parts.push(format!(
        "{} Phase in progress ({} agents spawned). Mode active. Continue working.",
        autopilot.banner(),
        autopilot.agent_count
    ));
    Ok(Some(Verdict::deny_stop(parts.join("\n"))))
}

fn drive_team<C: Clock>(ctx: &HookContext<C>, now: u64) -> Result<Option<Verdict>, KernelError> {
    let Some(mut team) =
        read_state_for_session::<TeamState>(&ctx.root, &ctx.session_id).filter(|s| s.active)
    else {
        return Ok(None);
    };
    team.touch(now);
    write_state(&ctx.root, &team)?;

    let mut parts = Vec::new();
    if let Some(record) = take_fresh_tool_error(&ctx.root, now) {
        parts.push(tool_error_banner(&record));
    }
    parts.push(format!(
        "{} Mode active. Continue working.",
        team.banner()
    ));
    Ok(Some(Verdict::deny_stop(parts.join("\n"))))
}

fn drive_ultrapilot<C: Clock>(
    ctx: &HookContext<C>,
    now: u64,
) -> Result<Option<Verdict>, KernelError> {
    let Some(mut pilot) =
        read_state_for_session::<UltrapilotState>(&ctx.root, &ctx.session_id)
            .filter(|s| s.active)
    else {
        return Ok(None);
    };
    pilot.touch(now);
    write_state(&ctx.root, &pilot)?;

    let mut parts = Vec::new();
    if let Some(record) = take_fresh_tool_error(&ctx.root, now) {
        parts.push(tool_error_banner(&record));
    }
    parts.push(format!(
        "{} Mode active. Continue working.",
        pilot.banner()
    ));
    Ok(Some(Verdict::deny_stop(parts.join("\n"))))
}

fn drive_ultrawork<C: Clock>(
    ctx: &HookContext<C>,
    now: u64,
) -> Result<Option<Verdict>, KernelError> {
    let Some(mut ultrawork) =
        read_state_for_session::<UltraworkState>(&ctx.root, &ctx.session_id)
            .filter(|s| s.active && !s.linked_to_ralph)
    else {
        return Ok(None);
    };
    let count = ultrawork.reinforce(now);
    write_state(&ctx.root, &ultrawork)?;

    let mut parts = Vec::new();
    if let Some(record) = take_fresh_tool_error(&ctx.root, now) {
        parts.push(tool_error_banner(&record));
    }
    parts.push(format!(
        "[ULTRAWORK #{count}] Original task: {} Mode active. Continue working.",
        ultrawork.original_prompt
    ));
    Ok(Some(Verdict::deny_stop(parts.join("\n"))))
}

fn tool_error_banner(record: &ToolErrorRecord) -> String {
    if record.retry_count >= TOOL_ERROR_RETRY_LIMIT {
        format!(
            "[TOOL ERROR] {} keeps failing after {} attempts: {}. Alternative approach needed; do not repeat the same call.",
            record.tool_name, record.retry_count, record.error
        )
    } else {
        format!(
            "[TOOL ERROR] {} failed (attempt {}/{}): {}. Retry with corrected parameters.",
            record.tool_name, record.retry_count, TOOL_ERROR_RETRY_LIMIT, record.error
        )
    }
}

fn load_prd<C: Clock>(ctx: &HookContext<C>) -> Option<Prd> {
    let path = resolve_omc("prd.json", &ctx.root).ok()?;
    Prd::parse(&read_string(&path)?)
}

/// Patterns plus the most recent progress entry, for prd-mode continuations.
fn progress_context<C: Clock>(ctx: &HookContext<C>) -> Vec<String> {
    let Some(path) = resolve_omc("progress.txt", &ctx.root).ok() else {
        return Vec::new();
    };
    let Some(text) = read_string(&path) else {
        return Vec::new();
    };
    let log = ProgressLog::parse(&text);
    let mut out = Vec::new();
    if !log.patterns.is_empty() {
        out.push(format!("Patterns: {}", log.patterns.join("; ")));
    }
    if let Some(last) = log.recent(1).first() {
        out.push(format!("Last progress: {}", last.lines().next().unwrap_or("")));
    }
    out
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
