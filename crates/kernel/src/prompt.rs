// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Prompt-side handlers: cancellation keywords, context injection, and
//! session start/end bookkeeping.

use crate::bus::HookContext;
use crate::context;
use crate::error::KernelError;
use crate::lifecycle::cancel_all_for_session;
use omc_core::{Clock, HookEventName, Verdict};
use omc_store::{sanitize_session_id, SkillSessions};

const CANCEL_WORDS: &[&str] = &["stop", "cancel", "abort"];

pub fn handle_session_start<C: Clock>(ctx: &HookContext<C>) -> Result<Verdict, KernelError> {
    match context::build(ctx, None)? {
        Some(text) => Ok(Verdict::allow().with_context(HookEventName::SessionStart, text)),
        None => Ok(Verdict::allow()),
    }
}

pub fn handle_user_prompt<C: Clock>(
    ctx: &HookContext<C>,
    prompt: &str,
) -> Result<Verdict, KernelError> {
    if is_cancel(prompt) {
        let cleared = cancel_all_for_session(ctx)?;
        if !cleared.is_empty() {
            let names: Vec<String> = cleared.iter().map(ToString::to_string).collect();
            return Ok(Verdict::allow()
                .with_system_message(format!("Cancelled: {}", names.join(", "))));
        }
    }
    match context::build(ctx, Some(prompt))? {
        Some(text) => Ok(Verdict::allow().with_context(HookEventName::UserPromptSubmit, text)),
        None => Ok(Verdict::allow()),
    }
}

/// Session end: drop the session-scoped state directory and dedup sets when
/// no persistent mode still holds the session.
pub fn handle_session_end<C: Clock>(ctx: &HookContext<C>) -> Result<Verdict, KernelError> {
    let active = omc_store::get_active_modes(&ctx.root, ctx.now_ms());
    if active.iter().any(|m| m.is_persistent()) {
        return Ok(Verdict::allow());
    }

    if let Ok(sid) = sanitize_session_id(&ctx.session_id) {
        if let Ok(dir) = omc_store::resolve_omc(&format!("state/sessions/{sid}"), &ctx.root) {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
    let mut dedup = SkillSessions::load(&ctx.root);
    if dedup.forget_session(&ctx.session_id) {
        dedup.save(&ctx.root)?;
    }
    Ok(Verdict::allow())
}

/// A cancel keyword as a whole word anywhere in the message, or an
/// explicit `/cancel`.
fn is_cancel(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    if lower.contains("/cancel") {
        return true;
    }
    lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| CANCEL_WORDS.contains(&token))
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
