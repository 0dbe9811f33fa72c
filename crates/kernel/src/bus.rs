// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hook bus: one typed event in, exactly one verdict out.

use crate::config::OmcConfig;
use crate::error::KernelError;
use crate::{arbiter, checkpoint, driver, observe, prompt, setup, tracker};
use omc_core::{Clock, HookEvent, HookInput, Verdict};
use std::path::PathBuf;

/// Everything a handler needs about this invocation.
pub struct HookContext<C: Clock> {
    /// Worktree root (trusted; derived from cwd, never from user input).
    pub root: PathBuf,
    /// Effective session id (host-supplied or pid fallback).
    pub session_id: String,
    pub clock: C,
    pub config: OmcConfig,
}

impl<C: Clock> HookContext<C> {
    pub fn new(root: PathBuf, session_id: String, clock: C) -> Self {
        let config = OmcConfig::load(&root);
        Self {
            root,
            session_id,
            clock,
            config,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.epoch_ms()
    }
}

/// Dispatch a raw hook input.
///
/// Unknown events and every handler error collapse into the benign verdict:
/// the kernel never blocks host progress on its own failure.
pub fn dispatch<C: Clock>(input: &HookInput, ctx: &HookContext<C>) -> Verdict {
    let Some(event) = input.event() else {
        return Verdict::benign();
    };
    let name = event.name();
    match route(event, ctx) {
        Ok(verdict) => verdict,
        Err(err) => {
            tracing::warn!(event = %name, %err, "hook handler failed; emitting benign verdict");
            Verdict::benign()
        }
    }
}

fn route<C: Clock>(event: HookEvent, ctx: &HookContext<C>) -> Result<Verdict, KernelError> {
    let name = event.name();
    match event {
        HookEvent::SessionStart => prompt::handle_session_start(ctx),
        HookEvent::Setup { trigger } => setup::handle(ctx, trigger),
        HookEvent::UserPromptSubmit { prompt } => prompt::handle_user_prompt(ctx, &prompt),
        HookEvent::PreToolUse {
            tool_name,
            tool_input,
        }
        | HookEvent::PermissionRequest {
            tool_name,
            tool_input,
        } => Ok(arbiter::handle(ctx, name, &tool_name, &tool_input)),
        HookEvent::PostToolUse {
            tool_name,
            tool_input,
            tool_response,
        } => observe::handle(ctx, &tool_name, &tool_input, &tool_response),
        HookEvent::Stop { stop_hook_active } => driver::handle(ctx, stop_hook_active),
        HookEvent::PreCompact { manual } => checkpoint::handle(ctx, manual),
        HookEvent::SubagentStart => tracker::handle_start(ctx),
        HookEvent::SubagentStop => tracker::handle_stop(ctx),
        HookEvent::SessionEnd => prompt::handle_session_end(ctx),
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
