// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permission arbiter for bash-like tool calls.
//!
//! Safe commands are auto-approved. Everything else gets NO decision — even
//! while an automated mode is active, an unsafe command falls back to the
//! host's own prompting. That asymmetry is what separates "automated mode"
//! from "blanket trust".

use crate::bus::HookContext;
use omc_core::{classify_command, Clock, CommandClass, Decision, HookEventName, Verdict};

pub fn handle<C: Clock>(
    ctx: &HookContext<C>,
    event: HookEventName,
    tool_name: &str,
    tool_input: &serde_json::Value,
) -> Verdict {
    if !is_bash_tool(tool_name) {
        // Non-bash tools pass through unchanged.
        return Verdict::allow();
    }
    let Some(command) = tool_input.get("command").and_then(|v| v.as_str()) else {
        return Verdict::allow();
    };

    match classify_command(command) {
        CommandClass::Safe { prefix } => {
            tracing::debug!(command, "auto-approved safe command");
            Verdict::allow().with_decision(event, Decision::allow(format!("Safe: {prefix}")))
        }
        CommandClass::Unsafe => {
            let active = omc_store::get_active_modes(&ctx.root, ctx.now_ms());
            if active.iter().any(|m| m.is_exclusive()) {
                tracing::debug!(
                    command,
                    "unsafe command during automated mode; deferring to host prompt"
                );
            }
            Verdict::allow()
        }
    }
}

fn is_bash_tool(tool_name: &str) -> bool {
    matches!(tool_name, "Bash" | "bash" | "Shell" | "shell")
}

#[cfg(test)]
#[path = "arbiter_tests.rs"]
mod tests;
