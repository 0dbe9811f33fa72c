// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for tests in this crate and downstream crates.

use std::path::Path;

/// Build a hook stdin payload with the common envelope fields.
pub fn hook_json(event: &str, session_id: &str, cwd: &Path) -> String {
    serde_json::json!({
        "hook_event_name": event,
        "session_id": session_id,
        "cwd": cwd.display().to_string(),
    })
    .to_string()
}

/// Build a `PreToolUse` payload for a bash command.
pub fn bash_hook_json(session_id: &str, cwd: &Path, command: &str) -> String {
    serde_json::json!({
        "hook_event_name": "PreToolUse",
        "session_id": session_id,
        "cwd": cwd.display().to_string(),
        "tool_name": "Bash",
        "tool_input": { "command": command },
    })
    .to_string()
}

/// Build a `Stop` payload.
pub fn stop_hook_json(session_id: &str, cwd: &Path, stop_hook_active: bool) -> String {
    serde_json::json!({
        "hook_event_name": "Stop",
        "session_id": session_id,
        "cwd": cwd.display().to_string(),
        "stop_hook_active": stop_hook_active,
    })
    .to_string()
}
