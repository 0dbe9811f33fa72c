// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook protocol input: the JSON object the host writes to our stdin.
//!
//! [`HookInput`] is the tolerant wire shape — every field defaulted so a
//! partial or future payload still parses. [`HookEvent`] is the typed variant
//! the bus dispatches on; unknown event names map to `None` and the caller
//! emits a benign verdict.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

/// Closed set of hook event names the host can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEventName {
    SessionStart,
    Setup,
    UserPromptSubmit,
    PreToolUse,
    PostToolUse,
    PermissionRequest,
    Stop,
    PreCompact,
    SubagentStart,
    SubagentStop,
    SessionEnd,
}

crate::simple_display! {
    HookEventName {
        SessionStart => "SessionStart",
        Setup => "Setup",
        UserPromptSubmit => "UserPromptSubmit",
        PreToolUse => "PreToolUse",
        PostToolUse => "PostToolUse",
        PermissionRequest => "PermissionRequest",
        Stop => "Stop",
        PreCompact => "PreCompact",
        SubagentStart => "SubagentStart",
        SubagentStop => "SubagentStop",
        SessionEnd => "SessionEnd",
    }
}

impl FromStr for HookEventName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SessionStart" => Ok(Self::SessionStart),
            "Setup" => Ok(Self::Setup),
            "UserPromptSubmit" => Ok(Self::UserPromptSubmit),
            "PreToolUse" => Ok(Self::PreToolUse),
            "PostToolUse" => Ok(Self::PostToolUse),
            "PermissionRequest" => Ok(Self::PermissionRequest),
            "Stop" => Ok(Self::Stop),
            "PreCompact" => Ok(Self::PreCompact),
            "SubagentStart" => Ok(Self::SubagentStart),
            "SubagentStop" => Ok(Self::SubagentStop),
            "SessionEnd" => Ok(Self::SessionEnd),
            _ => Err(()),
        }
    }
}

/// Trigger argument of `Setup` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupTrigger {
    Init,
    Maintenance,
}

crate::simple_display! {
    SetupTrigger {
        Init => "init",
        Maintenance => "maintenance",
    }
}

/// Raw hook payload as received on stdin (subset of fields we care about).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub hook_event_name: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub tool_input: Option<serde_json::Value>,
    #[serde(default)]
    pub tool_response: Option<serde_json::Value>,
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<PathBuf>,
    #[serde(default)]
    pub stop_hook_active: bool,
}

impl HookInput {
    /// Parse a raw stdin payload. Returns `Default` (empty event name) on
    /// malformed JSON so the caller falls through to the benign verdict.
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// The typed event, or `None` when the event name is unknown.
    pub fn event(&self) -> Option<HookEvent> {
        let name = self.hook_event_name.parse::<HookEventName>().ok()?;
        let event = match name {
            HookEventName::SessionStart => HookEvent::SessionStart,
            HookEventName::Setup => HookEvent::Setup {
                trigger: match self.trigger.as_deref() {
                    Some("maintenance") => SetupTrigger::Maintenance,
                    _ => SetupTrigger::Init,
                },
            },
            HookEventName::UserPromptSubmit => HookEvent::UserPromptSubmit {
                prompt: self.prompt.clone().unwrap_or_default(),
            },
            HookEventName::PreToolUse => HookEvent::PreToolUse {
                tool_name: self.tool_name.clone().unwrap_or_default(),
                tool_input: self.tool_input.clone().unwrap_or(serde_json::Value::Null),
            },
            HookEventName::PostToolUse => HookEvent::PostToolUse {
                tool_name: self.tool_name.clone().unwrap_or_default(),
                tool_input: self.tool_input.clone().unwrap_or(serde_json::Value::Null),
                tool_response: self.tool_response.clone().unwrap_or(serde_json::Value::Null),
            },
            HookEventName::PermissionRequest => HookEvent::PermissionRequest {
                tool_name: self.tool_name.clone().unwrap_or_default(),
                tool_input: self.tool_input.clone().unwrap_or(serde_json::Value::Null),
            },
            HookEventName::Stop => HookEvent::Stop {
                stop_hook_active: self.stop_hook_active,
            },
            HookEventName::PreCompact => HookEvent::PreCompact {
                manual: self.trigger.as_deref() == Some("manual"),
            },
            HookEventName::SubagentStart => HookEvent::SubagentStart,
            HookEventName::SubagentStop => HookEvent::SubagentStop,
            HookEventName::SessionEnd => HookEvent::SessionEnd,
        };
        Some(event)
    }
}

/// Typed hook event, dispatched by the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum HookEvent {
    SessionStart,
    Setup {
        trigger: SetupTrigger,
    },
    UserPromptSubmit {
        prompt: String,
    },
    PreToolUse {
        tool_name: String,
        tool_input: serde_json::Value,
    },
    PostToolUse {
        tool_name: String,
        tool_input: serde_json::Value,
        tool_response: serde_json::Value,
    },
    PermissionRequest {
        tool_name: String,
        tool_input: serde_json::Value,
    },
    Stop {
        stop_hook_active: bool,
    },
    PreCompact {
        manual: bool,
    },
    SubagentStart,
    SubagentStop,
    SessionEnd,
}

impl HookEvent {
    /// The wire name of this event (echoed back in `hookSpecificOutput`).
    pub fn name(&self) -> HookEventName {
        match self {
            HookEvent::SessionStart => HookEventName::SessionStart,
            HookEvent::Setup { .. } => HookEventName::Setup,
            HookEvent::UserPromptSubmit { .. } => HookEventName::UserPromptSubmit,
            HookEvent::PreToolUse { .. } => HookEventName::PreToolUse,
            HookEvent::PostToolUse { .. } => HookEventName::PostToolUse,
            HookEvent::PermissionRequest { .. } => HookEventName::PermissionRequest,
            HookEvent::Stop { .. } => HookEventName::Stop,
            HookEvent::PreCompact { .. } => HookEventName::PreCompact,
            HookEvent::SubagentStart => HookEventName::SubagentStart,
            HookEvent::SubagentStop => HookEventName::SubagentStop,
            HookEvent::SessionEnd => HookEventName::SessionEnd,
        }
    }
}

#[cfg(test)]
#[path = "hook_tests.rs"]
mod tests;
