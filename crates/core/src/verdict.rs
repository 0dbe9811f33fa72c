// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook verdict: the single JSON object written to stdout.
//!
//! Two decision channels exist on the wire. Permission decisions ride inside
//! `hookSpecificOutput.decision` (PreToolUse); stop suppression rides in the
//! top-level `decision` field (Stop). The kernel emits the deny-stop decision
//! AND mirrors its reason into `systemMessage` for hosts that ignore the
//! decision field.

use crate::hook::HookEventName;
use serde::Serialize;

/// Permission / stop decision behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionBehavior {
    Allow,
    Deny,
    Ask,
}

crate::simple_display! {
    DecisionBehavior {
        Allow => "allow",
        Deny => "deny",
        Ask => "ask",
    }
}

/// A decision with an optional human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub behavior: DecisionBehavior,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            behavior: DecisionBehavior::Allow,
            reason: Some(reason.into()),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            behavior: DecisionBehavior::Deny,
            reason: Some(reason.into()),
        }
    }
}

/// Event-specific verdict payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookSpecificOutput {
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,
    #[serde(rename = "additionalContext", skip_serializing_if = "Option::is_none")]
    pub additional_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

/// The verdict written to stdout, exactly once per hook invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    #[serde(rename = "continue")]
    pub continue_: bool,
    #[serde(rename = "suppressOutput", skip_serializing_if = "std::ops::Not::not")]
    pub suppress_output: bool,
    #[serde(rename = "systemMessage", skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

impl Verdict {
    /// Plain pass-through: the host continues, nothing injected.
    pub fn allow() -> Self {
        Self {
            continue_: true,
            suppress_output: false,
            system_message: None,
            decision: None,
            hook_specific_output: None,
        }
    }

    /// The failure fallback: never block the host on a kernel error.
    pub fn benign() -> Self {
        Self {
            suppress_output: true,
            ..Self::allow()
        }
    }

    /// Attach a system message shown to the user.
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Inject additional context for the given event.
    pub fn with_context(mut self, event: HookEventName, context: impl Into<String>) -> Self {
        let output = self.specific_output_mut(event);
        output.additional_context = Some(context.into());
        self
    }

    /// Attach a permission decision for the given event.
    pub fn with_decision(mut self, event: HookEventName, decision: Decision) -> Self {
        let output = self.specific_output_mut(event);
        output.decision = Some(decision);
        self
    }

    /// Suppress a `Stop` event: deny the stop and mirror the reason into
    /// `systemMessage` for hosts that ignore `decision`.
    pub fn deny_stop(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            system_message: Some(reason.clone()),
            decision: Some(Decision::deny(reason)),
            ..Self::allow()
        }
    }

    /// Render to the wire format (single-line JSON).
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"continue":true}"#.to_string())
    }

    fn specific_output_mut(&mut self, event: HookEventName) -> &mut HookSpecificOutput {
        self.hook_specific_output
            .get_or_insert_with(|| HookSpecificOutput {
                hook_event_name: event.to_string(),
                additional_context: None,
                decision: None,
            })
    }
}

#[cfg(test)]
#[path = "verdict_tests.rs"]
mod tests;
