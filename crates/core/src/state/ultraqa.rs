// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UltraQA state: drive a quality goal (tests, build, lint) to green,
//! bailing out on repeated identical failures or cycle exhaustion.

use crate::mode::ModeName;
use crate::state::ModeState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Consecutive identical failures (after normalization) that end the loop.
pub const SAME_FAILURE_THRESHOLD: usize = 3;

/// What kind of goal the loop is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Tests,
    Build,
    Lint,
    Typecheck,
    Custom,
}

crate::simple_display! {
    GoalType {
        Tests => "tests",
        Build => "build",
        Lint => "lint",
        Typecheck => "typecheck",
        Custom => "custom",
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UltraQaExit {
    Completed,
    Stopped,
    Cancelled,
    SameFailure,
    MaxCycles,
}

crate::simple_display! {
    UltraQaExit {
        Completed => "completed",
        Stopped => "stopped",
        Cancelled => "cancelled",
        SameFailure => "same_failure",
        MaxCycles => "max_cycles",
    }
}

/// Result handed back when the loop ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UltraQaResult {
    pub reason: UltraQaExit,
    pub cycles: u32,
    pub failures: Vec<String>,
}

/// Outcome of recording one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Keep looping; `cycle` is the cycle now in progress.
    Continue { cycle: u32 },
    /// Terminal: the caller clears state and reports the result.
    Exit(UltraQaExit),
}

/// Persisted ultraqa record (`ultraqa-state.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltraQaState {
    pub active: bool,
    pub goal_type: GoalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_pattern: Option<String>,
    pub cycle: u32,
    pub max_cycles: u32,
    pub failures: Vec<String>,
    pub session_id: String,
    pub project_path: PathBuf,
    pub started_at: u64,
    pub updated_at: u64,
}

impl UltraQaState {
    pub fn new(
        goal_type: GoalType,
        session_id: impl Into<String>,
        project_path: PathBuf,
        max_cycles: u32,
        now_ms: u64,
    ) -> Self {
        Self {
            active: true,
            goal_type,
            goal_pattern: None,
            cycle: 1,
            max_cycles,
            failures: Vec::new(),
            session_id: session_id.into(),
            project_path,
            started_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Record a failed QA cycle.
    ///
    /// Appends the failure, then exits with `same_failure` when the last
    /// [`SAME_FAILURE_THRESHOLD`] normalized failures are identical, or with
    /// `max_cycles` when the cycle budget runs out.
    pub fn record_failure(&mut self, description: impl Into<String>, now_ms: u64) -> FailureOutcome {
        self.failures.push(description.into());
        self.updated_at = now_ms;

        if self.failures.len() >= SAME_FAILURE_THRESHOLD {
            let tail = &self.failures[self.failures.len() - SAME_FAILURE_THRESHOLD..];
            let first = normalize_failure(&tail[0]);
            if tail[1..].iter().all(|f| normalize_failure(f) == first) {
                return FailureOutcome::Exit(UltraQaExit::SameFailure);
            }
        }

        self.cycle += 1;
        if self.cycle > self.max_cycles {
            return FailureOutcome::Exit(UltraQaExit::MaxCycles);
        }
        FailureOutcome::Continue { cycle: self.cycle }
    }

    /// Deactivate and produce the terminal result.
    pub fn finish(mut self, reason: UltraQaExit) -> UltraQaResult {
        self.active = false;
        UltraQaResult {
            reason,
            cycles: self.cycle,
            failures: self.failures,
        }
    }

    /// Continuation banner, e.g. `[ULTRAQA tests #2/10]`.
    pub fn banner(&self) -> String {
        format!("[ULTRAQA {} #{}/{}]", self.goal_type, self.cycle, self.max_cycles)
    }
}

impl ModeState for UltraQaState {
    const MODE: ModeName = ModeName::Ultraqa;

    fn is_active(&self) -> bool {
        self.active
    }

    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn touch(&mut self, now_ms: u64) {
        self.updated_at = now_ms;
    }
}

/// Normalize a failure description for repeat detection.
///
/// Lowercases, drops timestamp and duration tokens, strips `:line:col`
/// suffixes, and collapses whitespace, so two runs of the same failing test
/// compare equal despite differing stamps and timings.
pub fn normalize_failure(description: &str) -> String {
    description
        .split_whitespace()
        .filter_map(|token| {
            let token = token.to_lowercase();
            if looks_like_timestamp(&token) || looks_like_duration(&token) {
                return None;
            }
            let token = strip_line_col(&token);
            (!token.is_empty()).then_some(token)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `2026-01-02T03:04:05Z`, `2026-01-02`, optionally wrapped in brackets.
fn looks_like_timestamp(token: &str) -> bool {
    let token = token.trim_matches(|c| c == '[' || c == ']' || c == '(' || c == ')');
    let bytes = token.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// `12ms`, `3.4ms`, `1200ms,` — a number glued to a millisecond unit.
fn looks_like_duration(token: &str) -> bool {
    let token = token.trim_end_matches(|c: char| c == ',' || c == ';' || c == ')');
    let Some(number) = token.strip_suffix("ms") else {
        return false;
    };
    !number.is_empty() && number.chars().all(|c| c.is_ascii_digit() || c == '.')
}

/// `src/lib.rs:42:7` → `src/lib.rs` (trailing numeric segments removed).
fn strip_line_col(token: &str) -> String {
    let mut parts: Vec<&str> = token.split(':').collect();
    while parts.len() > 1 {
        let last = parts[parts.len() - 1];
        if !last.is_empty() && last.chars().all(|c| c.is_ascii_digit()) {
            parts.pop();
        } else {
            break;
        }
    }
    parts.join(":")
}

crate::builder! {
    pub struct UltraQaStateBuilder => UltraQaState {
        into {
            session_id: String = "sess-test",
            project_path: PathBuf = "/tmp/project",
        }
        set {
            active: bool = true,
            goal_type: GoalType = GoalType::Tests,
            cycle: u32 = 1,
            max_cycles: u32 = 10,
            failures: Vec<String> = Vec::new(),
            started_at: u64 = 1_700_000_000_000,
            updated_at: u64 = 1_700_000_000_000,
        }
        option {
            goal_pattern: String = None,
        }
    }
}

#[cfg(test)]
#[path = "ultraqa_tests.rs"]
mod tests;
