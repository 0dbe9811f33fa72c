// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ralph loop state: iterate on a fixed prompt until done or exhausted.

use crate::mode::ModeName;
use crate::state::ModeState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted ralph record (`ralph-state.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RalphState {
    pub active: bool,
    pub iteration: u32,
    pub max_iterations: u32,
    pub prompt: String,
    pub session_id: String,
    pub project_path: PathBuf,
    pub started_at: u64,
    pub updated_at: u64,
    /// A linked ultrawork record was created alongside this one and shares
    /// its lifecycle (removed together on cancel).
    #[serde(default)]
    pub linked_ultrawork: bool,
    /// Completion is judged by the PRD (all stories pass) instead of by
    /// iteration count alone.
    #[serde(default)]
    pub prd_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_story_id: Option<String>,
}

impl RalphState {
    pub fn new(
        prompt: impl Into<String>,
        session_id: impl Into<String>,
        project_path: PathBuf,
        max_iterations: u32,
        now_ms: u64,
    ) -> Self {
        Self {
            active: true,
            iteration: 1,
            max_iterations,
            prompt: prompt.into(),
            session_id: session_id.into(),
            project_path,
            started_at: now_ms,
            updated_at: now_ms,
            linked_ultrawork: false,
            prd_mode: false,
            current_story_id: None,
        }
    }

    /// Bump the iteration counter. Returns the new value.
    pub fn increment(&mut self, now_ms: u64) -> u32 {
        self.iteration += 1;
        self.updated_at = now_ms;
        self.iteration
    }

    /// True once the iteration counter has run past the budget.
    pub fn is_exhausted(&self) -> bool {
        self.iteration > self.max_iterations
    }

    /// Continuation banner, e.g. `[RALPH #6/50]`.
    pub fn banner(&self) -> String {
        format!("[RALPH #{}/{}]", self.iteration, self.max_iterations)
    }
}

impl ModeState for RalphState {
    const MODE: ModeName = ModeName::Ralph;

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

crate::builder! {
    pub struct RalphStateBuilder => RalphState {
        into {
            prompt: String = "work the plan",
            session_id: String = "sess-test",
            project_path: PathBuf = "/tmp/project",
        }
        set {
            active: bool = true,
            iteration: u32 = 1,
            max_iterations: u32 = 50,
            started_at: u64 = 1_700_000_000_000,
            updated_at: u64 = 1_700_000_000_000,
            linked_ultrawork: bool = false,
            prd_mode: bool = false,
        }
        option {
            current_story_id: String = None,
        }
    }
}

#[cfg(test)]
#[path = "ralph_tests.rs"]
mod tests;
