// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ultrawork state: a reinforcement loop layered under ralph or standalone.

use crate::mode::ModeName;
use crate::state::ModeState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted ultrawork record (`ultrawork-state.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltraworkState {
    pub active: bool,
    pub reinforcement_count: u32,
    pub original_prompt: String,
    /// Created by a ralph start; removed together with ralph on cancel.
    #[serde(default)]
    pub linked_to_ralph: bool,
    pub session_id: String,
    pub project_path: PathBuf,
    pub started_at: u64,
    pub updated_at: u64,
}

impl UltraworkState {
    pub fn new(
        original_prompt: impl Into<String>,
        session_id: impl Into<String>,
        project_path: PathBuf,
        now_ms: u64,
    ) -> Self {
        Self {
            active: true,
            reinforcement_count: 0,
            original_prompt: original_prompt.into(),
            linked_to_ralph: false,
            session_id: session_id.into(),
            project_path,
            started_at: now_ms,
            updated_at: now_ms,
        }
    }

    pub fn linked(mut self) -> Self {
        self.linked_to_ralph = true;
        self
    }

    /// Count one reinforcement injection.
    pub fn reinforce(&mut self, now_ms: u64) -> u32 {
        self.reinforcement_count += 1;
        self.updated_at = now_ms;
        self.reinforcement_count
    }
}

impl ModeState for UltraworkState {
    const MODE: ModeName = ModeName::Ultrawork;

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
    pub struct UltraworkStateBuilder => UltraworkState {
        into {
            original_prompt: String = "keep going",
            session_id: String = "sess-test",
            project_path: PathBuf = "/tmp/project",
        }
        set {
            active: bool = true,
            reinforcement_count: u32 = 0,
            linked_to_ralph: bool = false,
            started_at: u64 = 1_700_000_000_000,
            updated_at: u64 = 1_700_000_000_000,
        }
    }
}

#[cfg(test)]
#[path = "ultrawork_tests.rs"]
mod tests;
