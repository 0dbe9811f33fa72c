// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Autopilot state: a one-way phase pipeline with a bounded QA retry loop.

use crate::mode::ModeName;
use crate::state::ModeState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Phases of an autopilot run. Transitions are unidirectional except
/// `Validation → Qa`, which retries up to `max_validation_rounds` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutopilotPhase {
    Expansion,
    Planning,
    Execution,
    Qa,
    Validation,
    Complete,
    Failed,
}

crate::simple_display! {
    AutopilotPhase {
        Expansion => "expansion",
        Planning => "planning",
        Execution => "execution",
        Qa => "qa",
        Validation => "validation",
        Complete => "complete",
        Failed => "failed",
    }
}

impl AutopilotPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, AutopilotPhase::Complete | AutopilotPhase::Failed)
    }

    /// The forward successor in the pipeline, if any.
    fn next(self) -> Option<AutopilotPhase> {
        match self {
            AutopilotPhase::Expansion => Some(AutopilotPhase::Planning),
            AutopilotPhase::Planning => Some(AutopilotPhase::Execution),
            AutopilotPhase::Execution => Some(AutopilotPhase::Qa),
            AutopilotPhase::Qa => Some(AutopilotPhase::Validation),
            AutopilotPhase::Validation => Some(AutopilotPhase::Complete),
            AutopilotPhase::Complete | AutopilotPhase::Failed => None,
        }
    }
}

/// Rejected phase transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutopilotError {
    #[error("invalid autopilot transition: {from} -> {to}")]
    InvalidTransition {
        from: AutopilotPhase,
        to: AutopilotPhase,
    },
    #[error("validation retry budget exhausted ({max} rounds)")]
    ValidationRoundsExhausted { max: u32 },
}

/// Per-phase progress entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: AutopilotPhase,
    pub entered_at: u64,
}

/// Persisted autopilot record (`autopilot-state.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutopilotState {
    pub active: bool,
    pub phase: AutopilotPhase,
    pub prompt: String,
    /// Total subagents spawned so far; monotonically increasing.
    pub agent_count: u32,
    pub validation_rounds: u32,
    pub max_validation_rounds: u32,
    #[serde(default)]
    pub phase_log: Vec<PhaseRecord>,
    pub session_id: String,
    pub project_path: PathBuf,
    pub started_at: u64,
    pub updated_at: u64,
}

impl AutopilotState {
    pub fn new(
        prompt: impl Into<String>,
        session_id: impl Into<String>,
        project_path: PathBuf,
        max_validation_rounds: u32,
        now_ms: u64,
    ) -> Self {
        Self {
            active: true,
            phase: AutopilotPhase::Expansion,
            prompt: prompt.into(),
            agent_count: 0,
            validation_rounds: 0,
            max_validation_rounds,
            phase_log: vec![PhaseRecord {
                phase: AutopilotPhase::Expansion,
                entered_at: now_ms,
            }],
            session_id: session_id.into(),
            project_path,
            started_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Move to `to`, enforcing the one-way pipeline. `Failed` is reachable
    /// from any non-terminal phase; `Validation → Qa` consumes one retry.
    pub fn advance(&mut self, to: AutopilotPhase, now_ms: u64) -> Result<(), AutopilotError> {
        let allowed = match (self.phase, to) {
            (from, AutopilotPhase::Failed) if !from.is_terminal() => true,
            (AutopilotPhase::Validation, AutopilotPhase::Qa) => {
                if self.validation_rounds >= self.max_validation_rounds {
                    return Err(AutopilotError::ValidationRoundsExhausted {
                        max: self.max_validation_rounds,
                    });
                }
                self.validation_rounds += 1;
                true
            }
            (from, to) => from.next() == Some(to),
        };
        if !allowed {
            return Err(AutopilotError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        self.updated_at = now_ms;
        self.phase_log.push(PhaseRecord {
            phase: to,
            entered_at: now_ms,
        });
        if to.is_terminal() {
            self.active = false;
        }
        Ok(())
    }

    /// Record spawned subagents; the count never decreases.
    pub fn add_agents(&mut self, spawned: u32, now_ms: u64) {
        self.agent_count += spawned;
        self.updated_at = now_ms;
    }

    /// Continuation banner, e.g. `[AUTOPILOT execution]`.
    pub fn banner(&self) -> String {
        format!("[AUTOPILOT {}]", self.phase)
    }
}

impl ModeState for AutopilotState {
    const MODE: ModeName = ModeName::Autopilot;

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
    pub struct AutopilotStateBuilder => AutopilotState {
        into {
            prompt: String = "build the feature",
            session_id: String = "sess-test",
            project_path: PathBuf = "/tmp/project",
        }
        set {
            active: bool = true,
            phase: AutopilotPhase = AutopilotPhase::Expansion,
            agent_count: u32 = 0,
            validation_rounds: u32 = 0,
            max_validation_rounds: u32 = 3,
            phase_log: Vec<PhaseRecord> = Vec::new(),
            started_at: u64 = 1_700_000_000_000,
            updated_at: u64 = 1_700_000_000_000,
        }
    }
}

#[cfg(test)]
#[path = "autopilot_tests.rs"]
mod tests;
