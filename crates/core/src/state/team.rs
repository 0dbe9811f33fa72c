// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Team-pipeline state: a table-driven phase machine with artifact guards
//! and a bounded fix loop.

use crate::mode::ModeName;
use crate::state::ModeState;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default bound on `team-fix → team-exec` repair attempts.
pub const FIX_LOOP_MAX_ATTEMPTS: u32 = 3;

/// Failure reason recorded when the fix loop runs out of attempts.
pub const FIX_LOOP_EXHAUSTED: &str = "fix-loop-max-attempts-exceeded";

/// Phases of a team-pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeamPhase {
    TeamPlan,
    TeamPrd,
    TeamExec,
    TeamVerify,
    TeamFix,
    Complete,
    Failed,
    Cancelled,
}

crate::simple_display! {
    TeamPhase {
        TeamPlan => "team-plan",
        TeamPrd => "team-prd",
        TeamExec => "team-exec",
        TeamVerify => "team-verify",
        TeamFix => "team-fix",
        Complete => "complete",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl TeamPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, TeamPhase::Complete | TeamPhase::Failed | TeamPhase::Cancelled)
    }
}

/// Allowed phase transitions. Cancellation and failure edges from every
/// non-terminal phase are implicit; this table covers the forward flow.
const ALLOWED: &[(TeamPhase, TeamPhase)] = &[
    (TeamPhase::TeamPlan, TeamPhase::TeamPrd),
    (TeamPhase::TeamPrd, TeamPhase::TeamExec),
    (TeamPhase::TeamExec, TeamPhase::TeamVerify),
    (TeamPhase::TeamVerify, TeamPhase::TeamFix),
    (TeamPhase::TeamVerify, TeamPhase::Complete),
    (TeamPhase::TeamFix, TeamPhase::TeamExec),
];

/// Artifacts the guard consults before permitting a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamArtifacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prd_path: Option<PathBuf>,
    #[serde(default)]
    pub tasks_total: u32,
    #[serde(default)]
    pub tasks_completed: u32,
}

/// Fix-loop bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixLoop {
    pub attempt: u32,
    pub max_attempts: u32,
}

impl Default for FixLoop {
    fn default() -> Self {
        Self {
            attempt: 0,
            max_attempts: FIX_LOOP_MAX_ATTEMPTS,
        }
    }
}

/// Rejected team transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TeamTransitionError {
    #[error("invalid team transition: {from} -> {to}")]
    NotAllowed { from: TeamPhase, to: TeamPhase },
    #[error("team-exec requires a plan or PRD artifact")]
    MissingPlanOrPrd,
    #[error("team-verify requires all tasks completed ({completed}/{total})")]
    TasksIncomplete { completed: u32, total: u32 },
}

/// Persisted team-pipeline record (`team-pipeline-state.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamState {
    pub active: bool,
    pub phase: TeamPhase,
    pub prompt: String,
    #[serde(default)]
    pub artifacts: TeamArtifacts,
    #[serde(default)]
    pub fix_loop: FixLoop,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub session_id: String,
    pub project_path: PathBuf,
    pub started_at: u64,
    pub updated_at: u64,
}

impl TeamState {
    pub fn new(
        prompt: impl Into<String>,
        session_id: impl Into<String>,
        project_path: PathBuf,
        now_ms: u64,
    ) -> Self {
        Self {
            active: true,
            phase: TeamPhase::TeamPlan,
            prompt: prompt.into(),
            artifacts: TeamArtifacts::default(),
            fix_loop: FixLoop::default(),
            failure_reason: None,
            session_id: session_id.into(),
            project_path,
            started_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Check the transition table plus artifact guards, without mutating.
    pub fn can_transition(&self, to: TeamPhase) -> Result<(), TeamTransitionError> {
        // Failure/cancellation edges exist from every non-terminal phase.
        if matches!(to, TeamPhase::Failed | TeamPhase::Cancelled) {
            return if self.phase.is_terminal() {
                Err(TeamTransitionError::NotAllowed {
                    from: self.phase,
                    to,
                })
            } else {
                Ok(())
            };
        }
        if !ALLOWED.contains(&(self.phase, to)) {
            return Err(TeamTransitionError::NotAllowed {
                from: self.phase,
                to,
            });
        }
        match to {
            TeamPhase::TeamExec => {
                if self.artifacts.plan_path.is_none() && self.artifacts.prd_path.is_none() {
                    return Err(TeamTransitionError::MissingPlanOrPrd);
                }
            }
            TeamPhase::TeamVerify => {
                if self.artifacts.tasks_completed < self.artifacts.tasks_total {
                    return Err(TeamTransitionError::TasksIncomplete {
                        completed: self.artifacts.tasks_completed,
                        total: self.artifacts.tasks_total,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Perform a guarded transition.
    ///
    /// Entering `team-fix` consumes one fix attempt; once the budget is
    /// exceeded the state auto-transitions to `failed` with
    /// [`FIX_LOOP_EXHAUSTED`] and the original request is rejected.
    pub fn transition(&mut self, to: TeamPhase, now_ms: u64) -> Result<TeamPhase, TeamTransitionError> {
        self.can_transition(to)?;
        if to == TeamPhase::TeamFix {
            self.fix_loop.attempt += 1;
            if self.fix_loop.attempt > self.fix_loop.max_attempts {
                self.phase = TeamPhase::Failed;
                self.failure_reason = Some(FIX_LOOP_EXHAUSTED.to_string());
                self.active = false;
                self.updated_at = now_ms;
                return Ok(TeamPhase::Failed);
            }
        }
        self.phase = to;
        self.updated_at = now_ms;
        if to.is_terminal() {
            self.active = false;
        }
        Ok(to)
    }

    /// Continuation banner, e.g. `[TEAM team-exec]`.
    pub fn banner(&self) -> String {
        format!("[TEAM {}]", self.phase)
    }
}

impl ModeState for TeamState {
    const MODE: ModeName = ModeName::TeamPipeline;

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
    pub struct TeamStateBuilder => TeamState {
        into {
            prompt: String = "ship the feature",
            session_id: String = "sess-test",
            project_path: PathBuf = "/tmp/project",
        }
        set {
            active: bool = true,
            phase: TeamPhase = TeamPhase::TeamPlan,
            artifacts: TeamArtifacts = TeamArtifacts::default(),
            fix_loop: FixLoop = FixLoop::default(),
            started_at: u64 = 1_700_000_000_000,
            updated_at: u64 = 1_700_000_000_000,
        }
        option {
            failure_reason: String = None,
        }
    }
}

#[cfg(test)]
#[path = "team_tests.rs"]
mod tests;
