// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! omc-core: Pure domain types for the orchestrator kernel

pub mod macros;

pub mod clock;
pub mod command;
pub mod hook;
pub mod id;
pub mod mode;
pub mod notepad;
pub mod prd;
pub mod progress;
pub mod state;
pub mod verdict;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use command::{classify_command, CommandClass};
pub use hook::{HookEvent, HookEventName, HookInput, SetupTrigger};
pub use id::{AgentId, TaskId};
pub use mode::{ModeName, ModeStorage};
pub use notepad::Notepad;
pub use prd::{Prd, Story};
pub use progress::ProgressLog;
pub use state::autopilot::{AutopilotPhase, AutopilotState};
pub use state::ralph::RalphState;
pub use state::team::{FixLoop, TeamArtifacts, TeamPhase, TeamState, TeamTransitionError};
pub use state::ultrapilot::{UltrapilotPhase, UltrapilotState, WorkerState};
pub use state::ultraqa::{
    FailureOutcome, GoalType, UltraQaExit, UltraQaResult, UltraQaState, SAME_FAILURE_THRESHOLD,
};
pub use state::ultrawork::UltraworkState;
pub use state::ModeState;
pub use verdict::{Decision, DecisionBehavior, HookSpecificOutput, Verdict};
