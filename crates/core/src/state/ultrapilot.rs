// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ultrapilot state: parallel workers over a partitioned task decomposition,
//! with explicit file-ownership tracking to keep workers off each other's
//! files.

use crate::mode::ModeName;
use crate::state::ModeState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Phases of an ultrapilot run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UltrapilotPhase {
    Decompose,
    Partition,
    Execute,
    Integrate,
    Validate,
    Complete,
    Failed,
}

crate::simple_display! {
    UltrapilotPhase {
        Decompose => "decompose",
        Partition => "partition",
        Execute => "execute",
        Integrate => "integrate",
        Validate => "validate",
        Complete => "complete",
        Failed => "failed",
    }
}

impl UltrapilotPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, UltrapilotPhase::Complete | UltrapilotPhase::Failed)
    }

    fn next(self) -> Option<UltrapilotPhase> {
        match self {
            UltrapilotPhase::Decompose => Some(UltrapilotPhase::Partition),
            UltrapilotPhase::Partition => Some(UltrapilotPhase::Execute),
            UltrapilotPhase::Execute => Some(UltrapilotPhase::Integrate),
            UltrapilotPhase::Integrate => Some(UltrapilotPhase::Validate),
            UltrapilotPhase::Validate => Some(UltrapilotPhase::Complete),
            UltrapilotPhase::Complete | UltrapilotPhase::Failed => None,
        }
    }
}

/// Status of one parallel worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Pending,
    Running,
    Done,
    Failed,
}

/// One worker's slice of the decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerState {
    pub status: WorkerStatus,
    pub task: String,
    #[serde(default)]
    pub files_owned: Vec<String>,
}

/// Rejected ultrapilot operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UltrapilotError {
    #[error("invalid ultrapilot transition: {from} -> {to}")]
    InvalidTransition {
        from: UltrapilotPhase,
        to: UltrapilotPhase,
    },
    #[error("file {path} already owned by worker {owner}")]
    FileConflict { path: String, owner: String },
    #[error("unknown worker: {0}")]
    UnknownWorker(String),
}

/// Persisted ultrapilot record (`ultrapilot-state.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UltrapilotState {
    pub active: bool,
    pub phase: UltrapilotPhase,
    /// Free-form decomposition summary produced by the decompose phase.
    pub decomposition: String,
    pub workers: BTreeMap<String, WorkerState>,
    /// Files intentionally shared across workers; claims on these never conflict.
    #[serde(default)]
    pub shared_files: Vec<String>,
    /// Conflict log, e.g. `src/api.rs: w1 vs w2`.
    #[serde(default)]
    pub conflicts: Vec<String>,
    pub validation_attempts: u32,
    pub session_id: String,
    pub project_path: PathBuf,
    pub started_at: u64,
    pub updated_at: u64,
}

impl UltrapilotState {
    pub fn new(session_id: impl Into<String>, project_path: PathBuf, now_ms: u64) -> Self {
        Self {
            active: true,
            phase: UltrapilotPhase::Decompose,
            decomposition: String::new(),
            workers: BTreeMap::new(),
            shared_files: Vec::new(),
            conflicts: Vec::new(),
            validation_attempts: 0,
            session_id: session_id.into(),
            project_path,
            started_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Move forward in the pipeline. `Failed` is reachable from any active
    /// phase; `Validate → Integrate` is the retry edge and counts an attempt.
    pub fn advance(&mut self, to: UltrapilotPhase, now_ms: u64) -> Result<(), UltrapilotError> {
        let allowed = match (self.phase, to) {
            (from, UltrapilotPhase::Failed) if !from.is_terminal() => true,
            (UltrapilotPhase::Validate, UltrapilotPhase::Integrate) => {
                self.validation_attempts += 1;
                true
            }
            (from, to) => from.next() == Some(to),
        };
        if !allowed {
            return Err(UltrapilotError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        self.phase = to;
        self.updated_at = now_ms;
        if to.is_terminal() {
            self.active = false;
        }
        Ok(())
    }

    /// Register a worker with its task slice.
    pub fn add_worker(&mut self, id: impl Into<String>, task: impl Into<String>, now_ms: u64) {
        self.workers.insert(
            id.into(),
            WorkerState {
                status: WorkerStatus::Pending,
                task: task.into(),
                files_owned: Vec::new(),
            },
        );
        self.updated_at = now_ms;
    }

    /// Claim a file for a worker.
    ///
    /// Shared files always succeed. A file owned by another worker records a
    /// conflict and fails; re-claiming one's own file is a no-op.
    pub fn claim_file(
        &mut self,
        worker_id: &str,
        path: &str,
        now_ms: u64,
    ) -> Result<(), UltrapilotError> {
        if self.shared_files.iter().any(|f| f == path) {
            return Ok(());
        }
        if let Some((owner, _)) = self
            .workers
            .iter()
            .find(|(id, w)| id.as_str() != worker_id && w.files_owned.iter().any(|f| f == path))
        {
            let owner = owner.clone();
            self.conflicts.push(format!("{path}: {owner} vs {worker_id}"));
            self.updated_at = now_ms;
            return Err(UltrapilotError::FileConflict {
                path: path.to_string(),
                owner,
            });
        }
        let worker = self
            .workers
            .get_mut(worker_id)
            .ok_or_else(|| UltrapilotError::UnknownWorker(worker_id.to_string()))?;
        if !worker.files_owned.iter().any(|f| f == path) {
            worker.files_owned.push(path.to_string());
        }
        self.updated_at = now_ms;
        Ok(())
    }

    pub fn set_worker_status(
        &mut self,
        worker_id: &str,
        status: WorkerStatus,
        now_ms: u64,
    ) -> Result<(), UltrapilotError> {
        let worker = self
            .workers
            .get_mut(worker_id)
            .ok_or_else(|| UltrapilotError::UnknownWorker(worker_id.to_string()))?;
        worker.status = status;
        self.updated_at = now_ms;
        Ok(())
    }

    /// All workers have finished (done or failed).
    pub fn workers_settled(&self) -> bool {
        self.workers
            .values()
            .all(|w| matches!(w.status, WorkerStatus::Done | WorkerStatus::Failed))
    }

    /// Continuation banner, e.g. `[ULTRAPILOT execute 2/3 workers]`.
    pub fn banner(&self) -> String {
        let done = self
            .workers
            .values()
            .filter(|w| w.status == WorkerStatus::Done)
            .count();
        format!(
            "[ULTRAPILOT {} {done}/{} workers]",
            self.phase,
            self.workers.len()
        )
    }
}

impl ModeState for UltrapilotState {
    const MODE: ModeName = ModeName::Ultrapilot;

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

#[cfg(test)]
#[path = "ultrapilot_tests.rs"]
mod tests;
