// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task-queue operations. Every state mutation runs inside one
//! `BEGIN IMMEDIATE` transaction, so concurrent workers in separate
//! processes serialize on the database and a claim can never be held by two
//! agents at once.

use crate::db::SwarmDb;
use crate::error::SwarmError;
use crate::task::{SwarmTask, TaskSpec, TaskStatus, DEFAULT_MAX_RETRIES};
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Rescans after losing a claim race before giving up.
pub const CLAIM_RETRIES: u32 = 3;

/// Default heartbeat-staleness threshold for claim reclamation.
pub const STALE_CLAIM_MS: u64 = 5 * 60 * 1000;

const NO_PENDING: &str = "No pending tasks available";

/// Outcome of a claim attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ClaimOutcome {
    fn claimed(task_id: String, description: String) -> Self {
        Self {
            success: true,
            task_id: Some(task_id),
            description: Some(description),
            reason: None,
        }
    }

    fn none() -> Self {
        Self {
            success: false,
            task_id: None,
            description: None,
            reason: Some(NO_PENDING.to_string()),
        }
    }

    fn busy() -> Self {
        Self {
            success: false,
            task_id: None,
            description: None,
            reason: Some("database busy".to_string()),
        }
    }
}

/// Outcome of a failure report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// Retry budget left: task reset to `pending`.
    Requeued { retry_count: u32 },
    /// Budget exhausted (or non-retryable): task marked `failed`.
    Failed,
}

/// Task counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub pending: u32,
    pub claimed: u32,
    pub running: u32,
    pub completed: u32,
    pub failed: u32,
}

impl TaskCounts {
    pub fn total(&self) -> u32 {
        self.pending + self.claimed + self.running + self.completed + self.failed
    }

    /// One-line summary for banners and checkpoints.
    pub fn summary(&self) -> String {
        format!(
            "{} pending, {} claimed, {} running, {} completed, {} failed",
            self.pending, self.claimed, self.running, self.completed, self.failed
        )
    }
}

impl SwarmDb {
    /// Create the session row if absent (idempotent).
    pub fn init_session(
        &mut self,
        session_id: &str,
        agent_count: u32,
        now_ms: u64,
    ) -> Result<(), SwarmError> {
        self.conn.execute(
            "INSERT OR IGNORE INTO session (id, agent_count, started_at) VALUES (?1, ?2, ?3)",
            params![session_id, agent_count, now_ms as i64],
        )?;
        Ok(())
    }

    /// Bulk-insert tasks as `pending`. Duplicate ids are rejected by the
    /// primary key. Returns the number inserted.
    pub fn add_tasks(&mut self, specs: &[TaskSpec], now_ms: u64) -> Result<usize, SwarmError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (id, description, status, max_retries, created_at)
                 VALUES (?1, ?2, 'pending', ?3, ?4)",
            )?;
            for spec in specs {
                inserted += stmt.execute(params![
                    spec.id,
                    spec.description,
                    spec.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
                    now_ms as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// Claim the oldest pending task for `agent_id`.
    ///
    /// A lost `UPDATE` race rescans up to [`CLAIM_RETRIES`] times. An empty
    /// queue or a busy database yields a structured failure, never an error.
    pub fn claim_task(
        &mut self,
        agent_id: &str,
        now_ms: u64,
    ) -> Result<ClaimOutcome, SwarmError> {
        match self.try_claim(agent_id, now_ms) {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_busy() => Ok(ClaimOutcome::busy()),
            Err(err) => Err(err),
        }
    }

    fn try_claim(&mut self, agent_id: &str, now_ms: u64) -> Result<ClaimOutcome, SwarmError> {
        for _ in 0..=CLAIM_RETRIES {
            let tx = self
                .conn
                .transaction_with_behavior(TransactionBehavior::Immediate)?;

            let candidate: Option<(String, String)> = tx
                .query_row(
                    "SELECT id, description FROM tasks WHERE status = 'pending'
                     ORDER BY created_at, id LIMIT 1",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((task_id, description)) = candidate else {
                tx.commit()?;
                return Ok(ClaimOutcome::none());
            };

            let changed = tx.execute(
                "UPDATE tasks SET status = 'claimed', claimed_by = ?1, claimed_at = ?2
                 WHERE id = ?3 AND status = 'pending'",
                params![agent_id, now_ms as i64, task_id],
            )?;
            if changed == 0 {
                // Lost the race; rescan for the next pending row.
                tx.commit()?;
                continue;
            }

            tx.execute(
                "INSERT INTO heartbeats (agent_id, current_task_id, last_heartbeat)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(agent_id) DO UPDATE SET
                     current_task_id = excluded.current_task_id,
                     last_heartbeat = excluded.last_heartbeat",
                params![agent_id, task_id, now_ms as i64],
            )?;
            tx.commit()?;
            return Ok(ClaimOutcome::claimed(task_id, description));
        }
        Ok(ClaimOutcome::none())
    }

    /// Move a claimed task to `running`. Returns false when the task is not
    /// claimed by this agent anymore (reclaimed or completed elsewhere).
    pub fn start_task(
        &mut self,
        task_id: &str,
        agent_id: &str,
        now_ms: u64,
    ) -> Result<bool, SwarmError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks SET status = 'running'
             WHERE id = ?1 AND status = 'claimed' AND claimed_by = ?2",
            params![task_id, agent_id],
        )?;
        tx.execute(
            "UPDATE heartbeats SET last_heartbeat = ?1 WHERE agent_id = ?2",
            params![now_ms as i64, agent_id],
        )?;
        tx.commit()?;
        Ok(changed == 1)
    }

    /// Refresh an agent's liveness stamp.
    pub fn heartbeat(&mut self, agent_id: &str, now_ms: u64) -> Result<(), SwarmError> {
        self.conn.execute(
            "INSERT INTO heartbeats (agent_id, last_heartbeat) VALUES (?1, ?2)
             ON CONFLICT(agent_id) DO UPDATE SET last_heartbeat = excluded.last_heartbeat",
            params![agent_id, now_ms as i64],
        )?;
        Ok(())
    }

    /// Mark a held task completed. Returns false when the task was not held.
    pub fn complete_task(
        &mut self,
        task_id: &str,
        result: Option<&str>,
        now_ms: u64,
    ) -> Result<bool, SwarmError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE tasks SET status = 'completed', result = ?1, completed_at = ?2
             WHERE id = ?3 AND status IN ('claimed', 'running')",
            params![result, now_ms as i64, task_id],
        )?;
        tx.execute(
            "UPDATE heartbeats SET current_task_id = NULL WHERE current_task_id = ?1",
            params![task_id],
        )?;
        tx.commit()?;
        Ok(changed == 1)
    }

    /// Report a task failure. Retryable failures with budget left reset the
    /// task to `pending` (claim cleared, retry counted); otherwise `failed`.
    pub fn fail_task(
        &mut self,
        task_id: &str,
        error: &str,
        retryable: bool,
        now_ms: u64,
    ) -> Result<FailOutcome, SwarmError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let budget: Option<(u32, u32)> = tx
            .query_row(
                "SELECT retry_count, max_retries FROM tasks
                 WHERE id = ?1 AND status IN ('claimed', 'running')",
                params![task_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((retry_count, max_retries)) = budget else {
            tx.commit()?;
            return Ok(FailOutcome::Failed);
        };

        let outcome = if retryable && retry_count + 1 <= max_retries {
            tx.execute(
                "UPDATE tasks SET status = 'pending', retry_count = retry_count + 1,
                     claimed_by = NULL, claimed_at = NULL, error = ?1
                 WHERE id = ?2",
                params![error, task_id],
            )?;
            FailOutcome::Requeued {
                retry_count: retry_count + 1,
            }
        } else {
            tx.execute(
                "UPDATE tasks SET status = 'failed', error = ?1, completed_at = ?2
                 WHERE id = ?3",
                params![error, now_ms as i64, task_id],
            )?;
            FailOutcome::Failed
        };
        tx.execute(
            "UPDATE heartbeats SET current_task_id = NULL WHERE current_task_id = ?1",
            params![task_id],
        )?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Release tasks held by agents whose heartbeat is older than
    /// `threshold_ms` (or who never heartbeated), respecting retry budgets.
    /// Stale heartbeat rows are deleted. Returns the number released.
    pub fn cleanup_stale_claims(
        &mut self,
        threshold_ms: u64,
        now_ms: u64,
    ) -> Result<usize, SwarmError> {
        let cutoff = now_ms.saturating_sub(threshold_ms) as i64;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let held: Vec<(String, u32, u32)> = {
            let mut stmt = tx.prepare(
                "SELECT t.id, t.retry_count, t.max_retries FROM tasks t
                 LEFT JOIN heartbeats h ON h.agent_id = t.claimed_by
                 WHERE t.status IN ('claimed', 'running')
                   AND (h.agent_id IS NULL OR h.last_heartbeat < ?1)",
            )?;
            let rows = stmt.query_map(params![cutoff], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;
            rows.collect::<Result<_, _>>()?
        };

        for (task_id, retry_count, max_retries) in &held {
            if retry_count + 1 <= *max_retries {
                tx.execute(
                    "UPDATE tasks SET status = 'pending', retry_count = retry_count + 1,
                         claimed_by = NULL, claimed_at = NULL
                     WHERE id = ?1",
                    params![task_id],
                )?;
            } else {
                tx.execute(
                    "UPDATE tasks SET status = 'failed',
                         error = 'stale claim: worker heartbeat lost', completed_at = ?1
                     WHERE id = ?2",
                    params![now_ms as i64, task_id],
                )?;
            }
        }
        tx.execute(
            "DELETE FROM heartbeats WHERE last_heartbeat < ?1",
            params![cutoff],
        )?;
        tx.commit()?;

        if !held.is_empty() {
            tracing::info!(released = held.len(), "reclaimed stale swarm claims");
        }
        Ok(held.len())
    }

    /// No work left in flight or waiting.
    pub fn is_swarm_complete(&self) -> Result<bool, SwarmError> {
        let open: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tasks WHERE status IN ('pending', 'claimed', 'running')",
            [],
            |row| row.get(0),
        )?;
        Ok(open == 0)
    }

    /// Task counts by status.
    pub fn task_counts(&self) -> Result<TaskCounts, SwarmError> {
        let mut counts = TaskCounts::default();
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM tasks GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;
        for row in rows {
            let (status, count) = row?;
            match status.parse::<TaskStatus>() {
                Ok(TaskStatus::Pending) => counts.pending = count,
                Ok(TaskStatus::Claimed) => counts.claimed = count,
                Ok(TaskStatus::Running) => counts.running = count,
                Ok(TaskStatus::Completed) => counts.completed = count,
                Ok(TaskStatus::Failed) => counts.failed = count,
                Err(_) => {}
            }
        }
        Ok(counts)
    }

    /// Fetch one task row.
    pub fn get_task(&self, task_id: &str) -> Result<Option<SwarmTask>, SwarmError> {
        let task = self
            .conn
            .query_row(
                "SELECT id, description, status, claimed_by, claimed_at, retry_count,
                        max_retries, result, error, created_at, completed_at
                 FROM tasks WHERE id = ?1",
                params![task_id],
                |row| {
                    Ok(SwarmTask {
                        id: row.get(0)?,
                        description: row.get(1)?,
                        status: row
                            .get::<_, String>(2)?
                            .parse()
                            .unwrap_or(TaskStatus::Failed),
                        claimed_by: row.get(3)?,
                        claimed_at: row.get::<_, Option<i64>>(4)?.map(|v| v as u64),
                        retry_count: row.get(5)?,
                        max_retries: row.get(6)?,
                        result: row.get(7)?,
                        error: row.get(8)?,
                        created_at: row.get::<_, i64>(9)? as u64,
                        completed_at: row.get::<_, Option<i64>>(10)?.map(|v| v as u64),
                    })
                },
            )
            .optional()?;
        Ok(task)
    }

    /// Agents with a live heartbeat row, most recent first.
    pub fn heartbeat_ages(&self, now_ms: u64) -> Result<Vec<(String, u64)>, SwarmError> {
        let mut stmt = self.conn.prepare(
            "SELECT agent_id, last_heartbeat FROM heartbeats ORDER BY last_heartbeat DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (agent, stamp) = row?;
            out.push((agent, now_ms.saturating_sub(stamp.max(0) as u64)));
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
