// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `omc swarm` — operator plumbing over the task queue. Worker subagents
//! call these commands to claim, heartbeat, and settle tasks.

use crate::commands::{open_swarm_db, operator_context, print_json};
use crate::exit_error::ExitError;
use clap::{Args, Subcommand};
use omc_core::Clock;
use omc_swarm::{FailOutcome, TaskSpec, STALE_CLAIM_MS};

#[derive(Subcommand)]
pub enum SwarmCommand {
    /// Start swarm mode (exclusive): marker + database + session row
    Start(StartArgs),
    /// Add a pending task
    Add(AddArgs),
    /// Claim the oldest pending task for an agent
    Claim(AgentArgs),
    /// Move a claimed task to running
    StartTask(StartTaskArgs),
    /// Refresh an agent's heartbeat
    Heartbeat(AgentArgs),
    /// Mark a task completed
    Complete(CompleteArgs),
    /// Report a task failure
    Fail(FailArgs),
    /// Reclaim tasks whose workers stopped heartbeating
    Cleanup(CleanupArgs),
    /// Task counts, completion flag, and worker heartbeat ages
    Status,
    /// Stop swarm mode; optionally delete the database
    Stop(StopArgs),
}

#[derive(Args)]
pub struct StartArgs {
    #[arg(long, default_value_t = 3)]
    pub agents: u32,
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task id; generated when omitted
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub max_retries: Option<u32>,
}

#[derive(Args)]
pub struct AgentArgs {
    /// Worker identity; generated when omitted (one-shot workers)
    #[arg(long)]
    pub agent: Option<String>,
}

#[derive(Args)]
pub struct StartTaskArgs {
    #[arg(long)]
    pub agent: String,
    #[arg(long)]
    pub task: String,
}

#[derive(Args)]
pub struct CompleteArgs {
    #[arg(long)]
    pub task: String,
    #[arg(long)]
    pub result: Option<String>,
}

#[derive(Args)]
pub struct FailArgs {
    #[arg(long)]
    pub task: String,
    #[arg(long)]
    pub error: String,
    /// Retryable failures re-queue the task while budget remains
    #[arg(long)]
    pub retryable: bool,
}

#[derive(Args)]
pub struct CleanupArgs {
    /// Heartbeats older than this are stale (default 5 minutes)
    #[arg(long, default_value_t = STALE_CLAIM_MS)]
    pub threshold_ms: u64,
}

#[derive(Args)]
pub struct StopArgs {
    /// Also delete swarm.db and its WAL side files
    #[arg(long)]
    pub delete_db: bool,
}

pub fn run(command: SwarmCommand) -> Result<(), ExitError> {
    match command {
        SwarmCommand::Start(args) => start(args),
        SwarmCommand::Add(args) => add(args),
        SwarmCommand::Claim(args) => claim(args),
        SwarmCommand::StartTask(args) => start_task(args),
        SwarmCommand::Heartbeat(args) => heartbeat(args),
        SwarmCommand::Complete(args) => complete(args),
        SwarmCommand::Fail(args) => fail(args),
        SwarmCommand::Cleanup(args) => cleanup(args),
        SwarmCommand::Status => status(),
        SwarmCommand::Stop(args) => stop(args),
    }
}

fn fail_from<E: std::fmt::Display>(err: E) -> ExitError {
    ExitError::failure(format!("{err}"))
}

fn start(args: StartArgs) -> Result<(), ExitError> {
    let ctx = operator_context(args.session)?;
    let check = omc_swarm::start_swarm(&ctx.root, &ctx.session_id, args.agents, &ctx.clock)
        .map_err(fail_from)?;
    print_json(&check);
    if check.allowed {
        Ok(())
    } else {
        Err(ExitError::failure(
            check.message.unwrap_or_else(|| "swarm blocked".to_string()),
        ))
    }
}

fn add(args: AddArgs) -> Result<(), ExitError> {
    let (_, mut db) = open_swarm_db()?;
    let id = args
        .id
        .unwrap_or_else(|| omc_core::TaskId::new().to_string());
    let spec = TaskSpec {
        id: id.clone(),
        description: args.description,
        max_retries: args.max_retries,
    };
    let inserted = db
        .add_tasks(&[spec], now_ms())
        .map_err(fail_from)?;
    print_json(&serde_json::json!({ "inserted": inserted, "id": id }));
    Ok(())
}

fn claim(args: AgentArgs) -> Result<(), ExitError> {
    let (_, mut db) = open_swarm_db()?;
    let agent = resolve_agent(args.agent);
    let outcome = db.claim_task(&agent, now_ms()).map_err(fail_from)?;
    print_json(&serde_json::json!({
        "agent": agent,
        "success": outcome.success,
        "task_id": outcome.task_id,
        "description": outcome.description,
        "reason": outcome.reason,
    }));
    Ok(())
}

fn resolve_agent(agent: Option<String>) -> String {
    agent.unwrap_or_else(|| omc_core::AgentId::new().to_string())
}

fn start_task(args: StartTaskArgs) -> Result<(), ExitError> {
    let (_, mut db) = open_swarm_db()?;
    let started = db
        .start_task(&args.task, &args.agent, now_ms())
        .map_err(fail_from)?;
    print_json(&serde_json::json!({ "started": started }));
    Ok(())
}

fn heartbeat(args: AgentArgs) -> Result<(), ExitError> {
    let (_, mut db) = open_swarm_db()?;
    let agent = resolve_agent(args.agent);
    db.heartbeat(&agent, now_ms()).map_err(fail_from)?;
    print_json(&serde_json::json!({ "ok": true, "agent": agent }));
    Ok(())
}

fn complete(args: CompleteArgs) -> Result<(), ExitError> {
    let (_, mut db) = open_swarm_db()?;
    let completed = db
        .complete_task(&args.task, args.result.as_deref(), now_ms())
        .map_err(fail_from)?;
    print_json(&serde_json::json!({ "completed": completed }));
    Ok(())
}

fn fail(args: FailArgs) -> Result<(), ExitError> {
    let (_, mut db) = open_swarm_db()?;
    let outcome = db
        .fail_task(&args.task, &args.error, args.retryable, now_ms())
        .map_err(fail_from)?;
    let (status, retry_count) = match outcome {
        FailOutcome::Requeued { retry_count } => ("requeued", Some(retry_count)),
        FailOutcome::Failed => ("failed", None),
    };
    print_json(&serde_json::json!({ "status": status, "retry_count": retry_count }));
    Ok(())
}

fn cleanup(args: CleanupArgs) -> Result<(), ExitError> {
    let (_, mut db) = open_swarm_db()?;
    let released = db
        .cleanup_stale_claims(args.threshold_ms, now_ms())
        .map_err(fail_from)?;
    print_json(&serde_json::json!({ "released": released }));
    Ok(())
}

fn status() -> Result<(), ExitError> {
    let (path, db) = open_swarm_db()?;
    let counts = db.task_counts().map_err(fail_from)?;
    let complete = db.is_swarm_complete().map_err(fail_from)?;
    let agents: Vec<serde_json::Value> = db
        .heartbeat_ages(now_ms())
        .map_err(fail_from)?
        .into_iter()
        .map(|(agent, age_ms)| serde_json::json!({ "agent": agent, "age_ms": age_ms }))
        .collect();
    print_json(&serde_json::json!({
        "database": path.display().to_string(),
        "counts": counts,
        "complete": complete,
        "agents": agents,
    }));
    Ok(())
}

fn stop(args: StopArgs) -> Result<(), ExitError> {
    let cwd = std::env::current_dir().map_err(fail_from)?;
    let root = omc_store::worktree_root(&cwd);
    omc_swarm::stop_swarm(&root, args.delete_db).map_err(fail_from)?;
    print_json(&serde_json::json!({ "stopped": true, "database_deleted": args.delete_db }));
    Ok(())
}

fn now_ms() -> u64 {
    omc_core::SystemClock.epoch_ms()
}
