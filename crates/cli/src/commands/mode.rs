// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `omc mode` — start, cancel, and inspect orchestration modes.

use crate::commands::{operator_context, print_json};
use crate::exit_error::ExitError;
use clap::{Args, Subcommand};
use omc_core::{GoalType, ModeName, SystemClock};
use omc_kernel::{cancel_mode, HookContext, StartOutcome};
use serde::Serialize;

#[derive(Subcommand)]
pub enum ModeCommand {
    /// Start a mode (registry-checked)
    Start(StartArgs),
    /// Cancel a mode (ralph also drops its linked ultrawork)
    Cancel(CancelArgs),
    /// List active modes with their progress counters
    Status(StatusArgs),
}

#[derive(Args)]
pub struct StartArgs {
    /// Mode to start: ralph, ultrawork, ultraqa, autopilot, team-pipeline, ultrapilot
    pub mode: String,
    /// Task prompt carried by the mode record
    #[arg(long, default_value = "")]
    pub prompt: String,
    /// Session id binding the record (defaults to a process-derived id)
    #[arg(long)]
    pub session: Option<String>,
    /// Iteration budget (ralph) — defaults to the configured budget
    #[arg(long)]
    pub max_iterations: Option<u32>,
    /// Ralph judges completion by prd.json instead of iteration count
    #[arg(long)]
    pub prd: bool,
    /// QA goal for ultraqa
    #[arg(long, default_value = "tests")]
    pub goal: String,
    /// Cycle budget for ultraqa
    #[arg(long, default_value_t = 10)]
    pub max_cycles: u32,
    /// Validation retry budget for autopilot
    #[arg(long, default_value_t = 3)]
    pub max_validation_rounds: u32,
}

#[derive(Args)]
pub struct CancelArgs {
    pub mode: String,
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Serialize)]
struct StartReport {
    success: bool,
    mode: ModeName,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked_by: Option<ModeName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    linked_ultrawork: bool,
}

pub fn run(command: ModeCommand) -> Result<(), ExitError> {
    match command {
        ModeCommand::Start(args) => start(args),
        ModeCommand::Cancel(args) => cancel(args),
        ModeCommand::Status(args) => status(args),
    }
}

fn start(args: StartArgs) -> Result<(), ExitError> {
    let mode: ModeName = args
        .mode
        .parse()
        .map_err(|err| ExitError::failure(format!("{err}")))?;
    let ctx = operator_context(args.session.clone())?;

    let outcome = dispatch_start(&ctx, mode, &args)
        .map_err(|err| ExitError::failure(format!("{err}")))?;

    let report = StartReport {
        success: outcome.check.allowed,
        mode,
        blocked_by: outcome.check.blocked_by,
        message: outcome.check.message,
        linked_ultrawork: outcome.linked_ultrawork,
    };
    print_json(&report);
    if report.success {
        Ok(())
    } else {
        Err(ExitError::failure(
            report.message.unwrap_or_else(|| "mode blocked".to_string()),
        ))
    }
}

fn dispatch_start(
    ctx: &HookContext<SystemClock>,
    mode: ModeName,
    args: &StartArgs,
) -> Result<StartOutcome, omc_kernel::KernelError> {
    match mode {
        ModeName::Ralph => {
            omc_kernel::start_ralph(ctx, &args.prompt, args.max_iterations, args.prd)
        }
        ModeName::Ultrawork => omc_kernel::start_ultrawork(ctx, &args.prompt),
        ModeName::Ultraqa => {
            let goal = parse_goal(&args.goal);
            omc_kernel::start_ultraqa(ctx, goal, None, args.max_cycles)
        }
        ModeName::Autopilot => {
            omc_kernel::start_autopilot(ctx, &args.prompt, args.max_validation_rounds)
        }
        ModeName::TeamPipeline => omc_kernel::start_team(ctx, &args.prompt),
        ModeName::Ultrapilot => omc_kernel::start_ultrapilot(ctx),
        ModeName::Swarm => {
            let check = omc_swarm::start_swarm(&ctx.root, &ctx.session_id, 3, &ctx.clock)?;
            Ok(StartOutcome {
                check,
                linked_ultrawork: false,
            })
        }
        other => Ok(StartOutcome {
            check: omc_store::StartCheck::blocked(
                other,
                format!("{other} has no start operation"),
            ),
            linked_ultrawork: false,
        }),
    }
}

fn parse_goal(goal: &str) -> GoalType {
    match goal {
        "build" => GoalType::Build,
        "lint" => GoalType::Lint,
        "typecheck" => GoalType::Typecheck,
        "custom" => GoalType::Custom,
        _ => GoalType::Tests,
    }
}

fn cancel(args: CancelArgs) -> Result<(), ExitError> {
    let mode: ModeName = args
        .mode
        .parse()
        .map_err(|err| ExitError::failure(format!("{err}")))?;
    let ctx = operator_context(args.session)?;
    let cleared = cancel_mode(&ctx, mode).map_err(|err| ExitError::failure(format!("{err}")))?;
    print_json(&serde_json::json!({ "cancelled": cleared }));
    Ok(())
}

fn status(args: StatusArgs) -> Result<(), ExitError> {
    let ctx = operator_context(args.session)?;
    let active = omc_store::get_active_modes(&ctx.root, ctx.now_ms());
    print_json(&serde_json::json!({ "active": active }));
    Ok(())
}
