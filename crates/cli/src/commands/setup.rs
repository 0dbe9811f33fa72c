// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `omc init` / `omc maintenance` — the Setup hook triggers, runnable by
//! hand.

use crate::commands::operator_context;
use crate::exit_error::ExitError;
use omc_core::{HookInput, SetupTrigger};
use omc_kernel::dispatch;

pub fn run_init() -> Result<(), ExitError> {
    run_trigger(SetupTrigger::Init)
}

pub fn run_maintenance() -> Result<(), ExitError> {
    run_trigger(SetupTrigger::Maintenance)
}

fn run_trigger(trigger: SetupTrigger) -> Result<(), ExitError> {
    let ctx = operator_context(None)?;
    let input = HookInput {
        hook_event_name: "Setup".to_string(),
        trigger: Some(trigger.to_string()),
        ..Default::default()
    };
    let verdict = dispatch(&input, &ctx);
    if let Some(message) = verdict.system_message {
        println!("{message}");
    }
    Ok(())
}
