// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The host-facing hook entry point.
//!
//! Reads one JSON event from stdin and writes exactly one verdict to
//! stdout. Exit code is always 0 in nominal operation: a kernel problem is
//! reported through the benign verdict, never through the exit status.

use crate::exit_error::ExitError;
use omc_core::{HookInput, SystemClock, Verdict};
use omc_kernel::{dispatch, effective_session_id, HookContext};
use std::io::{Read, Write};

pub fn run() -> Result<(), ExitError> {
    let mut raw = String::new();
    if std::io::stdin().read_to_string(&mut raw).is_err() {
        emit(&Verdict::benign());
        return Ok(());
    }

    let input = HookInput::parse(&raw);
    let clock = SystemClock;
    let process_cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
    // The payload's cwd is host-supplied: accept it only while it resolves
    // inside the worktree this process was spawned in.
    let root = match omc_store::validate_working_directory(input.cwd.as_deref(), &process_cwd) {
        Ok(dir) => omc_store::worktree_root(&dir),
        Err(err) => {
            tracing::debug!(%err, "payload cwd rejected; using process cwd");
            omc_store::worktree_root(&process_cwd)
        }
    };
    let session_id = effective_session_id(&input.session_id, &clock);

    let ctx = HookContext::new(root, session_id, clock);
    emit(&dispatch(&input, &ctx));
    Ok(())
}

fn emit(verdict: &Verdict) {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(verdict.to_json().as_bytes());
    let _ = stdout.write_all(b"\n");
    let _ = stdout.flush();
}
