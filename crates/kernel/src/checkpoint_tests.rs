// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_util::{ctx_at, TEST_SESSION};
use omc_store::write_state;
use tempfile::TempDir;

fn checkpoint_files(root: &std::path::Path) -> Vec<String> {
    let dir = root.join(".omc/state/checkpoints");
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn checkpoint_captures_all_active_modes() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let autopilot = AutopilotState::builder().session_id(TEST_SESSION).build();
    write_state(&ctx.root, &autopilot).unwrap();
    let ralph = RalphState::builder().session_id(TEST_SESSION).iteration(4).build();
    write_state(&ctx.root, &ralph).unwrap();

    let verdict = handle(&ctx, false).unwrap();
    let message = verdict.system_message.unwrap();
    assert!(message.contains("autopilot"), "message: {message}");
    assert!(message.contains("ralph"), "message: {message}");

    let files = checkpoint_files(temp.path());
    let checkpoint_file = files
        .iter()
        .find(|f| f.starts_with("checkpoint-"))
        .expect("checkpoint file written");
    let loaded: Checkpoint = omc_store::safe_read_json(
        &temp
            .path()
            .join(".omc/state/checkpoints")
            .join(checkpoint_file),
    )
    .unwrap();
    let modes: Vec<ModeName> = loaded.modes.iter().map(|m| m.mode).collect();
    assert!(modes.contains(&ModeName::Autopilot));
    assert!(modes.contains(&ModeName::Ralph));
}

#[test]
fn inactive_records_are_not_snapshotted() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let ralph = RalphState::builder()
        .session_id(TEST_SESSION)
        .active(false)
        .build();
    write_state(&ctx.root, &ralph).unwrap();

    let verdict = handle(&ctx, false).unwrap();
    assert!(verdict.system_message.unwrap().contains("no active modes"));
}

#[test]
fn wisdom_is_written_when_notepads_have_content() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let plan = temp.path().join(".omc/notepads/plan-a");
    std::fs::create_dir_all(&plan).unwrap();
    std::fs::write(plan.join("learnings.md"), "tests need docker\n").unwrap();

    let verdict = handle(&ctx, true).unwrap();
    assert!(verdict.system_message.unwrap().contains("wisdom preserved"));
    assert!(checkpoint_files(temp.path())
        .iter()
        .any(|f| f.starts_with("wisdom-")));
}

#[test]
fn no_wisdom_file_without_notepads() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    handle(&ctx, false).unwrap();
    assert!(!checkpoint_files(temp.path())
        .iter()
        .any(|f| f.starts_with("wisdom-")));
}

#[test]
fn swarm_marker_contributes_task_counts() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    omc_swarm::start_swarm(temp.path(), TEST_SESSION, 2, &ctx.clock).unwrap();
    let mut db =
        omc_swarm::SwarmDb::open(&omc_swarm::swarm_db_path(temp.path()).unwrap()).unwrap();
    db.add_tasks(
        &[omc_swarm::TaskSpec::new("t1", "one task")],
        ctx.now_ms(),
    )
    .unwrap();
    drop(db);

    let verdict = handle(&ctx, false).unwrap();
    assert!(verdict.system_message.unwrap().contains("swarm"));

    let files = checkpoint_files(temp.path());
    let checkpoint_file = files.iter().find(|f| f.starts_with("checkpoint-")).unwrap();
    let loaded: Checkpoint = omc_store::safe_read_json(
        &temp
            .path()
            .join(".omc/state/checkpoints")
            .join(checkpoint_file),
    )
    .unwrap();
    let swarm = loaded
        .modes
        .iter()
        .find(|m| m.mode == ModeName::Swarm)
        .unwrap();
    assert!(swarm.task_counts.as_deref().unwrap().contains("1 pending"));
}
