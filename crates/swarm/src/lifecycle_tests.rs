// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use omc_core::FakeClock;
use omc_store::{is_mode_active, read_mode_marker, write_state};
use tempfile::TempDir;

#[test]
fn start_creates_marker_and_database() {
    let temp = TempDir::new().unwrap();
    let clock = FakeClock::new();

    let check = start_swarm(temp.path(), "sess-1", 3, &clock).unwrap();
    assert!(check.allowed);
    assert!(is_mode_active(ModeName::Swarm, temp.path(), clock.epoch_ms()));
    assert!(swarm_db_path(temp.path()).unwrap().exists());

    let marker = read_mode_marker(ModeName::Swarm, temp.path(), clock.epoch_ms()).unwrap();
    assert_eq!(marker.extra["agentCount"], serde_json::json!(3));
}

#[test]
fn start_blocked_by_exclusive_mode_touches_nothing() {
    let temp = TempDir::new().unwrap();
    let clock = FakeClock::new();
    let autopilot = omc_core::AutopilotState::new("p", "s", temp.path().into(), 3, clock.epoch_ms());
    write_state(temp.path(), &autopilot).unwrap();

    let check = start_swarm(temp.path(), "sess-1", 3, &clock).unwrap();
    assert!(!check.allowed);
    assert_eq!(check.blocked_by, Some(ModeName::Autopilot));
    assert!(!swarm_db_path(temp.path()).unwrap().exists());
}

#[test]
fn stop_removes_marker_keeps_database_by_default() {
    let temp = TempDir::new().unwrap();
    let clock = FakeClock::new();
    start_swarm(temp.path(), "sess-1", 2, &clock).unwrap();

    stop_swarm(temp.path(), false).unwrap();
    assert!(!is_mode_active(ModeName::Swarm, temp.path(), clock.epoch_ms()));
    assert!(swarm_db_path(temp.path()).unwrap().exists());
}

#[test]
fn stop_with_delete_database_removes_files() {
    let temp = TempDir::new().unwrap();
    let clock = FakeClock::new();
    start_swarm(temp.path(), "sess-1", 2, &clock).unwrap();

    stop_swarm(temp.path(), true).unwrap();
    assert!(!swarm_db_path(temp.path()).unwrap().exists());
}

#[test]
fn stop_when_never_started_is_fine() {
    let temp = TempDir::new().unwrap();
    stop_swarm(temp.path(), true).unwrap();
}
