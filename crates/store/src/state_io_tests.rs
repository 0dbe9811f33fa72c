// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use omc_core::RalphState;
use tempfile::TempDir;

fn ralph(session: &str) -> RalphState {
    RalphState::builder().session_id(session).build()
}

#[test]
fn write_read_roundtrip() {
    let temp = TempDir::new().unwrap();
    let state = ralph("s1");
    write_state(temp.path(), &state).unwrap();
    assert_eq!(read_state::<RalphState>(temp.path()), Some(state));
}

#[test]
fn read_missing_state_is_none() {
    let temp = TempDir::new().unwrap();
    assert_eq!(read_state::<RalphState>(temp.path()), None);
}

#[test]
fn session_bound_read_rejects_other_sessions() {
    let temp = TempDir::new().unwrap();
    write_state(temp.path(), &ralph("s1")).unwrap();

    assert!(read_state_for_session::<RalphState>(temp.path(), "s1").is_some());
    assert!(read_state_for_session::<RalphState>(temp.path(), "s2").is_none());
}

#[test]
fn clear_state_reports_removal() {
    let temp = TempDir::new().unwrap();
    write_state(temp.path(), &ralph("s1")).unwrap();
    assert!(clear_state::<RalphState>(temp.path()).unwrap());
    assert!(!clear_state::<RalphState>(temp.path()).unwrap());
    assert_eq!(read_state::<RalphState>(temp.path()), None);
}

#[test]
fn session_scoped_copy_lives_under_session_dir() {
    let temp = TempDir::new().unwrap();
    let path = write_session_state(temp.path(), "s/1", &ralph("s/1")).unwrap();
    assert!(path.to_string_lossy().contains("sessions/s_1"));
}

#[test]
fn session_scoped_read_checks_record_binding() {
    let temp = TempDir::new().unwrap();
    // A record copied into the wrong session directory is still rejected.
    let path = crate::paths::resolve_session_state(
        omc_core::ModeName::Ralph,
        "s2",
        temp.path(),
    )
    .unwrap();
    crate::atomic::atomic_write_json(&path, &ralph("s1")).unwrap();

    assert!(read_session_state::<RalphState>(temp.path(), "s2").is_none());
}

#[test]
fn corrupt_state_file_reads_as_none() {
    let temp = TempDir::new().unwrap();
    let path = crate::paths::resolve_state(omc_core::ModeName::Ralph, temp.path()).unwrap();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(read_state::<RalphState>(temp.path()), None);
}
