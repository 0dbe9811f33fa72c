// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn state_with_workers() -> UltrapilotState {
    let mut state = UltrapilotState::new("s", "/p".into(), 0);
    state.add_worker("w1", "backend", 1);
    state.add_worker("w2", "frontend", 1);
    state
}

#[test]
fn forward_pipeline() {
    let mut state = UltrapilotState::new("s", "/p".into(), 0);
    for phase in [
        UltrapilotPhase::Partition,
        UltrapilotPhase::Execute,
        UltrapilotPhase::Integrate,
        UltrapilotPhase::Validate,
        UltrapilotPhase::Complete,
    ] {
        state.advance(phase, 1).unwrap();
    }
    assert!(!state.active);
}

#[test]
fn validate_retries_into_integrate() {
    let mut state = UltrapilotState::new("s", "/p".into(), 0);
    state.phase = UltrapilotPhase::Validate;
    state.advance(UltrapilotPhase::Integrate, 1).unwrap();
    assert_eq!(state.validation_attempts, 1);
    assert_eq!(state.phase, UltrapilotPhase::Integrate);
}

#[test]
fn skipping_phases_is_rejected() {
    let mut state = UltrapilotState::new("s", "/p".into(), 0);
    assert!(matches!(
        state.advance(UltrapilotPhase::Validate, 1),
        Err(UltrapilotError::InvalidTransition { .. })
    ));
}

#[test]
fn file_claims_are_exclusive_per_worker() {
    let mut state = state_with_workers();
    state.claim_file("w1", "src/api.rs", 1).unwrap();

    let err = state.claim_file("w2", "src/api.rs", 2).unwrap_err();
    assert_eq!(
        err,
        UltrapilotError::FileConflict {
            path: "src/api.rs".into(),
            owner: "w1".into()
        }
    );
    assert_eq!(state.conflicts, vec!["src/api.rs: w1 vs w2".to_string()]);
}

#[test]
fn reclaiming_own_file_is_idempotent() {
    let mut state = state_with_workers();
    state.claim_file("w1", "src/api.rs", 1).unwrap();
    state.claim_file("w1", "src/api.rs", 2).unwrap();
    assert_eq!(state.workers["w1"].files_owned.len(), 1);
}

#[test]
fn shared_files_never_conflict() {
    let mut state = state_with_workers();
    state.shared_files.push("Cargo.toml".into());
    state.claim_file("w1", "Cargo.toml", 1).unwrap();
    state.claim_file("w2", "Cargo.toml", 2).unwrap();
    assert!(state.conflicts.is_empty());
}

#[test]
fn unknown_worker_is_an_error() {
    let mut state = state_with_workers();
    assert_eq!(
        state.claim_file("ghost", "a.rs", 1),
        Err(UltrapilotError::UnknownWorker("ghost".into()))
    );
}

#[test]
fn workers_settled_requires_all_finished() {
    let mut state = state_with_workers();
    assert!(!state.workers_settled());
    state.set_worker_status("w1", WorkerStatus::Done, 1).unwrap();
    state.set_worker_status("w2", WorkerStatus::Failed, 2).unwrap();
    assert!(state.workers_settled());
}

#[test]
fn banner_counts_done_workers() {
    let mut state = state_with_workers();
    state.phase = UltrapilotPhase::Execute;
    state.set_worker_status("w1", WorkerStatus::Done, 1).unwrap();
    assert_eq!(state.banner(), "[ULTRAPILOT execute 1/2 workers]");
}
