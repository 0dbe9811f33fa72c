// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use tempfile::TempDir;

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 3, 4, 5, 6).unwrap()
}

#[test]
fn checkpoint_writes_versioned_json() {
    let temp = TempDir::new().unwrap();
    let mut checkpoint = Checkpoint::new("s1", at());
    checkpoint.modes.push(ModeSnapshot {
        mode: ModeName::Ralph,
        phase: None,
        iteration: Some(6),
        prompt: Some("build it".into()),
        task_counts: None,
        session_id: "s1".into(),
    });

    let path = write_checkpoint(temp.path(), &checkpoint).unwrap();
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("checkpoint-2026-02-03T04-05-06"));

    let loaded: Checkpoint = crate::safe_read_json(&path).unwrap();
    assert_eq!(loaded, checkpoint);
    assert_eq!(loaded.version, CURRENT_CHECKPOINT_VERSION);
}

#[test]
fn filenames_contain_no_colons() {
    let temp = TempDir::new().unwrap();
    let path = write_checkpoint(temp.path(), &Checkpoint::new("s", at())).unwrap();
    assert!(!path.file_name().unwrap().to_string_lossy().contains(':'));
}

#[test]
fn collect_wisdom_concatenates_plan_files() {
    let temp = TempDir::new().unwrap();
    let notepads = temp.path().join(".omc/notepads");
    std::fs::create_dir_all(notepads.join("plan-a")).unwrap();
    std::fs::create_dir_all(notepads.join("plan-b")).unwrap();
    std::fs::write(notepads.join("plan-a/learnings.md"), "use the fixture\n").unwrap();
    std::fs::write(notepads.join("plan-b/decisions.md"), "kept sqlite\n").unwrap();
    std::fs::write(notepads.join("plan-b/notes.md"), "ignored file\n").unwrap();

    let wisdom = collect_wisdom(temp.path());
    assert!(wisdom.contains("## plan-a/learnings.md"));
    assert!(wisdom.contains("use the fixture"));
    assert!(wisdom.contains("## plan-b/decisions.md"));
    assert!(!wisdom.contains("ignored file"));
}

#[test]
fn collect_wisdom_without_notepads_is_empty() {
    let temp = TempDir::new().unwrap();
    assert_eq!(collect_wisdom(temp.path()), "");
}

#[test]
fn empty_wisdom_writes_nothing() {
    let temp = TempDir::new().unwrap();
    assert_eq!(write_wisdom(temp.path(), at(), "").unwrap(), None);
}

#[test]
fn wisdom_file_written_when_non_empty() {
    let temp = TempDir::new().unwrap();
    let path = write_wisdom(temp.path(), at(), "## plan/learnings.md\n\nx")
        .unwrap()
        .unwrap();
    assert!(path.to_string_lossy().contains("wisdom-"));
    assert!(path.exists());
}
