// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PreCompact specs: checkpointing active modes and plan wisdom.

use crate::prelude::*;

#[test]
fn checkpoint_names_every_active_mode() {
    let project = Project::empty();
    project
        .omc()
        .args(["mode", "start", "autopilot", "--prompt", "p", "--session", "s"])
        .assert()
        .success();
    project
        .omc()
        .args(["mode", "start", "ralph", "--prompt", "p", "--session", "s"])
        .assert()
        .success();

    let mut payload = project.event("PreCompact", "s");
    payload["trigger"] = serde_json::json!("auto");
    let verdict = project.hook(&payload);

    let message = verdict["systemMessage"].as_str().unwrap();
    assert!(message.contains("autopilot"), "message: {message}");
    assert!(message.contains("ralph"), "message: {message}");

    let checkpoints = project.path().join(".omc/state/checkpoints");
    let files: Vec<String> = std::fs::read_dir(&checkpoints)
        .expect("checkpoints dir")
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    let checkpoint = files
        .iter()
        .find(|f| f.starts_with("checkpoint-") && f.ends_with(".json"))
        .unwrap_or_else(|| panic!("no checkpoint file in {files:?}"));

    let body =
        std::fs::read_to_string(checkpoints.join(checkpoint)).expect("read checkpoint");
    assert!(body.contains("\"autopilot\""), "body: {body}");
    assert!(body.contains("\"ralph\""), "body: {body}");
}

#[test]
fn wisdom_document_is_preserved() {
    let project = Project::empty();
    project.file(
        ".omc/notepads/plan-a/learnings.md",
        "integration tests need the stub server\n",
    );

    let mut payload = project.event("PreCompact", "s");
    payload["trigger"] = serde_json::json!("manual");
    let verdict = project.hook(&payload);
    assert!(
        verdict["systemMessage"]
            .as_str()
            .unwrap()
            .contains("wisdom preserved"),
        "verdict: {verdict}"
    );

    let checkpoints = project.path().join(".omc/state/checkpoints");
    let wisdom = std::fs::read_dir(&checkpoints)
        .expect("checkpoints dir")
        .filter_map(Result::ok)
        .find(|e| e.file_name().to_string_lossy().starts_with("wisdom-"))
        .expect("wisdom file");
    let body = std::fs::read_to_string(wisdom.path()).expect("read wisdom");
    assert!(body.contains("stub server"));
}

#[test]
fn checkpoint_with_no_modes_still_succeeds() {
    let project = Project::empty();
    let mut payload = project.event("PreCompact", "s");
    payload["trigger"] = serde_json::json!("auto");
    let verdict = project.hook(&payload);
    assert!(
        verdict["systemMessage"]
            .as_str()
            .unwrap()
            .contains("no active modes"),
        "verdict: {verdict}"
    );
}
