// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mode registry specs: ralph/ultraqa mutual exclusion, linked ultrawork,
//! cancellation keywords.

use crate::prelude::*;

#[test]
fn ralph_and_ultraqa_mutual_exclusion() {
    let project = Project::empty();

    project
        .omc()
        .args(["mode", "start", "ralph", "--prompt", "p", "--session", "x"])
        .assert()
        .success();

    // UltraQA refuses while ralph holds the worktree.
    let refused = project
        .omc()
        .args(["mode", "start", "ultraqa", "--goal", "tests", "--session", "x"])
        .output()
        .expect("start ultraqa");
    assert!(!refused.status.success());
    let json = stdout_json(&refused);
    assert_eq!(json["success"], false);
    assert_eq!(json["blocked_by"], "ralph");
    assert!(
        json["message"].as_str().unwrap().contains("cancel"),
        "message: {json}"
    );

    // Cancelling ralph unblocks it.
    project
        .omc()
        .args(["mode", "cancel", "ralph"])
        .assert()
        .success();
    let allowed = project
        .omc()
        .args(["mode", "start", "ultraqa", "--goal", "tests", "--session", "x"])
        .output()
        .expect("start ultraqa");
    assert!(allowed.status.success());
    assert_eq!(stdout_json(&allowed)["success"], true);
}

#[test]
fn ralph_start_creates_linked_ultrawork() {
    let project = Project::empty();
    let output = project
        .omc()
        .args(["mode", "start", "ralph", "--prompt", "p", "--session", "x"])
        .output()
        .expect("start ralph");
    assert_eq!(stdout_json(&output)["linked_ultrawork"], true);

    let status = stdout_json(
        &project
            .omc()
            .args(["mode", "status"])
            .output()
            .expect("status"),
    );
    let active: Vec<&str> = status["active"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(active.contains(&"ralph"), "active: {active:?}");
    assert!(active.contains(&"ultrawork"), "active: {active:?}");
}

#[test]
fn cancel_keyword_clears_session_modes() {
    let project = Project::empty();
    project
        .omc()
        .args(["mode", "start", "ralph", "--prompt", "p", "--session", "x"])
        .assert()
        .success();

    let mut payload = project.event("UserPromptSubmit", "x");
    payload["prompt"] = serde_json::json!("please cancel everything");
    let verdict = project.hook(&payload);
    assert!(
        verdict["systemMessage"]
            .as_str()
            .unwrap()
            .contains("Cancelled"),
        "verdict: {verdict}"
    );

    let status = stdout_json(
        &project
            .omc()
            .args(["mode", "status"])
            .output()
            .expect("status"),
    );
    assert_eq!(status["active"].as_array().unwrap().len(), 0);
}

#[test]
fn exclusive_modes_block_each_other() {
    let project = Project::empty();
    project
        .omc()
        .args(["mode", "start", "autopilot", "--prompt", "p"])
        .assert()
        .success();

    let blocked = project
        .omc()
        .args(["mode", "start", "team-pipeline", "--prompt", "p"])
        .output()
        .expect("start team");
    assert!(!blocked.status.success());
    assert_eq!(stdout_json(&blocked)["blocked_by"], "autopilot");
}
