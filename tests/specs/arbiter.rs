// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Permission arbiter specs over the real hook boundary.

use crate::prelude::*;

fn bash_event(project: &Project, command: &str) -> serde_json::Value {
    let mut payload = project.event("PreToolUse", "s");
    payload["tool_name"] = serde_json::json!("Bash");
    payload["tool_input"] = serde_json::json!({ "command": command });
    payload
}

#[test]
fn safe_command_is_approved() {
    let project = Project::empty();
    let verdict = project.hook(&bash_event(&project, "git status"));
    assert_eq!(
        verdict["hookSpecificOutput"]["decision"]["behavior"], "allow",
        "verdict: {verdict}"
    );
    assert!(verdict["hookSpecificOutput"]["decision"]["reason"]
        .as_str()
        .unwrap()
        .starts_with("Safe:"));
}

#[test]
fn command_chain_is_not_approved() {
    let project = Project::empty();
    let verdict = project.hook(&bash_event(&project, "git status; rm -rf /"));
    assert!(
        verdict.get("hookSpecificOutput").is_none(),
        "verdict: {verdict}"
    );
    assert_eq!(verdict["continue"], true);
}

#[test]
fn automated_mode_does_not_widen_approval() {
    let project = Project::empty();
    project
        .omc()
        .args(["mode", "start", "autopilot", "--prompt", "p"])
        .assert()
        .success();

    let verdict = project.hook(&bash_event(&project, "rm -rf build"));
    assert!(
        verdict.get("hookSpecificOutput").is_none(),
        "verdict: {verdict}"
    );
}

#[test]
fn non_bash_tool_passes_through() {
    let project = Project::empty();
    let mut payload = project.event("PreToolUse", "s");
    payload["tool_name"] = serde_json::json!("Edit");
    payload["tool_input"] = serde_json::json!({"file_path": "src/lib.rs"});
    let verdict = project.hook(&payload);
    assert_eq!(verdict, serde_json::json!({"continue": true}));
}

#[test]
fn unknown_event_is_benign() {
    let project = Project::empty();
    let verdict = project.hook(&project.event("NotARealEvent", "s"));
    assert_eq!(
        verdict,
        serde_json::json!({"continue": true, "suppressOutput": true})
    );
}
