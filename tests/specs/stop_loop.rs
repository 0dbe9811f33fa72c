// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent stop-loop specs: deny-stop continuation, iteration budget,
//! tool-error guidance expiry.

use crate::prelude::*;

fn write_ralph_state(project: &Project, session: &str, iteration: u32, max: u32) {
    project.file(
        ".omc/state/ralph-state.json",
        &serde_json::json!({
            "active": true,
            "iteration": iteration,
            "max_iterations": max,
            "prompt": "build the feature",
            "session_id": session,
            "project_path": project.path().display().to_string(),
            "started_at": 1,
            "updated_at": 1,
            "linked_ultrawork": false,
            "prd_mode": false,
        })
        .to_string(),
    );
}

fn stop_event(project: &Project, session: &str) -> serde_json::Value {
    let mut payload = project.event("Stop", session);
    payload["stop_hook_active"] = serde_json::json!(false);
    payload
}

#[test]
fn active_ralph_denies_stop_with_incremented_banner() {
    let project = Project::empty();
    write_ralph_state(&project, "s1", 5, 50);

    let verdict = project.hook(&stop_event(&project, "s1"));
    assert_eq!(verdict["continue"], true);
    assert_eq!(verdict["decision"]["behavior"], "deny");
    let reason = verdict["decision"]["reason"].as_str().unwrap();
    assert!(reason.contains("[RALPH #6/50]"), "reason: {reason}");
    assert!(!reason.contains("[TOOL ERROR"), "reason: {reason}");

    // The stored record advanced atomically with the verdict.
    let stored: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(project.path().join(".omc/state/ralph-state.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stored["iteration"], 6);
}

#[test]
fn iteration_budget_exhaustion_allows_stop_with_summary() {
    let project = Project::empty();
    write_ralph_state(&project, "s1", 50, 50);

    let verdict = project.hook(&stop_event(&project, "s1"));
    assert!(verdict.get("decision").is_none(), "verdict: {verdict}");
    assert!(
        verdict["systemMessage"].as_str().unwrap().contains("budget"),
        "verdict: {verdict}"
    );
    assert!(!project.path().join(".omc/state/ralph-state.json").exists());
}

#[test]
fn other_sessions_ralph_does_not_loop_this_session() {
    let project = Project::empty();
    write_ralph_state(&project, "someone-else", 5, 50);

    let verdict = project.hook(&stop_event(&project, "s1"));
    assert!(verdict.get("decision").is_none(), "verdict: {verdict}");
}

#[test]
fn fresh_tool_error_is_injected_then_consumed() {
    let project = Project::empty();
    write_ralph_state(&project, "s1", 1, 50);
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;
    project.file(
        ".omc/state/last-tool-error.json",
        &serde_json::json!({
            "tool_name": "Bash",
            "error": "compilation failed",
            "retry_count": 1,
            "timestamp_ms": now_ms,
        })
        .to_string(),
    );

    let reason = project.hook(&stop_event(&project, "s1"))["decision"]["reason"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(reason.contains("[TOOL ERROR]"), "reason: {reason}");
    assert!(reason.contains("Retry with corrected parameters"));

    // Guidance is injected at most once.
    let second = project.hook(&stop_event(&project, "s1"))["decision"]["reason"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(!second.contains("[TOOL ERROR"), "reason: {second}");
}

#[test]
fn sixty_one_second_old_tool_error_is_ignored() {
    let project = Project::empty();
    write_ralph_state(&project, "s1", 1, 50);
    let stale_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
        - 61_000;
    project.file(
        ".omc/state/last-tool-error.json",
        &serde_json::json!({
            "tool_name": "Bash",
            "error": "old failure",
            "retry_count": 1,
            "timestamp_ms": stale_ms,
        })
        .to_string(),
    );

    let reason = project.hook(&stop_event(&project, "s1"))["decision"]["reason"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(!reason.contains("[TOOL ERROR"), "reason: {reason}");
}

#[test]
fn stop_hook_active_never_loops() {
    let project = Project::empty();
    write_ralph_state(&project, "s1", 5, 50);

    let mut payload = project.event("Stop", "s1");
    payload["stop_hook_active"] = serde_json::json!(true);
    let verdict = project.hook(&payload);
    assert!(verdict.get("decision").is_none(), "verdict: {verdict}");
}
