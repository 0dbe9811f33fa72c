// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Swarm queue specs: claims, contention, stale-claim reclamation.

use crate::prelude::*;

fn setup_swarm(project: &Project, tasks: &[(&str, &str)]) {
    project
        .omc()
        .args(["swarm", "start", "--agents", "3", "--session", "s"])
        .assert()
        .success();
    for (id, description) in tasks {
        project
            .omc()
            .args(["swarm", "add", "--id", id, "--description", description])
            .assert()
            .success();
    }
}

#[test]
fn three_agents_claim_three_distinct_tasks() {
    let project = Project::empty();
    setup_swarm(
        &project,
        &[("t1", "first"), ("t2", "second"), ("t3", "third")],
    );

    let mut claimed = Vec::new();
    for agent in ["a", "b", "c"] {
        let output = project
            .omc()
            .args(["swarm", "claim", "--agent", agent])
            .output()
            .expect("claim");
        let json = stdout_json(&output);
        assert_eq!(json["success"], true, "agent {agent}: {json}");
        claimed.push(json["task_id"].as_str().unwrap().to_string());
    }
    claimed.sort();
    assert_eq!(claimed, vec!["t1", "t2", "t3"]);
}

#[test]
fn second_claimer_on_single_task_gets_structured_failure() {
    let project = Project::empty();
    setup_swarm(&project, &[("only", "the one task")]);

    let win = stdout_json(
        &project
            .omc()
            .args(["swarm", "claim", "--agent", "a"])
            .output()
            .expect("claim"),
    );
    assert_eq!(win["success"], true);

    let lose = stdout_json(
        &project
            .omc()
            .args(["swarm", "claim", "--agent", "b"])
            .output()
            .expect("claim"),
    );
    assert_eq!(lose["success"], false);
    assert_eq!(lose["reason"], "No pending tasks available");

    let status = stdout_json(
        &project
            .omc()
            .args(["swarm", "status"])
            .output()
            .expect("status"),
    );
    assert_eq!(status["counts"]["claimed"], 1);
    assert_eq!(status["counts"]["pending"], 0);
}

#[test]
fn stale_claim_is_reclaimed() {
    let project = Project::empty();
    setup_swarm(&project, &[("t1", "reclaim me")]);

    project
        .omc()
        .args(["swarm", "claim", "--agent", "ghost"])
        .assert()
        .success();

    // The worker never heartbeats again; with a tiny threshold any gap is
    // past the deadline.
    std::thread::sleep(std::time::Duration::from_millis(25));
    let cleaned = stdout_json(
        &project
            .omc()
            .args(["swarm", "cleanup", "--threshold-ms", "1"])
            .output()
            .expect("cleanup"),
    );
    assert_eq!(cleaned["released"], 1);

    let status = stdout_json(
        &project
            .omc()
            .args(["swarm", "status"])
            .output()
            .expect("status"),
    );
    assert_eq!(status["counts"]["pending"], 1);
    assert_eq!(status["agents"].as_array().unwrap().len(), 0);

    // The task is claimable again.
    let reclaim = stdout_json(
        &project
            .omc()
            .args(["swarm", "claim", "--agent", "b"])
            .output()
            .expect("claim"),
    );
    assert_eq!(reclaim["success"], true);
    assert_eq!(reclaim["task_id"], "t1");
}

#[test]
fn completed_tasks_finish_the_swarm() {
    let project = Project::empty();
    setup_swarm(&project, &[("t1", "one")]);

    project
        .omc()
        .args(["swarm", "claim", "--agent", "a"])
        .assert()
        .success();
    project
        .omc()
        .args(["swarm", "start-task", "--agent", "a", "--task", "t1"])
        .assert()
        .success();
    project
        .omc()
        .args(["swarm", "complete", "--task", "t1", "--result", "done"])
        .assert()
        .success();

    let status = stdout_json(
        &project
            .omc()
            .args(["swarm", "status"])
            .output()
            .expect("status"),
    );
    assert_eq!(status["complete"], true);
}

#[test]
fn swarm_blocks_other_exclusive_modes_until_stopped() {
    let project = Project::empty();
    setup_swarm(&project, &[]);

    project
        .omc()
        .args(["mode", "start", "autopilot", "--prompt", "p"])
        .assert()
        .failure();

    project
        .omc()
        .args(["swarm", "stop", "--delete-db"])
        .assert()
        .success();
    assert!(!project.path().join(".omc/state/swarm.db").exists());

    project
        .omc()
        .args(["mode", "start", "autopilot", "--prompt", "p"])
        .assert()
        .success();
}
