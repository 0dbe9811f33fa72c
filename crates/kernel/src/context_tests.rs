// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_util::{ctx_at, TEST_SESSION};
use omc_store::write_state;
use tempfile::TempDir;

#[test]
fn empty_worktree_builds_no_context() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    assert_eq!(build(&ctx, Some("hello")).unwrap(), None);
}

#[test]
fn project_memory_leads_the_context() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let mut memory = ProjectMemory::default();
    memory.learn(Some("rust"), Some("tokio"), None, 1);
    memory.save(temp.path()).unwrap();

    let text = build(&ctx, Some("anything")).unwrap().unwrap();
    assert!(text.starts_with("## Project"), "got: {text}");
    assert!(text.contains("rust"));
}

#[test]
fn mentioned_directory_readme_is_included() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    std::fs::create_dir_all(temp.path().join("src/api")).unwrap();
    std::fs::write(
        temp.path().join("src/api/README.md"),
        "API layer. All handlers are async.",
    )
    .unwrap();

    let text = build(&ctx, Some("fix the bug in src/api please"))
        .unwrap()
        .unwrap();
    assert!(text.contains("src/api/README.md"));
    assert!(text.contains("All handlers are async."));
}

#[test]
fn skills_inject_on_keyword_once_per_session() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let skills = temp.path().join(".omc/skills");
    std::fs::create_dir_all(&skills).unwrap();
    std::fs::write(skills.join("deploy.md"), "Run the deploy checklist.").unwrap();

    let first = build(&ctx, Some("deploy to staging")).unwrap().unwrap();
    assert!(first.contains("## Skill: deploy"));

    // Second prompt in the same session: deduped.
    assert_eq!(build(&ctx, Some("deploy again")).unwrap(), None);
}

#[test]
fn skill_not_mentioned_is_not_injected() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let skills = temp.path().join(".omc/skills");
    std::fs::create_dir_all(&skills).unwrap();
    std::fs::write(skills.join("deploy.md"), "checklist").unwrap();

    assert_eq!(build(&ctx, Some("write a parser")).unwrap(), None);
}

#[test]
fn rules_inject_once_by_content_hash() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let rules = temp.path().join(".omc/rules");
    std::fs::create_dir_all(&rules).unwrap();
    std::fs::write(rules.join("style.md"), "No unwrap in src/.").unwrap();

    let first = build(&ctx, Some("hi")).unwrap().unwrap();
    assert!(first.contains("## Rule: style"));
    assert_eq!(build(&ctx, Some("hi again")).unwrap(), None);
}

#[test]
fn prd_section_present_while_prd_ralph_active() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let ralph = RalphState::builder()
        .session_id(TEST_SESSION)
        .prd_mode(true)
        .build();
    write_state(&ctx.root, &ralph).unwrap();
    std::fs::create_dir_all(temp.path().join(".omc")).unwrap();
    std::fs::write(
        temp.path().join(".omc/prd.json"),
        r#"{"stories":[{"id":"US-1","priority":1,"passes":false}]}"#,
    )
    .unwrap();

    let text = build(&ctx, Some("continue")).unwrap().unwrap();
    assert!(text.contains("## PRD"));
    assert!(text.contains("US-1"));
}

#[test]
fn progress_patterns_are_included() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    std::fs::create_dir_all(temp.path().join(".omc")).unwrap();
    std::fs::write(
        temp.path().join(".omc/progress.txt"),
        "PATTERNS:\n- fixture server required\n---\n[s] US-1\ndone\n",
    )
    .unwrap();

    let text = build(&ctx, Some("next story")).unwrap().unwrap();
    assert!(text.contains("## Progress"));
    assert!(text.contains("fixture server required"));
}

#[test]
fn budget_drops_tail_sections_first() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    // Primary: project memory. Secondary: one giant skill.
    let mut memory = ProjectMemory::default();
    memory.learn(Some("rust"), None, None, 1);
    memory.save(temp.path()).unwrap();

    let rules = temp.path().join(".omc/rules");
    std::fs::create_dir_all(&rules).unwrap();
    std::fs::write(rules.join("big.md"), "x".repeat(CONTEXT_BUDGET)).unwrap();

    let text = build(&ctx, Some("hello")).unwrap().unwrap();
    assert!(text.len() <= CONTEXT_BUDGET);
    assert!(text.starts_with("## Project"));
}

#[test]
fn skill_bodies_are_clipped() {
    let temp = TempDir::new().unwrap();
    let ctx = ctx_at(temp.path());
    let skills = temp.path().join(".omc/skills");
    std::fs::create_dir_all(&skills).unwrap();
    std::fs::write(skills.join("deploy.md"), "y".repeat(5_000)).unwrap();

    let text = build(&ctx, Some("deploy now")).unwrap().unwrap();
    assert!(text.len() < 2_000, "skill body not clipped: {}", text.len());
}
