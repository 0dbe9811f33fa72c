// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use tempfile::TempDir;

#[yare::parameterized(
    simple      = { "state/ralph-state.json" },
    nested      = { "notepads/plan-a/learnings.md" },
    dotted_file = { "state/.hidden" },
    cur_dir     = { "./state/x.json" },
)]
fn valid_relative_paths(input: &str) {
    validate_relative(input).unwrap();
}

#[yare::parameterized(
    absolute    = { "/etc/passwd" },
    tilde       = { "~/secrets" },
    parent      = { "../outside" },
    mid_parent  = { "state/../../outside" },
    empty       = { "" },
    nul         = { "state/\0x" },
)]
fn invalid_relative_paths(input: &str) {
    assert!(matches!(
        validate_relative(input),
        Err(StoreError::InvalidPath(_))
    ));
}

#[test]
fn resolve_omc_lands_under_omc_dir() {
    let root = Path::new("/work/repo");
    let path = resolve_omc("state/ralph-state.json", root).unwrap();
    assert_eq!(path, root.join(".omc/state/ralph-state.json"));
}

#[test]
fn resolve_state_rejects_swarm() {
    let err = resolve_state(ModeName::Swarm, Path::new("/work/repo")).unwrap_err();
    assert!(matches!(err, StoreError::NoStateFile(ModeName::Swarm)));
}

#[test]
fn resolve_session_state_sanitizes_separators() {
    let path =
        resolve_session_state(ModeName::Ralph, "a/b\\c", Path::new("/work/repo")).unwrap();
    assert_eq!(
        path,
        Path::new("/work/repo/.omc/state/sessions/a_b_c/ralph-state.json")
    );
}

#[yare::parameterized(
    slash      = { "sess/1", "sess_1" },
    backslash  = { "sess\\1", "sess_1" },
    dot_dot    = { "..", "__" },
    single_dot = { ".", "_" },
    plain      = { "pid-42-100", "pid-42-100" },
)]
fn sanitize_session_ids(input: &str, expected: &str) {
    assert_eq!(sanitize_session_id(input).unwrap(), expected);
}

#[test]
fn empty_session_id_is_rejected() {
    assert!(matches!(
        sanitize_session_id(""),
        Err(StoreError::InvalidSessionId)
    ));
}

#[test]
#[serial_test::serial]
fn worktree_root_finds_git_ancestor() {
    clear_worktree_cache();
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    std::fs::create_dir_all(repo.join(".git")).unwrap();
    let deep = repo.join("src/nested");
    std::fs::create_dir_all(&deep).unwrap();

    assert_eq!(worktree_root(&deep), repo);
}

#[test]
#[serial_test::serial]
fn failed_lookup_is_not_cached() {
    clear_worktree_cache();
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("plain");
    std::fs::create_dir_all(&dir).unwrap();

    // No repository yet: falls back to the cwd itself.
    assert_eq!(worktree_root(&dir), dir);

    // The directory becomes a repository; the root must be re-detected.
    std::fs::create_dir_all(dir.join(".git")).unwrap();
    assert_eq!(worktree_root(&dir), dir);
    let nested = dir.join("sub");
    std::fs::create_dir_all(&nested).unwrap();
    assert_eq!(worktree_root(&nested), dir);
}

#[test]
#[serial_test::serial]
fn validate_working_directory_accepts_inside() {
    clear_worktree_cache();
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    std::fs::create_dir_all(repo.join(".git")).unwrap();
    std::fs::create_dir_all(repo.join("src")).unwrap();

    let ok = validate_working_directory(Some(Path::new("src")), &repo).unwrap();
    assert!(ok.ends_with("src"));
}

#[test]
#[serial_test::serial]
fn validate_working_directory_rejects_outside() {
    clear_worktree_cache();
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    std::fs::create_dir_all(repo.join(".git")).unwrap();
    let outside = temp.path().join("elsewhere");
    std::fs::create_dir_all(&outside).unwrap();

    assert!(matches!(
        validate_working_directory(Some(&outside), &repo),
        Err(StoreError::PathEscape(_))
    ));
}

#[test]
#[serial_test::serial]
fn validate_working_directory_resolves_symlink_escapes() {
    clear_worktree_cache();
    let temp = TempDir::new().unwrap();
    let repo = temp.path().join("repo");
    std::fs::create_dir_all(repo.join(".git")).unwrap();
    let outside = temp.path().join("target");
    std::fs::create_dir_all(&outside).unwrap();

    #[cfg(unix)]
    {
        let link = repo.join("sneaky");
        std::os::unix::fs::symlink(&outside, &link).unwrap();
        assert!(matches!(
            validate_working_directory(Some(Path::new("sneaky")), &repo),
            Err(StoreError::PathEscape(_))
        ));
    }
}

proptest! {
    /// Path-guard soundness: anything `validate_relative` accepts resolves
    /// to a path under `<root>/.omc`.
    #[test]
    fn accepted_paths_resolve_under_omc(input in "[a-zA-Z0-9._~/-]{1,40}") {
        let root = Path::new("/work/repo");
        if validate_relative(&input).is_ok() {
            let resolved = resolve_omc(&input, root).unwrap();
            prop_assert!(resolved.starts_with(root.join(".omc")));
        }
    }
}
