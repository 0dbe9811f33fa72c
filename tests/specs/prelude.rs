// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spec-test harness: a scratch project plus `omc` invocation helpers.

use std::path::Path;
use tempfile::TempDir;

pub struct Project {
    temp: TempDir,
}

impl Project {
    /// A scratch worktree with a `.git` directory so root detection binds
    /// state to this project rather than a parent.
    pub fn empty() -> Self {
        let temp = TempDir::new().expect("create temp project");
        std::fs::create_dir_all(temp.path().join(".git")).expect("create .git");
        Self { temp }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write a file relative to the project root.
    pub fn file(&self, relative: &str, content: &str) {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(path, content).expect("write file");
    }

    /// An `omc` command rooted in this project.
    pub fn omc(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("omc").expect("omc binary");
        cmd.current_dir(self.temp.path());
        cmd
    }

    /// Run `omc hook` with the given stdin payload and parse the verdict.
    pub fn hook(&self, payload: &serde_json::Value) -> serde_json::Value {
        let output = self
            .omc()
            .arg("hook")
            .write_stdin(payload.to_string())
            .output()
            .expect("run omc hook");
        assert!(
            output.status.success(),
            "hook exited nonzero: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(stdout.trim()).unwrap_or_else(|err| {
            panic!("hook stdout was not one JSON object ({err}): {stdout}")
        })
    }

    /// A hook payload with this project's path as cwd.
    pub fn event(&self, name: &str, session: &str) -> serde_json::Value {
        serde_json::json!({
            "hook_event_name": name,
            "session_id": session,
            "cwd": self.temp.path().display().to_string(),
        })
    }
}

/// Parse the last line of stdout as JSON (operator commands print one line).
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().last().unwrap_or_default();
    serde_json::from_str(line)
        .unwrap_or_else(|err| panic!("stdout was not JSON ({err}): {stdout}"))
}
