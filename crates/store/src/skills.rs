// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session injection dedup cache (`state/skill-sessions.json`).
//!
//! Skills dedup at path level, rules at content-hash level, both scoped to
//! the session so a new session re-injects everything once.

use crate::atomic::{atomic_write_json, safe_read_json};
use crate::error::StoreError;
use crate::paths::resolve_omc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const FILE: &str = "state/skill-sessions.json";

/// Per-session sets of already-injected skills and rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInjections {
    #[serde(default)]
    pub skill_paths: BTreeSet<String>,
    #[serde(default)]
    pub rule_hashes: BTreeSet<String>,
}

/// The cache document keyed by session id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSessions {
    #[serde(default)]
    pub sessions: BTreeMap<String, SessionInjections>,
}

impl SkillSessions {
    pub fn load(root: &Path) -> Self {
        resolve_omc(FILE, root)
            .ok()
            .and_then(|path| safe_read_json(&path))
            .unwrap_or_default()
    }

    pub fn save(&self, root: &Path) -> Result<(), StoreError> {
        let path = resolve_omc(FILE, root)?;
        atomic_write_json(&path, self)
    }

    /// Mark a skill as injected. Returns true when this is the first
    /// injection for the session (i.e. the caller should inject).
    pub fn mark_skill(&mut self, session_id: &str, skill_path: &str) -> bool {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .skill_paths
            .insert(skill_path.to_string())
    }

    /// Mark a rule content hash as injected. Same contract as `mark_skill`.
    pub fn mark_rule(&mut self, session_id: &str, content_hash: &str) -> bool {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .rule_hashes
            .insert(content_hash.to_string())
    }

    /// Drop a session's dedup sets (on session end).
    pub fn forget_session(&mut self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }
}

#[cfg(test)]
#[path = "skills_tests.rs"]
mod tests;
