// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project memory: auto-detected environment facts (`project-memory.json`).

use crate::atomic::{atomic_write_json, safe_read_json};
use crate::error::StoreError;
use crate::paths::resolve_omc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const FILE: &str = "project-memory.json";

/// Detected facts about the project environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMemory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub frameworks: BTreeSet<String>,
    #[serde(default)]
    pub build_commands: BTreeSet<String>,
    #[serde(default)]
    pub updated_at: u64,
}

impl ProjectMemory {
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

    /// Merge a detection; returns true when anything changed.
    pub fn learn(
        &mut self,
        language: Option<&str>,
        framework: Option<&str>,
        build_command: Option<&str>,
        now_ms: u64,
    ) -> bool {
        let mut changed = false;
        if let Some(lang) = language {
            if self.language.as_deref() != Some(lang) {
                self.language = Some(lang.to_string());
                changed = true;
            }
        }
        if let Some(fw) = framework {
            changed |= self.frameworks.insert(fw.to_string());
        }
        if let Some(cmd) = build_command {
            changed |= self.build_commands.insert(cmd.to_string());
        }
        if changed {
            self.updated_at = now_ms;
        }
        changed
    }

    /// One-paragraph summary for context injection; `None` when empty.
    pub fn summary(&self) -> Option<String> {
        if self.language.is_none() && self.frameworks.is_empty() && self.build_commands.is_empty()
        {
            return None;
        }
        let mut parts = Vec::new();
        if let Some(lang) = &self.language {
            parts.push(format!("Language: {lang}"));
        }
        if !self.frameworks.is_empty() {
            parts.push(format!(
                "Frameworks: {}",
                self.frameworks.iter().cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        if !self.build_commands.is_empty() {
            parts.push(format!(
                "Build: {}",
                self.build_commands
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        Some(parts.join(". "))
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
