// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `.omc-config.json` loader.
//!
//! Unknown fields are tolerated for forward compatibility, but a config
//! whose known fields fail to typecheck is treated as absent (defaults),
//! with a warning on stderr — a bad config must never break a hook.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAX_ITERATIONS: u32 = 50;
pub const DEFAULT_NOTEPAD_PRUNE_DAYS: u32 = 7;

const FILE: &str = ".omc-config.json";

/// Kernel configuration, read from `<worktree>/.omc-config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmcConfig {
    /// Iteration budget applied when a mode start does not set one.
    pub default_max_iterations: u32,
    /// Working Memory entries older than this are pruned.
    pub notepad_prune_days: u32,
    /// Shell commands run (scatter-gather, failures swallowed) when a
    /// persistent mode releases a `Stop`.
    pub stop_callbacks: Vec<String>,
    /// Skip the linked ultrawork record when starting ralph.
    pub disable_ultrawork: bool,
}

impl Default for OmcConfig {
    fn default() -> Self {
        Self {
            default_max_iterations: DEFAULT_MAX_ITERATIONS,
            notepad_prune_days: DEFAULT_NOTEPAD_PRUNE_DAYS,
            stop_callbacks: Vec::new(),
            disable_ultrawork: false,
        }
    }
}

impl OmcConfig {
    /// Load the worktree config; missing or invalid files yield defaults.
    pub fn load(root: &Path) -> Self {
        let path = root.join(FILE);
        let Some(text) = omc_store::read_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "invalid .omc-config.json; using defaults");
                Self::default()
            }
        }
    }

    /// True when the config file exists and parses.
    pub fn is_readable(root: &Path) -> bool {
        let path = root.join(FILE);
        match omc_store::read_string(&path) {
            None => true, // absent is fine
            Some(text) => serde_json::from_str::<serde_json::Value>(&text).is_ok(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
