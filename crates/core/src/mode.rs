// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of orchestration modes and their static configuration.
//!
//! Every mode is either JSON-record backed (a `<mode>-state.json` document
//! with an `active` flag) or marker backed (a small sentinel JSON file whose
//! presence means "active", subject to staleness). Exclusivity and storage
//! kind are static properties of the mode, not of any one activation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default staleness bound for marker files: a marker older than this is
/// treated as leftover from a dead process and removed on read.
pub const MARKER_STALENESS_MS: u64 = 60 * 60 * 1000;

/// How a mode's activation is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeStorage {
    /// Typed JSON record with an `active` flag.
    Json,
    /// Sentinel marker file; existence (and freshness) means active.
    Marker,
}

/// One of the long-running orchestration workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeName {
    Autopilot,
    Ultrapilot,
    Ralph,
    Ultrawork,
    Ultraqa,
    Swarm,
    TeamPipeline,
    Ecomode,
    Pipeline,
}

crate::simple_display! {
    ModeName {
        Autopilot => "autopilot",
        Ultrapilot => "ultrapilot",
        Ralph => "ralph",
        Ultrawork => "ultrawork",
        Ultraqa => "ultraqa",
        Swarm => "swarm",
        TeamPipeline => "team-pipeline",
        Ecomode => "ecomode",
        Pipeline => "pipeline",
    }
}

/// Error for unknown mode names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for ModeName {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "autopilot" => Ok(Self::Autopilot),
            "ultrapilot" => Ok(Self::Ultrapilot),
            "ralph" => Ok(Self::Ralph),
            "ultrawork" => Ok(Self::Ultrawork),
            "ultraqa" => Ok(Self::Ultraqa),
            "swarm" => Ok(Self::Swarm),
            "team-pipeline" => Ok(Self::TeamPipeline),
            "ecomode" => Ok(Self::Ecomode),
            "pipeline" => Ok(Self::Pipeline),
            other => Err(UnknownMode(other.to_string())),
        }
    }
}

impl ModeName {
    /// Every mode, in a stable order (used for registry scans).
    pub const ALL: [ModeName; 9] = [
        ModeName::Autopilot,
        ModeName::Ultrapilot,
        ModeName::Ralph,
        ModeName::Ultrawork,
        ModeName::Ultraqa,
        ModeName::Swarm,
        ModeName::TeamPipeline,
        ModeName::Ecomode,
        ModeName::Pipeline,
    ];

    /// Modes that cannot coexist with other exclusive modes in one worktree.
    pub fn is_exclusive(self) -> bool {
        matches!(
            self,
            ModeName::Autopilot | ModeName::Ultrapilot | ModeName::Swarm | ModeName::TeamPipeline
        )
    }

    /// Modes whose `Stop` events are suppressed by the persistent-mode driver.
    pub fn is_persistent(self) -> bool {
        !matches!(self, ModeName::Swarm | ModeName::Ecomode)
    }

    /// How activations of this mode are persisted on disk.
    pub fn storage(self) -> ModeStorage {
        match self {
            ModeName::Swarm | ModeName::Ecomode => ModeStorage::Marker,
            _ => ModeStorage::Json,
        }
    }

    /// File name of the JSON state record under `.omc/state/`.
    ///
    /// Marker-backed modes have no JSON record; swarm in particular keeps
    /// its task state in SQLite and only a sentinel marker here.
    pub fn state_file_name(self) -> Option<String> {
        match self.storage() {
            ModeStorage::Json => Some(format!("{self}-state.json")),
            ModeStorage::Marker => None,
        }
    }

    /// File name of the marker sentinel under `.omc/state/`.
    pub fn marker_file_name(self) -> Option<String> {
        match self.storage() {
            ModeStorage::Marker => Some(format!("{self}-active.marker")),
            ModeStorage::Json => None,
        }
    }

    /// Markers older than this are auto-removed on read.
    pub fn staleness_ms(self) -> u64 {
        MARKER_STALENESS_MS
    }
}

#[cfg(test)]
#[path = "mode_tests.rs"]
mod tests;
