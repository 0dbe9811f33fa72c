// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PRD document: an ordered set of user stories with pass/fail state.

use serde::{Deserialize, Serialize};

/// One user story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub priority: i64,
    #[serde(default)]
    pub passes: bool,
}

/// The product-requirements document (`prd.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prd {
    #[serde(default)]
    pub stories: Vec<Story>,
}

impl Prd {
    /// Parse `prd.json` content. Accepts either `{"stories": [...]}` or a
    /// bare story array; malformed content is treated as no PRD.
    pub fn parse(text: &str) -> Option<Prd> {
        if let Ok(prd) = serde_json::from_str::<Prd>(text) {
            return Some(prd);
        }
        serde_json::from_str::<Vec<Story>>(text)
            .ok()
            .map(|stories| Prd { stories })
    }

    /// The next story to work: lowest priority among incomplete stories,
    /// ties broken by document order.
    pub fn next_story(&self) -> Option<&Story> {
        self.stories
            .iter()
            .filter(|s| !s.passes)
            .min_by_key(|s| s.priority)
    }

    /// All stories pass.
    pub fn is_complete(&self) -> bool {
        self.stories.iter().all(|s| s.passes)
    }

    pub fn passing_count(&self) -> usize {
        self.stories.iter().filter(|s| s.passes).count()
    }

    /// One-line status for continuation prompts.
    pub fn status_line(&self) -> String {
        let total = self.stories.len();
        let passing = self.passing_count();
        match self.next_story() {
            Some(next) if next.title.is_empty() => {
                format!("PRD: {passing}/{total} stories passing. Next story: {}", next.id)
            }
            Some(next) => format!(
                "PRD: {passing}/{total} stories passing. Next story: {} — {}",
                next.id, next.title
            ),
            None => format!("PRD: all {total} stories passing."),
        }
    }
}

#[cfg(test)]
#[path = "prd_tests.rs"]
mod tests;
