// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only progress log (`progress.txt`).
//!
//! Layout: an optional `PATTERNS:` header block of consolidated learnings,
//! then `---`-separated per-story entries in chronological order.

const SEPARATOR: &str = "---";
const PATTERNS_HEADER: &str = "PATTERNS:";

/// Parsed progress log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressLog {
    /// Consolidated pattern lines from the header block.
    pub patterns: Vec<String>,
    /// Per-story entries, oldest first.
    pub entries: Vec<String>,
}

impl ProgressLog {
    pub fn parse(text: &str) -> Self {
        let separator = format!("\n{SEPARATOR}\n");
        let mut segments = text
            .split(&separator)
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let mut log = ProgressLog::default();
        if let Some(first) = segments.next() {
            if let Some(block) = first.strip_prefix(PATTERNS_HEADER) {
                log.patterns = block
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(|l| l.trim_start_matches("- ").to_string())
                    .collect();
            } else {
                log.entries.push(first.to_string());
            }
        }
        log.entries.extend(segments.map(String::from));
        log
    }

    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if !self.patterns.is_empty() {
            let block: String = self
                .patterns
                .iter()
                .map(|p| format!("- {p}\n"))
                .collect();
            parts.push(format!("{PATTERNS_HEADER}\n{block}").trim_end().to_string());
        }
        parts.extend(self.entries.iter().cloned());
        let mut out = parts.join(&format!("\n{SEPARATOR}\n"));
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    /// Append a per-story entry.
    pub fn append_entry(&mut self, story_id: &str, text: &str, stamp: &str) {
        self.entries
            .push(format!("[{stamp}] {story_id}\n{}", text.trim()));
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[String] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
