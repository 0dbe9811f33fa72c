// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compaction-resilient notepad: a three-section Markdown document.
//!
//! - `## Priority Context` — always injected, capped at 500 chars
//! - `## Working Memory` — timestamped entries, pruned after a configured age
//! - `## MANUAL` — user-owned, never touched by pruning
//!
//! The parser is loose: content before the first known heading is preserved
//! verbatim so a hand-edited file round-trips without loss.

use chrono::{DateTime, Duration, Utc};

/// Hard cap on the injected Priority Context excerpt.
pub const PRIORITY_MAX_CHARS: usize = 500;

const PRIORITY_HEADING: &str = "## Priority Context";
const WORKING_HEADING: &str = "## Working Memory";
const MANUAL_HEADING: &str = "## MANUAL";

/// One timestamped Working Memory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingEntry {
    /// Parsed from the `### <RFC 3339>` heading when possible.
    pub timestamp: Option<DateTime<Utc>>,
    /// The raw heading text (kept verbatim for unparseable stamps).
    pub heading: String,
    pub body: String,
}

/// Parsed notepad document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notepad {
    /// Anything before the first known section heading.
    pub preamble: String,
    pub priority: String,
    pub working: Vec<WorkingEntry>,
    pub manual: String,
}

impl Notepad {
    pub fn parse(text: &str) -> Self {
        let mut doc = Notepad::default();
        let mut section = Section::Preamble;
        let mut priority = Vec::new();
        let mut manual = Vec::new();
        let mut preamble = Vec::new();
        let mut working_raw: Vec<(String, Vec<String>)> = Vec::new();

        for line in text.lines() {
            match line.trim_end() {
                PRIORITY_HEADING => section = Section::Priority,
                WORKING_HEADING => section = Section::Working,
                MANUAL_HEADING => section = Section::Manual,
                _ => {
                    match section {
                        Section::Preamble => preamble.push(line),
                        Section::Priority => priority.push(line),
                        Section::Manual => manual.push(line),
                        Section::Working => {
                            if let Some(heading) = line.strip_prefix("### ") {
                                working_raw.push((heading.trim().to_string(), Vec::new()));
                            } else if let Some((_, body)) = working_raw.last_mut() {
                                body.push(line.to_string());
                            }
                            // Loose text before the first entry heading is dropped
                        }
                    }
                    continue;
                }
            }
        }

        doc.preamble = trim_block(&preamble.join("\n"));
        doc.priority = trim_block(&priority.join("\n"));
        doc.manual = trim_block(&manual.join("\n"));
        doc.working = working_raw
            .into_iter()
            .map(|(heading, body)| WorkingEntry {
                timestamp: DateTime::parse_from_rfc3339(&heading)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
                heading,
                body: trim_block(&body.join("\n")),
            })
            .collect();
        doc
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.preamble.is_empty() {
            out.push_str(&self.preamble);
            out.push_str("\n\n");
        }
        out.push_str(PRIORITY_HEADING);
        out.push('\n');
        if !self.priority.is_empty() {
            out.push_str(&self.priority);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(WORKING_HEADING);
        out.push('\n');
        for entry in &self.working {
            out.push_str("\n### ");
            out.push_str(&entry.heading);
            out.push('\n');
            if !entry.body.is_empty() {
                out.push_str(&entry.body);
                out.push('\n');
            }
        }
        out.push('\n');
        out.push_str(MANUAL_HEADING);
        out.push('\n');
        if !self.manual.is_empty() {
            out.push_str(&self.manual);
            out.push('\n');
        }
        out
    }

    /// Append a Working Memory entry stamped with `now`.
    pub fn append_working(&mut self, text: impl Into<String>, now: DateTime<Utc>) {
        self.working.push(WorkingEntry {
            timestamp: Some(now),
            heading: now.to_rfc3339(),
            body: text.into(),
        });
    }

    /// Append to Priority Context, keeping the section under the cap.
    pub fn append_priority(&mut self, text: &str) {
        if !self.priority.is_empty() {
            self.priority.push('\n');
        }
        self.priority.push_str(text);
        if self.priority.chars().count() > PRIORITY_MAX_CHARS {
            self.priority = self.priority.chars().take(PRIORITY_MAX_CHARS).collect();
        }
    }

    /// The injectable excerpt: Priority Context clipped to the cap.
    pub fn priority_excerpt(&self) -> String {
        self.priority.chars().take(PRIORITY_MAX_CHARS).collect()
    }

    /// Drop Working Memory entries older than `max_age`. Entries with an
    /// unparseable stamp are kept. Returns the number removed.
    pub fn prune_working(&mut self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let before = self.working.len();
        self.working.retain(|entry| match entry.timestamp {
            Some(ts) => now.signed_duration_since(ts) <= max_age,
            None => true,
        });
        before - self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preamble.is_empty()
            && self.priority.is_empty()
            && self.working.is_empty()
            && self.manual.is_empty()
    }
}

enum Section {
    Preamble,
    Priority,
    Working,
    Manual,
}

fn trim_block(s: &str) -> String {
    s.trim_matches('\n').to_string()
}

#[cfg(test)]
#[path = "notepad_tests.rs"]
mod tests;
