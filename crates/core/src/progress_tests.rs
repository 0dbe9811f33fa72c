// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SAMPLE: &str = "\
PATTERNS:
- tests need the fixture server running
- prefer snapshot tests for codecs
---
[2026-01-01T10:00:00Z] US-1
Implemented login flow.
---
[2026-01-02T09:30:00Z] US-2
Signup form wired to API.
";

#[test]
fn parse_patterns_and_entries() {
    let log = ProgressLog::parse(SAMPLE);
    assert_eq!(log.patterns.len(), 2);
    assert_eq!(log.patterns[0], "tests need the fixture server running");
    assert_eq!(log.entries.len(), 2);
    assert!(log.entries[1].contains("US-2"));
}

#[test]
fn parse_without_patterns_header() {
    let log = ProgressLog::parse("[stamp] US-1\nDid a thing.\n");
    assert!(log.patterns.is_empty());
    assert_eq!(log.entries.len(), 1);
}

#[test]
fn empty_text_parses_to_empty_log() {
    let log = ProgressLog::parse("");
    assert!(log.patterns.is_empty());
    assert!(log.entries.is_empty());
    assert_eq!(log.render(), "");
}

#[test]
fn render_parse_roundtrip() {
    let log = ProgressLog::parse(SAMPLE);
    let again = ProgressLog::parse(&log.render());
    assert_eq!(log, again);
}

#[test]
fn append_entry_goes_to_tail() {
    let mut log = ProgressLog::parse(SAMPLE);
    log.append_entry("US-3", "Logout works.", "2026-01-03T08:00:00Z");
    assert_eq!(log.entries.len(), 3);
    assert!(log.entries[2].starts_with("[2026-01-03T08:00:00Z] US-3"));
}

#[test]
fn recent_returns_tail_in_order() {
    let log = ProgressLog::parse(SAMPLE);
    let tail = log.recent(1);
    assert_eq!(tail.len(), 1);
    assert!(tail[0].contains("US-2"));
    assert_eq!(log.recent(10).len(), 2);
}
