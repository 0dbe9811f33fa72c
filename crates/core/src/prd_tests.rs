// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const PRD_JSON: &str = r#"{
  "stories": [
    {"id": "US-1", "title": "login", "priority": 2, "passes": true},
    {"id": "US-2", "title": "signup", "priority": 1, "passes": false},
    {"id": "US-3", "title": "logout", "priority": 1, "passes": false}
  ]
}"#;

#[test]
fn parse_envelope_shape() {
    let prd = Prd::parse(PRD_JSON).unwrap();
    assert_eq!(prd.stories.len(), 3);
}

#[test]
fn parse_bare_array_shape() {
    let prd = Prd::parse(r#"[{"id": "A", "priority": 1}]"#).unwrap();
    assert_eq!(prd.stories.len(), 1);
    assert!(!prd.stories[0].passes);
}

#[test]
fn malformed_prd_is_none() {
    assert!(Prd::parse("{broken").is_none());
    assert!(Prd::parse(r#"{"stories": "nope"}"#).is_none());
}

#[test]
fn next_story_is_lowest_priority_incomplete() {
    let prd = Prd::parse(PRD_JSON).unwrap();
    // US-2 and US-3 share priority 1; document order breaks the tie.
    assert_eq!(prd.next_story().unwrap().id, "US-2");
}

#[test]
fn completion_requires_all_passing() {
    let mut prd = Prd::parse(PRD_JSON).unwrap();
    assert!(!prd.is_complete());
    for story in &mut prd.stories {
        story.passes = true;
    }
    assert!(prd.is_complete());
    assert!(prd.next_story().is_none());
}

#[test]
fn empty_prd_is_trivially_complete() {
    assert!(Prd::default().is_complete());
}

#[test]
fn status_line_names_next_story() {
    let prd = Prd::parse(PRD_JSON).unwrap();
    let line = prd.status_line();
    assert!(line.contains("1/3"));
    assert!(line.contains("US-2"));
    assert!(line.contains("signup"));
}
