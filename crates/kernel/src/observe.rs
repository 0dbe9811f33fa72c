// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PostToolUse observers: remember-tag scraping, tool-error recording, and
//! the project-memory learner. Observers only write state; they never shape
//! the verdict.

use crate::bus::HookContext;
use crate::error::KernelError;
use omc_core::{Clock, FailureOutcome, UltraQaState, Verdict};
use omc_store::{
    clear_state, load_notepad, read_state_for_session, record_tool_error, save_notepad,
    write_state, ProjectMemory,
};

pub fn handle<C: Clock>(
    ctx: &HookContext<C>,
    tool_name: &str,
    tool_input: &serde_json::Value,
    tool_response: &serde_json::Value,
) -> Result<Verdict, KernelError> {
    scrape_remember_tags(ctx, tool_response)?;
    let failure = record_failure(ctx, tool_name, tool_response)?;
    learn_project_facts(ctx, tool_input)?;

    if let Some(error_text) = failure {
        if let Some(message) = advance_ultraqa(ctx, &error_text)? {
            return Ok(Verdict::allow().with_system_message(message));
        }
    }
    Ok(Verdict::allow())
}

/// Count a failed QA cycle against an active ultraqa record. A terminal
/// outcome clears the record and reports why the loop ended.
fn advance_ultraqa<C: Clock>(
    ctx: &HookContext<C>,
    error_text: &str,
) -> Result<Option<String>, KernelError> {
    let Some(mut qa) =
        read_state_for_session::<UltraQaState>(&ctx.root, &ctx.session_id).filter(|s| s.active)
    else {
        return Ok(None);
    };
    match qa.record_failure(error_text, ctx.now_ms()) {
        FailureOutcome::Continue { cycle } => {
            write_state(&ctx.root, &qa)?;
            tracing::debug!(cycle, "ultraqa cycle advanced after tool failure");
            Ok(None)
        }
        FailureOutcome::Exit(reason) => {
            clear_state::<UltraQaState>(&ctx.root)?;
            let result = qa.finish(reason);
            Ok(Some(format!(
                "[ULTRAQA] exiting ({}) after {} cycles, {} recorded failures",
                result.reason,
                result.cycles,
                result.failures.len()
            )))
        }
    }
}

/// `<remember>...</remember>` goes to Working Memory;
/// `<remember priority>...</remember>` to Priority Context.
fn scrape_remember_tags<C: Clock>(
    ctx: &HookContext<C>,
    tool_response: &serde_json::Value,
) -> Result<(), KernelError> {
    let mut text = String::new();
    collect_strings(tool_response, &mut text);
    if !text.contains("<remember") {
        return Ok(());
    }

    let mut notepad = load_notepad(&ctx.root);
    let mut changed = false;
    for (tag, priority) in [("<remember priority>", true), ("<remember>", false)] {
        for body in extract_tag_bodies(&text, tag) {
            if priority {
                notepad.append_priority(&body);
            } else {
                notepad.append_working(body, ctx.clock.utc_now());
            }
            changed = true;
        }
    }
    if changed {
        notepad.prune_working(
            chrono::Duration::days(i64::from(ctx.config.notepad_prune_days)),
            ctx.clock.utc_now(),
        );
        save_notepad(&ctx.root, &notepad)?;
    }
    Ok(())
}

/// Record tool failures for the stop driver's retry guidance. Returns the
/// error text when the tool failed.
fn record_failure<C: Clock>(
    ctx: &HookContext<C>,
    tool_name: &str,
    tool_response: &serde_json::Value,
) -> Result<Option<String>, KernelError> {
    let failed = tool_response
        .get("is_error")
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
        || tool_response.get("error").is_some_and(|v| !v.is_null());
    if !failed {
        return Ok(None);
    }
    let error_text = tool_response
        .get("error")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let mut text = String::new();
            collect_strings(tool_response, &mut text);
            let mut end = text.len().min(500);
            while !text.is_char_boundary(end) {
                end -= 1;
            }
            text.truncate(end);
            text
        });
    record_tool_error(&ctx.root, tool_name, &error_text, ctx.now_ms())?;
    Ok(Some(error_text))
}

/// Learn language/build facts from files the tools touch.
fn learn_project_facts<C: Clock>(
    ctx: &HookContext<C>,
    tool_input: &serde_json::Value,
) -> Result<(), KernelError> {
    let mut text = String::new();
    collect_strings(tool_input, &mut text);

    let detections: &[(&str, Option<&str>, Option<&str>, Option<&str>)] = &[
        ("Cargo.toml", Some("rust"), None, Some("cargo build")),
        ("package.json", Some("javascript"), None, Some("npm run build")),
        ("pyproject.toml", Some("python"), None, None),
        ("go.mod", Some("go"), None, Some("go build")),
        ("next.config", None, Some("next"), None),
        ("vite.config", None, Some("vite"), None),
    ];

    let mut memory = ProjectMemory::load(&ctx.root);
    let mut changed = false;
    for (needle, language, framework, build) in detections {
        if text.contains(needle) {
            changed |= memory.learn(*language, *framework, *build, ctx.now_ms());
        }
    }
    if changed {
        memory.save(&ctx.root)?;
    }
    Ok(())
}

/// Concatenate every string value in a JSON tree.
fn collect_strings(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::String(s) => {
            out.push_str(s);
            out.push('\n');
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        serde_json::Value::Object(map) => {
            for item in map.values() {
                collect_strings(item, out);
            }
        }
        _ => {}
    }
}

/// Bodies of `<tag>body</remember>` occurrences, in order.
fn extract_tag_bodies(text: &str, open_tag: &str) -> Vec<String> {
    let close_tag = "</remember>";
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(open_tag) {
        let after = &rest[start + open_tag.len()..];
        let Some(end) = after.find(close_tag) else {
            break;
        };
        let body = after[..end].trim();
        if !body.is_empty() {
            out.push(body.to_string());
        }
        rest = &after[end + close_tag.len()..];
    }
    out
}

#[cfg(test)]
#[path = "observe_tests.rs"]
mod tests;
