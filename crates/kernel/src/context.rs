// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context injection pipeline.
//!
//! Assembles one `additionalContext` string from, in order: project memory,
//! directory READMEs for paths the prompt mentions, rules, skills matched by
//! trigger keyword, PRD status, and progress learnings. The first three
//! survive budget pressure; skill bodies truncate before sections drop.

use crate::bus::HookContext;
use crate::error::KernelError;
use omc_core::progress::ProgressLog;
use omc_core::{Clock, Prd, RalphState};
use omc_store::{
    omc_dir, read_state, read_string, resolve_omc, ProjectMemory, SkillSessions,
};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Overall character budget for the assembled context.
pub const CONTEXT_BUDGET: usize = 6_000;

/// Cap on one injected skill body.
const SKILL_BODY_MAX: usize = 1_200;

/// Cap on one injected README excerpt.
const README_MAX: usize = 600;

/// Build the injected context; `None` when nothing applies.
pub fn build<C: Clock>(
    ctx: &HookContext<C>,
    prompt: Option<&str>,
) -> Result<Option<String>, KernelError> {
    let mut dedup = SkillSessions::load(&ctx.root);
    let mut dedup_dirty = false;

    // §1–§3: kept under budget pressure.
    let mut primary: Vec<String> = Vec::new();
    if let Some(summary) = ProjectMemory::load(&ctx.root).summary() {
        primary.push(format!("## Project\n{summary}"));
    }
    primary.extend(directory_sections(&ctx.root, prompt));
    primary.extend(rule_sections(ctx, &mut dedup, &mut dedup_dirty));

    // §4–§6: dropped from the tail when over budget.
    let mut secondary: Vec<String> = Vec::new();
    secondary.extend(skill_sections(ctx, prompt, &mut dedup, &mut dedup_dirty));
    secondary.extend(prd_section(ctx));
    secondary.extend(progress_section(&ctx.root));

    if dedup_dirty {
        dedup.save(&ctx.root)?;
    }

    let assembled = assemble(primary, secondary);
    Ok((!assembled.is_empty()).then_some(assembled))
}

fn assemble(primary: Vec<String>, mut secondary: Vec<String>) -> String {
    let join = |sections: &[String]| sections.join("\n\n");
    let primary_len = join(&primary).len();

    // Drop secondary sections from the tail until everything fits.
    while !secondary.is_empty() {
        let total = primary_len + 2 + join(&secondary).len();
        if total <= CONTEXT_BUDGET {
            break;
        }
        secondary.pop();
    }

    let mut sections = primary;
    sections.extend(secondary);
    let mut out = join(&sections);
    if out.len() > CONTEXT_BUDGET {
        let mut end = CONTEXT_BUDGET;
        while !out.is_char_boundary(end) {
            end -= 1;
        }
        out.truncate(end);
    }
    out
}

/// README excerpts for directories the prompt mentions.
fn directory_sections(root: &Path, prompt: Option<&str>) -> Vec<String> {
    let Some(prompt) = prompt else {
        return Vec::new();
    };
    let mut out = Vec::new();
    for token in prompt.split_whitespace().filter(|t| t.contains('/')) {
        let cleaned = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '/' && c != '.');
        if cleaned.is_empty() || cleaned.starts_with('/') || cleaned.contains("..") {
            continue;
        }
        let readme = root.join(cleaned).join("README.md");
        if let Some(text) = read_string(&readme) {
            out.push(format!(
                "## {cleaned}/README.md\n{}",
                clip(text.trim(), README_MAX)
            ));
        }
        if out.len() >= 2 {
            break;
        }
    }
    out
}

/// Rules from `.omc/rules/*.md`, injected once per session by content hash.
fn rule_sections<C: Clock>(
    ctx: &HookContext<C>,
    dedup: &mut SkillSessions,
    dirty: &mut bool,
) -> Vec<String> {
    let mut out = Vec::new();
    for (name, body) in markdown_files(&omc_dir(&ctx.root).join("rules")) {
        let hash = content_hash(&body);
        if dedup.mark_rule(&ctx.session_id, &hash) {
            *dirty = true;
            out.push(format!("## Rule: {name}\n{}", body.trim()));
        }
    }
    out
}

/// Skills from `.omc/skills/*.md` whose file stem appears in the prompt,
/// injected once per session by path.
fn skill_sections<C: Clock>(
    ctx: &HookContext<C>,
    prompt: Option<&str>,
    dedup: &mut SkillSessions,
    dirty: &mut bool,
) -> Vec<String> {
    let Some(prompt) = prompt else {
        return Vec::new();
    };
    let prompt_lower = prompt.to_lowercase();
    let mut out = Vec::new();
    for (name, body) in markdown_files(&omc_dir(&ctx.root).join("skills")) {
        if !prompt_lower.contains(&name.to_lowercase()) {
            continue;
        }
        let path = format!("skills/{name}.md");
        if dedup.mark_skill(&ctx.session_id, &path) {
            *dirty = true;
            out.push(format!(
                "## Skill: {name}\n{}",
                clip(body.trim(), SKILL_BODY_MAX)
            ));
        }
    }
    out
}

/// PRD status while a prd-mode ralph is active.
fn prd_section<C: Clock>(ctx: &HookContext<C>) -> Option<String> {
    if !read_state::<RalphState>(&ctx.root).is_some_and(|s| s.active && s.prd_mode) {
        return None;
    }
    let path = resolve_omc("prd.json", &ctx.root).ok()?;
    let prd = Prd::parse(&read_string(&path)?)?;
    let mut lines = vec![prd.status_line()];
    if let Some(story) = prd.next_story() {
        lines.push(format!("Current story: {} (priority {})", story.id, story.priority));
    }
    Some(format!("## PRD\n{}", lines.join("\n")))
}

/// Progress patterns and recent learnings.
fn progress_section(root: &Path) -> Option<String> {
    let path = resolve_omc("progress.txt", root).ok()?;
    let log = ProgressLog::parse(&read_string(&path)?);
    if log.patterns.is_empty() && log.entries.is_empty() {
        return None;
    }
    let mut lines = Vec::new();
    if !log.patterns.is_empty() {
        lines.push(format!("Patterns: {}", log.patterns.join("; ")));
    }
    for entry in log.recent(2) {
        lines.push(entry.lines().next().unwrap_or("").to_string());
    }
    Some(format!("## Progress\n{}", lines.join("\n")))
}

/// Sorted `(stem, content)` pairs for the `.md` files in a directory.
fn markdown_files(dir: &Path) -> Vec<(String, String)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<(String, String)> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "md"))
        .filter_map(|p| {
            let stem = p.file_stem()?.to_string_lossy().into_owned();
            let body = read_string(&p)?;
            Some((stem, body))
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn content_hash(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn clip(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
