// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pessimistic shell-command classifier for the permission arbiter.
//!
//! The classifier never parses shell syntax. A command is safe iff it starts
//! with a whitelisted read-only/build prefix AND contains no blacklisted
//! metacharacter outside of quoted substrings. Quotes exist only so paths
//! with spaces stay classifiable; an unterminated quote is unsafe.

/// Command prefixes considered safe to auto-approve.
///
/// A prefix matches when the trimmed command equals it or continues with a
/// space after it (`git status`, `git status --short`, but not `git statusx`).
const SAFE_PREFIXES: &[&str] = &[
    "git status",
    "git diff",
    "git log",
    "git branch",
    "git show",
    "git fetch",
    "ls",
    "npm test",
    "npm run test",
    "npm run lint",
    "npm run build",
    "npm run typecheck",
    "pnpm test",
    "pnpm run test",
    "pnpm run lint",
    "pnpm run build",
    "pnpm run typecheck",
    "yarn test",
    "yarn lint",
    "yarn build",
    "yarn typecheck",
    "bun test",
    "bun run test",
    "bun run lint",
    "bun run build",
    "bun run typecheck",
    "cargo test",
    "cargo build",
    "cargo check",
    "cargo clippy",
];

/// Shell metacharacters that make a command unsafe when unquoted.
const BLACKLIST: &[char] = &[
    ';', '|', '&', '$', '`', '(', ')', '{', '}', '[', ']', '*', '?', '~', '!', '#', '<', '>',
    '\\', '\n', '\r', '\t', '\0',
];

/// Classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// Matched a whitelisted prefix with no unquoted metacharacters.
    Safe { prefix: &'static str },
    /// Everything else; the arbiter stays silent and the host prompts.
    Unsafe,
}

impl CommandClass {
    pub fn is_safe(self) -> bool {
        matches!(self, CommandClass::Safe { .. })
    }
}

/// Classify a raw command string.
pub fn classify_command(command: &str) -> CommandClass {
    let trimmed = command.trim();
    if trimmed.is_empty() {
        return CommandClass::Unsafe;
    }

    let Some(prefix) = SAFE_PREFIXES
        .iter()
        .find(|p| matches_prefix(trimmed, p))
        .copied()
    else {
        return CommandClass::Unsafe;
    };

    if has_unquoted_metachar(trimmed) {
        return CommandClass::Unsafe;
    }

    CommandClass::Safe { prefix }
}

fn matches_prefix(command: &str, prefix: &str) -> bool {
    match command.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with(' '),
        None => false,
    }
}

/// Scan for blacklisted characters outside single/double quoted substrings.
/// Unterminated quotes count as a metacharacter sighting.
fn has_unquoted_metachar(command: &str) -> bool {
    let mut in_single = false;
    let mut in_double = false;
    for c in command.chars() {
        match c {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            _ if in_single || in_double => {}
            c if BLACKLIST.contains(&c) => return true,
            _ => {}
        }
    }
    in_single || in_double
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
