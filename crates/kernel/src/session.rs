// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session id derivation.
//!
//! The host usually supplies a session id on every hook event. When it does
//! not, the kernel derives `pid-{PID}-{ms}` once and keeps it stable for the
//! life of the process, so all state written during one hook invocation
//! lands in the same session scope.

use omc_core::Clock;
use std::sync::OnceLock;

/// The session id to use for this hook invocation.
pub fn effective_session_id<C: Clock>(host_session_id: &str, clock: &C) -> String {
    if !host_session_id.is_empty() {
        return host_session_id.to_string();
    }
    static FALLBACK: OnceLock<String> = OnceLock::new();
    FALLBACK
        .get_or_init(|| format!("pid-{}-{}", std::process::id(), clock.epoch_ms()))
        .clone()
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
