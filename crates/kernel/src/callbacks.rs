// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stop-callback fan-out.
//!
//! When a persistent mode releases a `Stop`, configured shell commands run
//! in parallel with one overall deadline. Failures, timeouts, and spawn
//! errors are all swallowed: callbacks can never affect the hook verdict.

use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// Default overall deadline; hooks have a 3 s budget, callbacks get less.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_millis(1_500);

/// Run every callback command, waiting at most `timeout` overall.
pub fn run_stop_callbacks(commands: &[String], timeout: Duration) {
    if commands.is_empty() {
        return;
    }
    let (done_tx, done_rx) = mpsc::channel::<()>();
    for command in commands {
        let command = command.clone();
        let done = done_tx.clone();
        std::thread::spawn(move || {
            let status = Command::new("sh")
                .arg("-c")
                .arg(&command)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            if let Err(err) = status {
                tracing::debug!(%err, command, "stop callback failed to spawn");
            }
            let _ = done.send(());
        });
    }
    drop(done_tx);

    // Gather until every callback reports or the deadline passes; stragglers
    // are abandoned (their threads finish on their own).
    let deadline = Instant::now() + timeout;
    let mut remaining = commands.len();
    while remaining > 0 {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            tracing::debug!(remaining, "stop callbacks timed out");
            break;
        }
        match done_rx.recv_timeout(left) {
            Ok(()) => remaining -= 1,
            Err(_) => break,
        }
    }
}

#[cfg(test)]
#[path = "callbacks_tests.rs"]
mod tests;
