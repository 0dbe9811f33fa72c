// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `omc` — the orchestrator kernel CLI.
//!
//! `omc hook` is the host-facing entry point (stdin JSON in, verdict JSON
//! out, always exit 0). The remaining subcommands are operator plumbing for
//! modes and the swarm queue; they print JSON results and use exit codes.

mod commands;
mod exit_error;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "omc", version, about = "Orchestrator kernel for coding-assistant hooks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read one hook event from stdin, emit one verdict on stdout
    Hook,
    /// Create the .omc/ tree idempotently
    Init,
    /// Sweep aged state files and vacuum the swarm database
    Maintenance,
    /// Start, cancel, and inspect orchestration modes
    #[command(subcommand)]
    Mode(commands::mode::ModeCommand),
    /// Drive the swarm task queue
    #[command(subcommand)]
    Swarm(commands::swarm::SwarmCommand),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Hook => commands::hook::run(),
        Command::Init => commands::setup::run_init(),
        Command::Maintenance => commands::setup::run_maintenance(),
        Command::Mode(command) => commands::mode::run(command),
        Command::Swarm(command) => commands::swarm::run(command),
    };
    if let Err(err) = result {
        eprintln!("omc: {}", err.message);
        std::process::exit(err.code);
    }
}

/// Logs go to stderr only; stdout is reserved for hook verdicts and JSON
/// results. `OMC_DEBUG` raises the default filter to debug.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let debug = std::env::var("OMC_DEBUG")
        .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false);
    let default = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
