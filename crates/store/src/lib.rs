// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! omc-store: path-guarded, atomic, session-scoped state under `.omc/`

mod atomic;
mod checkpoint;
mod error;
mod maintenance;
mod memory;
mod notepad_io;
mod paths;
mod registry;
mod skills;
mod state_io;
mod tool_error;

pub use atomic::{atomic_write, atomic_write_json, read_string, safe_read_json};
pub use checkpoint::{
    collect_wisdom, write_checkpoint, write_wisdom, Checkpoint, ModeSnapshot,
    CURRENT_CHECKPOINT_VERSION,
};
pub use error::StoreError;
pub use maintenance::{
    ensure_tree, sweep_sessions, sweep_state, SESSION_RETENTION_MS, STATE_RETENTION_MS,
};
pub use memory::ProjectMemory;
pub use notepad_io::{load_notepad, save_notepad};
pub use paths::{
    clear_worktree_cache, omc_dir, resolve_omc, resolve_session_state, resolve_state,
    sanitize_session_id, validate_relative, validate_working_directory, worktree_root,
};
pub use registry::{
    can_start_mode, clear_mode, create_mode_marker, get_active_modes, is_mode_active,
    read_mode_marker, remove_mode_marker, ModeMarker, StartCheck,
};
pub use skills::SkillSessions;
pub use state_io::{
    clear_session_state, clear_state, read_session_state, read_state, read_state_for_session,
    write_session_state, write_state,
};
pub use tool_error::{
    record_tool_error, take_fresh_tool_error, ToolErrorRecord, TOOL_ERROR_MAX_AGE_MS,
    TOOL_ERROR_RETRY_LIMIT,
};
