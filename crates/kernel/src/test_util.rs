// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for kernel tests.

use crate::bus::HookContext;
use crate::config::OmcConfig;
use omc_core::FakeClock;
use std::path::Path;

pub(crate) const TEST_SESSION: &str = "sess-test";

/// A context rooted at a temp dir with a fake clock and default config.
pub(crate) fn ctx_at(root: &Path) -> HookContext<FakeClock> {
    HookContext {
        root: root.to_path_buf(),
        session_id: TEST_SESSION.to_string(),
        clock: FakeClock::new(),
        config: OmcConfig::default(),
    }
}
