// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel error type. The bus converts every one of these into the benign
//! verdict; only the CLI's non-hook commands surface them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Store(#[from] omc_store::StoreError),

    #[error(transparent)]
    Swarm(#[from] omc_swarm::SwarmError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
