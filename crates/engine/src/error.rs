// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine-level error type.
//!
//! Wraps [`dpm_core::CoreError`] for the registry/fault-manager paths and
//! adds the adapter-facing variants the supervisor surfaces when a
//! collaborator (launcher, RPC channel) reports a failure.

use dpm_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("launcher failure for slave {slave}: {reason}")]
    Launcher { slave: String, reason: String },

    #[error("rpc channel failure for slave {slave}: {reason}")]
    Rpc { slave: String, reason: String },

    #[error("crash log probe failed for pid {pid}: {reason}")]
    CrashLog { pid: u32, reason: String },
}

impl SupervisorError {
    pub fn launcher(slave: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Launcher { slave: slave.into(), reason: reason.into() }
    }

    pub fn rpc(slave: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rpc { slave: slave.into(), reason: reason.into() }
    }
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
