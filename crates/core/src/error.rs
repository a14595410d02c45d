// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy for the slave supervisor core.
//!
//! Mirrors the original system's `{OK, ALREADY, INVALID, NOT_EXIST, MEMORY,
//! FAULT}` return codes. `OK` is `Result::Ok`; `MEMORY` has no Rust
//! equivalent (allocation failure aborts rather than propagating) and is
//! intentionally not represented here.

use thiserror::Error;

/// Error taxonomy shared by the registry, supervisor, and fault manager.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The requested transition is a no-op: the slave is already in (or
    /// entering) the target state.
    #[error("already in progress or in target state")]
    Already,

    /// Caller misuse, or the current state does not permit this operation.
    #[error("invalid operation: {0}")]
    Invalid(String),

    /// A lookup found no matching record.
    #[error("no such record")]
    NotExist,

    /// An external subsystem (launcher, RPC channel, timer) failed.
    #[error("external subsystem failure: {0}")]
    Fault(String),
}

impl CoreError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        CoreError::Invalid(msg.into())
    }

    pub fn fault(msg: impl Into<String>) -> Self {
        CoreError::Fault(msg.into())
    }

    pub fn is_already(&self) -> bool {
        matches!(self, CoreError::Already)
    }

    pub fn is_not_exist(&self) -> bool {
        matches!(self, CoreError::NotExist)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
