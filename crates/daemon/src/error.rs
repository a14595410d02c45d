// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-level error type (§2.1 "Error handling").
//!
//! Composes `dpm_engine::SupervisorError` and the wire/IO failures
//! specific to the daemon binary's own transport wiring.

use dpm_engine::SupervisorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error(transparent)]
    Supervisor(#[from] SupervisorError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed wire message: {0}")]
    Wire(String),
}

pub type DaemonResult<T> = Result<T, DaemonError>;
