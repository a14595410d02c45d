// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The launch request/response shapes exchanged with the external
//! launcher service (§6 External Interfaces, "Launcher bundle").
//!
//! The `dpm_adapters::Launcher` trait itself lives in the adapters
//! crate; this module only defines the data it carries, so that the
//! supervisor's launch-result classification (§4.3 "Launch") does not
//! need to depend on the adapters crate at all.

use std::fmt;

/// Parameters passed to the launcher for a single launch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherBundle {
    pub slave_name: String,
    pub secured: bool,
    pub abi: String,
}

impl LauncherBundle {
    pub fn new(slave_name: impl Into<String>, secured: bool, abi: impl Into<String>) -> Self {
        Self {
            slave_name: slave_name.into(),
            secured,
            abi: abi.into(),
        }
    }
}

/// A launcher result, classified into the three families the supervisor
/// reacts to differently (§4.3 "Launch").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The launcher spawned the process and returned its pid.
    Ok { pid: u32 },
    /// The launcher ran the slave in-process rather than as a child
    /// (no pid to track, no timer to arm for its own exit).
    LocalLaunch,
    /// Transient failure; worth a relaunch attempt within budget.
    Retryable(RetryableLaunchError),
    /// Permanent failure; go straight to the fault handler.
    Fatal(FatalLaunchError),
}

impl LaunchOutcome {
    pub fn is_retryable(&self) -> bool {
        matches!(self, LaunchOutcome::Retryable(_))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, LaunchOutcome::Fatal(_))
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            LaunchOutcome::Ok { pid } => Some(*pid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableLaunchError {
    Timeout,
    CommFailure,
    Terminating,
    Cancelled,
}

impl fmt::Display for RetryableLaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RetryableLaunchError::Timeout => "timeout",
            RetryableLaunchError::CommFailure => "comm_failure",
            RetryableLaunchError::Terminating => "terminating",
            RetryableLaunchError::Cancelled => "cancelled",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalLaunchError {
    IllAccess,
    Invalid,
    NoInit,
    NoLaunchpad,
    GenericError,
}

impl fmt::Display for FatalLaunchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FatalLaunchError::IllAccess => "ill_access",
            FatalLaunchError::Invalid => "invalid",
            FatalLaunchError::NoInit => "no_init",
            FatalLaunchError::NoLaunchpad => "no_launchpad",
            FatalLaunchError::GenericError => "generic_error",
        })
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
