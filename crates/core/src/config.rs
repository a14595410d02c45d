// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor tunables (§6 External Interfaces, "Tunables").
//!
//! This module only defines the values and their defaults. Loading them
//! from the process environment is `dpm-daemon::config`'s job — this
//! crate has no `std::env` dependency and stays testable with whatever
//! values a test wants, independent of the process environment.

use std::time::Duration;

/// Tunable knobs read once at daemon startup and never reloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Tunables {
    /// Secured-slave recycling interval.
    pub slave_ttl: Duration,
    /// Time allowed for a launched slave to deliver its "hello" RPC.
    pub slave_activate_time: Duration,
    /// Delay before retrying a retryable launch failure.
    pub slave_relaunch_time: Duration,
    /// Maximum relaunch attempts within a single launch sequence.
    pub slave_relaunch_count: u32,
    /// Maximum packages an unsecured slave may host at once.
    pub slave_max_load: usize,
    /// Minimum uptime since activation below which a crash counts as
    /// "fast" (critical_fault_count increments).
    pub minimum_reactivation_time: Duration,
    /// ABI assumed when a caller does not specify one.
    pub default_abi: String,
    /// Disables `activate_timer` arming when set (§9 Open Question 2).
    pub debug_mode: bool,
    /// Directory containing `slave.<pid>` crash-log breadcrumbs.
    pub slave_log_path: String,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            slave_ttl: Duration::from_secs(3600),
            slave_activate_time: Duration::from_secs(10),
            slave_relaunch_time: Duration::from_secs(2),
            slave_relaunch_count: 3,
            slave_max_load: 30,
            minimum_reactivation_time: Duration::from_secs(5),
            default_abi: "c".to_string(),
            debug_mode: false,
            slave_log_path: "/tmp/dpm-slave-logs".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
