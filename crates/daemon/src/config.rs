// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.
//!
//! Tunables are read once at startup into `dpm_core::Tunables` (§6
//! External Interfaces); this module is the only place in the
//! workspace that touches `std::env` for them, mirroring the teacher's
//! `daemon/src/env.rs`.

use std::path::PathBuf;
use std::time::Duration;

use dpm_core::Tunables;

/// Unix socket path the daemon listens on for slave connections.
pub fn socket_path() -> PathBuf {
    std::env::var("DPM_SOCKET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/dpm.sock"))
}

/// Path to the slave launcher binary.
pub fn launcher_binary_path() -> PathBuf {
    std::env::var("DPM_LAUNCHER_BIN")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/usr/libexec/dpm-slave"))
}

fn duration_secs_var(name: &str, default: Duration) -> Duration {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_secs).unwrap_or(default)
}

fn duration_millis_var(name: &str, default: Duration) -> Duration {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis).unwrap_or(default)
}

/// Load tunables from the `DPM_*` environment, falling back to
/// `Tunables::default()` for anything unset.
pub fn load_tunables() -> Tunables {
    let defaults = Tunables::default();
    Tunables {
        slave_ttl: duration_secs_var("DPM_SLAVE_TTL", defaults.slave_ttl),
        slave_activate_time: duration_secs_var("DPM_SLAVE_ACTIVATE_TIME", defaults.slave_activate_time),
        slave_relaunch_time: duration_millis_var("DPM_SLAVE_RELAUNCH_TIME_MS", defaults.slave_relaunch_time),
        slave_relaunch_count: std::env::var("DPM_SLAVE_RELAUNCH_COUNT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.slave_relaunch_count),
        slave_max_load: std::env::var("DPM_SLAVE_MAX_LOAD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.slave_max_load),
        minimum_reactivation_time: duration_secs_var("DPM_MINIMUM_REACTIVATION_TIME", defaults.minimum_reactivation_time),
        default_abi: std::env::var("DPM_DEFAULT_ABI").unwrap_or(defaults.default_abi),
        debug_mode: std::env::var("DPM_DEBUG_MODE").map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(defaults.debug_mode),
        slave_log_path: std::env::var("DPM_SLAVE_LOG_PATH").unwrap_or(defaults.slave_log_path),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
