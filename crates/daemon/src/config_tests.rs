// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn load_tunables_falls_back_to_defaults_when_unset() {
    for var in [
        "DPM_SLAVE_TTL",
        "DPM_SLAVE_ACTIVATE_TIME",
        "DPM_SLAVE_RELAUNCH_TIME_MS",
        "DPM_SLAVE_RELAUNCH_COUNT",
        "DPM_SLAVE_MAX_LOAD",
        "DPM_MINIMUM_REACTIVATION_TIME",
        "DPM_DEFAULT_ABI",
        "DPM_DEBUG_MODE",
        "DPM_SLAVE_LOG_PATH",
    ] {
        std::env::remove_var(var);
    }
    let tunables = load_tunables();
    assert_eq!(tunables, Tunables::default());
}

#[test]
#[serial]
fn load_tunables_reads_overrides_from_env() {
    std::env::set_var("DPM_SLAVE_ACTIVATE_TIME", "42");
    std::env::set_var("DPM_SLAVE_RELAUNCH_COUNT", "7");
    std::env::set_var("DPM_DEBUG_MODE", "true");
    std::env::set_var("DPM_DEFAULT_ABI", "rust-abi");

    let tunables = load_tunables();

    assert_eq!(tunables.slave_activate_time, Duration::from_secs(42));
    assert_eq!(tunables.slave_relaunch_count, 7);
    assert!(tunables.debug_mode);
    assert_eq!(tunables.default_abi, "rust-abi");

    std::env::remove_var("DPM_SLAVE_ACTIVATE_TIME");
    std::env::remove_var("DPM_SLAVE_RELAUNCH_COUNT");
    std::env::remove_var("DPM_DEBUG_MODE");
    std::env::remove_var("DPM_DEFAULT_ABI");
}

#[test]
#[serial]
fn socket_path_defaults_when_unset() {
    std::env::remove_var("DPM_SOCKET_PATH");
    assert_eq!(socket_path(), PathBuf::from("/tmp/dpm.sock"));
}

#[test]
#[serial]
fn socket_path_honors_override() {
    std::env::set_var("DPM_SOCKET_PATH", "/run/dpm/custom.sock");
    assert_eq!(socket_path(), PathBuf::from("/run/dpm/custom.sock"));
    std::env::remove_var("DPM_SOCKET_PATH");
}
