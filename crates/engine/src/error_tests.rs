// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn core_error_converts_via_from() {
    let core = CoreError::NotExist;
    let err: SupervisorError = core.into();
    assert!(matches!(err, SupervisorError::Core(CoreError::NotExist)));
}

#[test]
fn launcher_error_carries_slave_name() {
    let err = SupervisorError::launcher("s1", "no child process");
    assert_eq!(err.to_string(), "launcher failure for slave s1: no child process");
}

#[test]
fn rpc_error_carries_slave_name() {
    let err = SupervisorError::rpc("s1", "channel closed");
    assert_eq!(err.to_string(), "rpc channel failure for slave s1: channel closed");
}
