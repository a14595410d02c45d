// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ok_outcome_carries_pid_and_is_not_retryable_or_fatal() {
    let outcome = LaunchOutcome::Ok { pid: 100 };
    assert_eq!(outcome.pid(), Some(100));
    assert!(!outcome.is_retryable());
    assert!(!outcome.is_fatal());
}

#[test]
fn local_launch_has_no_pid() {
    assert_eq!(LaunchOutcome::LocalLaunch.pid(), None);
}

#[test]
fn retryable_family_is_flagged_retryable_only() {
    let outcome = LaunchOutcome::Retryable(RetryableLaunchError::Timeout);
    assert!(outcome.is_retryable());
    assert!(!outcome.is_fatal());
    assert_eq!(outcome.pid(), None);
}

#[test]
fn fatal_family_is_flagged_fatal_only() {
    let outcome = LaunchOutcome::Fatal(FatalLaunchError::NoInit);
    assert!(outcome.is_fatal());
    assert!(!outcome.is_retryable());
}

#[test]
fn launcher_bundle_carries_the_three_fields() {
    let bundle = LauncherBundle::new("s1", true, "c");
    assert_eq!(bundle.slave_name, "s1");
    assert!(bundle.secured);
    assert_eq!(bundle.abi, "c");
}

#[test]
fn error_display_uses_snake_case_identifiers() {
    assert_eq!(RetryableLaunchError::CommFailure.to_string(), "comm_failure");
    assert_eq!(FatalLaunchError::NoLaunchpad.to_string(), "no_launchpad");
}
