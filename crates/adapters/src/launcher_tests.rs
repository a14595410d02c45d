// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dpm_core::LauncherBundle;

#[tokio::test]
async fn process_launcher_reports_fatal_when_binary_is_missing() {
    let launcher = ProcessLauncher::new("/no/such/binary-dpm-test");
    let bundle = LauncherBundle::new("s1", false, "c");
    let outcome = launcher.launch(&bundle).await;
    assert!(matches!(outcome, LaunchOutcome::Fatal(FatalLaunchError::NoLaunchpad)));
}

#[tokio::test]
async fn process_launcher_terminate_is_idempotent_for_unknown_pid() {
    let launcher = ProcessLauncher::new("/bin/true");
    assert!(launcher.terminate(999_999).await.is_ok());
}

#[tokio::test]
async fn fake_launcher_replays_scripted_outcomes_in_order() {
    let launcher = FakeLauncher::new([LaunchOutcome::Ok { pid: 10 }, LaunchOutcome::Retryable(RetryableLaunchError::Timeout)]);
    let bundle = LauncherBundle::new("s1", false, "c");

    assert_eq!(launcher.launch(&bundle).await, LaunchOutcome::Ok { pid: 10 });
    assert_eq!(launcher.launch(&bundle).await, LaunchOutcome::Retryable(RetryableLaunchError::Timeout));
    assert!(matches!(launcher.launch(&bundle).await, LaunchOutcome::Fatal(_)));
}

#[tokio::test]
async fn fake_launcher_records_terminated_pids() {
    let launcher = FakeLauncher::new([]);
    launcher.terminate(42).await.unwrap();
    launcher.terminate(43).await.unwrap();
    assert_eq!(launcher.terminated_pids(), vec![42, 43]);
}
