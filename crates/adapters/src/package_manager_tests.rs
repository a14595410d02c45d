// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use dpm_core::SlaveSnapshot;

#[test]
fn noop_package_manager_ignores_everything() {
    let pm = NoopPackageManager;
    pm.notify_fault(&FaultAttribution::package_only("foo"));
    pm.notify_activate(&SlaveSnapshot::test_default("s1"));
    pm.notify_deactivate(&SlaveSnapshot::test_default("s1"));
}

#[test]
fn fake_package_manager_records_every_notification() {
    let pm = FakePackageManager::default();
    let snap = SlaveSnapshot::test_default("s1");

    pm.notify_activate(&snap);
    pm.notify_fault(&FaultAttribution::package_only("foo"));
    pm.notify_deactivate(&snap);

    assert_eq!(pm.activations.lock().len(), 1);
    assert_eq!(pm.faults.lock().len(), 1);
    assert_eq!(pm.deactivations.lock().len(), 1);
}
