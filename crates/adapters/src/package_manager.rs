// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Package manager port (§6 External Interfaces). Notified of fault
//! attributions and activate/deactivate transitions; the package
//! manager itself (version resolution, on-disk layout) is out of
//! scope (§1) and lives in a separate daemon this crate never imports.

use dpm_core::{FaultAttribution, SlaveSnapshot};
use parking_lot::Mutex;

pub trait PackageManager: Send + Sync {
    fn notify_fault(&self, attribution: &FaultAttribution);
    fn notify_activate(&self, slave: &SlaveSnapshot);
    fn notify_deactivate(&self, slave: &SlaveSnapshot);
}

#[derive(Default)]
pub struct NoopPackageManager;

impl PackageManager for NoopPackageManager {
    fn notify_fault(&self, _attribution: &FaultAttribution) {}
    fn notify_activate(&self, _slave: &SlaveSnapshot) {}
    fn notify_deactivate(&self, _slave: &SlaveSnapshot) {}
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakePackageManager {
    pub faults: Mutex<Vec<FaultAttribution>>,
    pub activations: Mutex<Vec<SlaveSnapshot>>,
    pub deactivations: Mutex<Vec<SlaveSnapshot>>,
}

#[cfg(any(test, feature = "test-support"))]
impl PackageManager for FakePackageManager {
    fn notify_fault(&self, attribution: &FaultAttribution) {
        self.faults.lock().push(attribution.clone());
    }

    fn notify_activate(&self, slave: &SlaveSnapshot) {
        self.activations.lock().push(slave.clone());
    }

    fn notify_deactivate(&self, slave: &SlaveSnapshot) {
        self.deactivations.lock().push(slave.clone());
    }
}

#[cfg(test)]
#[path = "package_manager_tests.rs"]
mod tests;
