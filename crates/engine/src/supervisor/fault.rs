// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault-driven deactivation (§4.3 "Fault-driven deactivation", §4.4).

use dpm_adapters::{DisplayMonitor, Launcher, PackageManager, RpcChannel};
use dpm_core::event::EventContext;
use dpm_core::{Clock, CoreError, FaultAttribution, SlaveId};
use tracing::warn;

use super::Supervisor;
use crate::error::SupervisorResult;
use crate::fault_manager::AttributionOutcome;

impl<L, R, D, P, C> Supervisor<L, R, D, P, C>
where
    L: Launcher,
    R: RpcChannel,
    D: DisplayMonitor,
    P: PackageManager,
    C: Clock,
{
    /// Runs attribution for `id`, broadcasts whatever it found,
    /// applies the critical-fault-count/reactivation policy, and
    /// terminates the slave. Shared by the three fault triggers: launch
    /// failure, activation timeout, and an abnormal process exit.
    pub async fn fault_slave(&mut self, id: &SlaveId) -> SupervisorResult<AttributionOutcome> {
        self.fault_manager.record_fault();

        let (pid, secured_single, activated_at, package) = {
            let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
            slave.fault_count += 1;
            let secured_single = if slave.secured { slave.hosts_single_package().map(str::to_string) } else { None };
            (slave.pid, secured_single, slave.activated_at, slave.package.clone())
        };

        let outcome = self.fault_manager.attribute(id, pid.unwrap_or(0), secured_single.as_deref());
        let attribution = match &outcome {
            AttributionOutcome::Attributed(a) => a.clone(),
            AttributionOutcome::NoAttribution => FaultAttribution::package_only(package),
        };

        self.package_manager.notify_fault(&attribution);
        if let Err(err) = self.rpc.broadcast_fault(&attribution).await {
            warn!(slave = %id, error = %err, "fault broadcast failed");
        }
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            let snapshot = slave.snapshot();
            slave.observers.fault.dispatch(&snapshot, &EventContext::Fault(&attribution));
        }

        let now = self.clock.epoch_ms();
        let minimum_reactivation_ms = self.tunables.minimum_reactivation_time.as_millis() as u64;
        let fast_crash = activated_at.map(|t| now.saturating_sub(t) < minimum_reactivation_ms).unwrap_or(true);

        let (critical_count, loaded_instance) = {
            let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
            if fast_crash {
                slave.critical_fault_count += 1;
            }
            (slave.critical_fault_count, slave.loaded_instance)
        };

        if critical_count >= self.tunables.slave_max_load as u32 || loaded_instance == 0 {
            if let Some(slave) = self.registry.find_by_name_mut(id) {
                slave.reactivate_slave = false;
                slave.reactivate_instances = false;
            }
            warn!(slave = %id, critical_count, "disabling auto-restart after repeated fast crashes");
        }

        self.deactivate(id).await?;
        Ok(outcome)
    }
}
