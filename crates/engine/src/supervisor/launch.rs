// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch and relaunch (§4.3 "Launch").

use dpm_adapters::{DisplayMonitor, Launcher, PackageManager, RpcChannel};
use dpm_core::{Clock, CoreError, LaunchOutcome, LauncherBundle, SlaveId, SlaveState};
use tracing::warn;

use super::Supervisor;
use crate::error::SupervisorResult;

impl<L, R, D, P, C> Supervisor<L, R, D, P, C>
where
    L: Launcher,
    R: RpcChannel,
    D: DisplayMonitor,
    P: PackageManager,
    C: Clock,
{
    /// Idempotent: a slave that already has a pid, or is mid-launch,
    /// returns `Already` instead of attempting a second launch (§4.3
    /// "Launch is idempotent"). Re-requesting a launch already in
    /// flight re-arms both reactivation flags, so a caller that changed
    /// its mind about a pending `deactivate` doesn't have to also
    /// re-issue it after this launch completes.
    pub async fn launch(&mut self, id: &SlaveId) -> SupervisorResult<()> {
        let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
        if slave.pid.is_some() {
            return Err(CoreError::Already.into());
        }
        if slave.state == SlaveState::RequestedLaunch {
            let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
            slave.reactivate_slave = true;
            slave.reactivate_instances = true;
            return Err(CoreError::Already.into());
        }

        let (secured, abi) = (slave.secured, slave.abi.clone());
        {
            let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
            slave.state = SlaveState::RequestedLaunch;
            slave.relaunch_count = self.tunables.slave_relaunch_count;
        }
        self.attempt_launch(id, secured, &abi).await
    }

    pub(super) async fn attempt_launch(&mut self, id: &SlaveId, secured: bool, abi: &str) -> SupervisorResult<()> {
        let bundle = LauncherBundle::new(id.as_str(), secured, abi);
        let outcome = self.launcher.launch(&bundle).await;
        self.handle_launch_outcome(id, outcome).await
    }

    async fn handle_launch_outcome(&mut self, id: &SlaveId, outcome: LaunchOutcome) -> SupervisorResult<()> {
        match outcome {
            LaunchOutcome::Ok { pid } => {
                if let Some(slave) = self.registry.find_by_name_mut(id) {
                    slave.pid = Some(pid);
                }
                self.arm_activate_timer(id);
                Ok(())
            }
            LaunchOutcome::LocalLaunch => {
                self.arm_activate_timer(id);
                Ok(())
            }
            LaunchOutcome::Retryable(reason) => {
                let remaining = {
                    let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
                    slave.relaunch_count = slave.relaunch_count.saturating_sub(1);
                    slave.relaunch_count
                };
                if remaining > 0 {
                    warn!(slave = %id, %reason, remaining, "retryable launch failure, scheduling relaunch");
                    self.arm_relaunch_timer(id);
                    Ok(())
                } else {
                    warn!(slave = %id, %reason, "relaunch budget exhausted, handing off to fault handler");
                    self.fault_slave(id).await?;
                    Ok(())
                }
            }
            LaunchOutcome::Fatal(reason) => {
                warn!(slave = %id, %reason, "fatal launch failure, handing off to fault handler");
                self.fault_slave(id).await?;
                Ok(())
            }
        }
    }

    pub(super) async fn handle_relaunch_fire(&mut self, id: &SlaveId) {
        let (secured, abi) = match self.registry.find_by_name(id) {
            Some(slave) => (slave.secured, slave.abi.clone()),
            None => return,
        };
        let _ = self.attempt_launch(id, secured, &abi).await;
    }

    /// The activate timer fired without a hello ever arriving. Treated
    /// as a fault: the slave is unresponsive and gets the same
    /// attribution-and-terminate treatment as an abnormal exit (§4.3
    /// "a launch that never activates is a fault, not a quiet retry").
    pub(super) async fn handle_activate_timeout(&mut self, id: &SlaveId) {
        let _ = self.fault_slave(id).await;
    }
}
