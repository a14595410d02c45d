// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activation handshake (§4.3 "Activation handshake").

use dpm_adapters::{DisplayMonitor, Launcher, PackageManager, RpcChannel};
use dpm_core::event::EventContext;
use dpm_core::{Clock, CoreError, SlaveId, SlaveState};

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
    /// A slave's "hello" RPC completes its launch. Cancels the
    /// activate/relaunch timers, transitions to `Resumed`, arms the TTL
    /// timer for secured slaves, fires `ACTIVATE` observers, notifies
    /// the package manager, and immediately pauses the slave to match
    /// the display if the display is already paused (§4.3).
    pub async fn on_hello(&mut self, id: &SlaveId) -> SupervisorResult<()> {
        let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
        if slave.state != SlaveState::RequestedLaunch {
            return Err(CoreError::invalid(format!("hello received for slave {id} in state {}", slave.state)).into());
        }
        let secured = slave.secured;

        self.cancel_timer_kind(id, dpm_core::TimerKind::Activate);
        self.cancel_timer_kind(id, dpm_core::TimerKind::Relaunch);

        let now = self.clock.epoch_ms();
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.state = SlaveState::Resumed;
            slave.activated_at = Some(now);
            // §3: consecutive fast-crash count resets on clean activation.
            slave.critical_fault_count = 0;
        }

        if secured {
            self.arm_ttl_timer(id);
        }

        let snapshot = {
            let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
            let snapshot = slave.snapshot();
            slave.observers.activate.dispatch(&snapshot, &EventContext::Activate);
            snapshot
        };
        self.package_manager.notify_activate(&snapshot);

        if self.display.is_paused() {
            self.pause(id).await?;
        }
        Ok(())
    }
}
