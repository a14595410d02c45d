// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deactivation, exit notice, and TTL-driven recycling (§4.3
//! "Deactivation").

use dpm_adapters::{DisplayMonitor, Launcher, PackageManager, RpcChannel};
use dpm_core::event::EventContext;
use dpm_core::{Clock, CoreError, SlaveId, SlaveState};

use super::Supervisor;
use crate::error::SupervisorResult;
use crate::registry::SlaveOutcome;

impl<L, R, D, P, C> Supervisor<L, R, D, P, C>
where
    L: Launcher,
    R: RpcChannel,
    D: DisplayMonitor,
    P: PackageManager,
    C: Clock,
{
    /// Requests termination of an active slave: transitions to
    /// `RequestedTerminate` and sends the pid a terminate signal if one
    /// is running. The slave's eventual exit notice (`on_exit_notice`)
    /// is what actually frees or relaunches the record.
    pub async fn deactivate(&mut self, id: &SlaveId) -> SupervisorResult<()> {
        let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
        if !slave.is_active() {
            return Err(CoreError::Already.into());
        }
        let pid = slave.pid;

        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.state = SlaveState::RequestedTerminate;
        }
        if let Some(pid) = pid {
            self.launcher
                .terminate(pid)
                .await
                .map_err(|err| crate::error::SupervisorError::launcher(id.as_str(), err.to_string()))?;
        }
        Ok(())
    }

    /// The launcher (or process reaper) reports that the pid has
    /// actually exited. Cancels any still-armed timers, transitions to
    /// `Terminated`, fires `DEACTIVATE` observers, notifies the package
    /// manager, and then either relaunches (if any observer voted
    /// reactivate and the record's own `reactivate_slave` flag agrees)
    /// or drops the registry's own reference once no instances remain
    /// (§4.3, §4.2 "Reentrancy through refcounts").
    pub async fn on_exit_notice(&mut self, id: &SlaveId) -> SupervisorResult<()> {
        self.cancel_all_timers(id);

        let (votes, reactivate_slave, loaded_instance, snapshot) = {
            let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
            slave.pid = None;
            slave.state = SlaveState::Terminated;
            let snapshot = slave.snapshot();
            let votes = slave.observers.deactivate.dispatch(&snapshot, &EventContext::Deactivate);
            (votes, slave.reactivate_slave, slave.loaded_instance, snapshot)
        };
        self.package_manager.notify_deactivate(&snapshot);

        // Relaunch only if some deactivate observer voted reactivate
        // *and* the record's own flag still agrees (§4.3 Deactivation).
        if votes > 0 && reactivate_slave {
            match self.launch(id).await {
                Ok(()) | Err(crate::error::SupervisorError::Core(CoreError::Already)) => {}
                Err(err) => return Err(err),
            }
        } else if loaded_instance == 0 {
            // The registry's own strong reference is what `unref` drops
            // here; if some other collaborator still holds one, the
            // record survives (still `Terminated`) until that releases.
            if let SlaveOutcome::Alive(_) = self.registry.unref(id)? {
                // another collaborator still references this record
            }
        }
        Ok(())
    }

    /// The TTL timer fired: recycle a secured slave to reclaim
    /// resources. Clears `reactivate_slave` and sets
    /// `reactivate_instances` so the cycle preserves loaded instances
    /// rather than dropping them, without forcing an unconditional
    /// relaunch of its own accord (§4.3 "TTL expiry").
    pub(super) async fn handle_ttl_expired(&mut self, id: &SlaveId) {
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.reactivate_slave = false;
            slave.reactivate_instances = true;
        } else {
            return;
        }
        let _ = self.deactivate(id).await;
    }
}
