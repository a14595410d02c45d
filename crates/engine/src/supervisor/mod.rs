// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The slave supervisor state machine (§4.3).
//!
//! Generic over the four adapter ports a real daemon wires to a child
//! process, an RPC transport, a display server, and a package manager
//! (`dpm_adapters::{Launcher, RpcChannel, DisplayMonitor, PackageManager}`),
//! and over [`Clock`] so tests drive it with a [`FakeClock`]. Split
//! across files the way the teacher splits a single `impl` block across
//! a directory module: this file owns construction and the small
//! helpers every other file shares; each sibling owns one slice of the
//! state machine.

mod deactivate;
mod fault;
mod handshake;
mod launch;
mod pause_resume;
mod timers;

use dpm_adapters::{DisplayMonitor, Launcher, PackageManager, RpcChannel};
use dpm_core::event::{EventCallback, EventKind};
use dpm_core::{Clock, CoreError, CoreResult, SlaveId, Tunables};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::fault_manager::FaultManager;
use crate::registry::{Registry, SlaveOutcome};
use crate::timer_service::TimerService;
pub use timers::TimerFire;

/// Ties the registry, timer service, and fault manager together with
/// the policy that drives a slave through its lifecycle.
pub struct Supervisor<L, R, D, P, C>
where
    L: Launcher,
    R: RpcChannel,
    D: DisplayMonitor,
    P: PackageManager,
    C: Clock,
{
    pub(crate) registry: Registry,
    pub(crate) timers: TimerService<C>,
    pub(crate) fault_manager: FaultManager,
    pub(crate) launcher: Arc<L>,
    pub(crate) rpc: Arc<R>,
    pub(crate) display: Arc<D>,
    pub(crate) package_manager: Arc<P>,
    pub(crate) clock: C,
    pub(crate) tunables: Tunables,
    /// Fed by timer callbacks, drained by `poll_timers` (see
    /// `crate::timer_service` module doc for why timer callbacks cannot
    /// reach back into `self` directly).
    pub(crate) timer_fires: Arc<Mutex<VecDeque<TimerFire>>>,
    /// Depth counter for nested `deactivate_all`/`activate_all` calls
    /// (§4.3 "Bulk quiesce"): only the outermost pair actually acts.
    pub(crate) quiesce_depth: u32,
}

impl<L, R, D, P, C> Supervisor<L, R, D, P, C>
where
    L: Launcher,
    R: RpcChannel,
    D: DisplayMonitor,
    P: PackageManager,
    C: Clock,
{
    pub fn new(launcher: Arc<L>, rpc: Arc<R>, display: Arc<D>, package_manager: Arc<P>, clock: C, tunables: Tunables) -> Self {
        Self {
            registry: Registry::new(),
            timers: TimerService::new(clock.clone()),
            fault_manager: FaultManager::new(tunables.slave_log_path.clone()),
            launcher,
            rpc,
            display,
            package_manager,
            clock,
            tunables,
            timer_fires: Arc::new(Mutex::new(VecDeque::new())),
            quiesce_depth: 0,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn timers(&self) -> &TimerService<C> {
        &self.timers
    }

    /// `find_or_create(name, ...)` (§3 Lifecycle), exposed at the
    /// supervisor layer since creation alone never needs the adapter
    /// ports — callers that only need a record, not a running process,
    /// can stop here and call `launch` separately.
    pub fn create_or_get(
        &mut self,
        name: impl Into<SlaveId>,
        secured: bool,
        abi: impl Into<String>,
        package: impl Into<String>,
        network: bool,
    ) -> CoreResult<SlaveId> {
        self.registry.find_or_create(name, secured, abi, package, network)
    }

    /// Register an observer for one of a slave's six event kinds.
    pub fn register_observer(&mut self, id: &SlaveId, kind: EventKind, callback: EventCallback) -> CoreResult<()> {
        let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
        slave.observers.list_mut(kind).push(callback);
        Ok(())
    }

    /// `ref(name)` (§4.2). Exposed directly; unlike `unref` it never
    /// needs adapter access.
    pub fn ref_slave(&mut self, id: &SlaveId) -> CoreResult<u32> {
        self.registry.ref_slave(id)
    }

    /// `unref(name)` (§4.2). Destruction itself never touches a running
    /// timer (the supervisor always clears a slave's timers before its
    /// refcount can reach zero, see `Registry::unref`), so this has no
    /// adapter-level side effects beyond what the registry already does.
    pub fn unref_slave(&mut self, id: &SlaveId) -> CoreResult<SlaveOutcome> {
        self.registry.unref(id)
    }

    /// Invariant 5: a running instance attaches to its hosting slave.
    pub fn instance_attached(&mut self, id: &SlaveId, package: &str) -> CoreResult<()> {
        let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
        slave.loaded_instance += 1;
        slave.assign_package(package);
        Ok(())
    }

    /// Invariant 5: the last instance detaching from an active slave
    /// triggers automatic deactivation.
    pub async fn instance_detached(&mut self, id: &SlaveId, package: &str) -> crate::error::SupervisorResult<()> {
        {
            let slave = self.registry.find_by_name_mut(id).ok_or(CoreError::NotExist)?;
            slave.loaded_instance = slave.loaded_instance.saturating_sub(1);
            slave.release_package(package);
        }
        let should_deactivate = {
            let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
            slave.loaded_instance == 0 && slave.is_active()
        };
        if should_deactivate {
            self.deactivate(id).await?;
        }
        Ok(())
    }

    /// `call(slave, pkg, file, func)` (§4.4 call/return tracking).
    pub fn record_call(&mut self, slave: &SlaveId, package: &str, file: &str, function: &str) {
        let now = self.clock.epoch_ms();
        self.fault_manager.call(dpm_core::FaultCallRecord::new(slave.clone(), package, file, function, now));
    }

    /// `return(slave, pkg, file, func)`.
    pub fn record_return(&mut self, slave: &SlaveId, package: &str, file: &str, function: &str) -> bool {
        self.fault_manager.return_call(slave, package, file, function)
    }

    /// `deactivate_all(reactivate, reactivate_instances)` (§4.3 "Bulk
    /// quiesce"). Nested calls only the outermost pair acts on; this is
    /// how the daemon quiesces every slave for e.g. a system suspend
    /// without each individual caller needing to know whether someone
    /// else already triggered the same quiesce.
    pub async fn deactivate_all(&mut self, reactivate: bool, reactivate_instances: bool) {
        self.quiesce_depth += 1;
        if self.quiesce_depth > 1 {
            return;
        }
        let ids: Vec<SlaveId> = self.registry.all().filter(|s| s.is_active()).map(|s| s.id.clone()).collect();
        for id in ids {
            if let Some(slave) = self.registry.find_by_name_mut(&id) {
                slave.reactivate_slave = reactivate;
                slave.reactivate_instances = reactivate_instances;
            }
            let _ = self.deactivate(&id).await;
        }
    }

    pub async fn activate_all(&mut self) {
        if self.quiesce_depth == 0 {
            return;
        }
        self.quiesce_depth -= 1;
        if self.quiesce_depth > 0 {
            return;
        }
        let ids: Vec<SlaveId> = self.registry.all().filter(|s| !s.is_active()).map(|s| s.id.clone()).collect();
        for id in ids {
            let _ = self.launch(&id).await;
        }
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
