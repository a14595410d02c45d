// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pause/resume (§4.3 "Pause/resume"). Round-trips through the RPC
//! channel: `pause`/`resume` send the request, `on_pause_ack`/
//! `on_resume_ack` complete the transition once the slave (or whatever
//! delivers its ack) reports back.

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
    /// Pausing an already-`Paused` slave is a no-op success (§8), unlike
    /// `launch`'s idempotent `Already` — pause/resume are a toggle, not
    /// a one-shot request.
    pub async fn pause(&mut self, id: &SlaveId) -> SupervisorResult<()> {
        let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
        match slave.state {
            SlaveState::Paused => return Ok(()),
            SlaveState::Resumed => {}
            other => return Err(CoreError::invalid(format!("cannot pause slave {id} in state {other}")).into()),
        }
        let timestamp = self.clock.epoch_ms() as f64 / 1000.0;
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.state = SlaveState::RequestedPause;
        }
        self.rpc
            .send_pause(id, timestamp)
            .await
            .map_err(|err| crate::error::SupervisorError::rpc(id.as_str(), err.to_string()))?;
        Ok(())
    }

    pub async fn resume(&mut self, id: &SlaveId) -> SupervisorResult<()> {
        let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
        match slave.state {
            SlaveState::Resumed => return Ok(()),
            SlaveState::Paused => {}
            other => return Err(CoreError::invalid(format!("cannot resume slave {id} in state {other}")).into()),
        }
        let timestamp = self.clock.epoch_ms() as f64 / 1000.0;
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.state = SlaveState::RequestedResume;
        }
        self.rpc
            .send_resume(id, timestamp)
            .await
            .map_err(|err| crate::error::SupervisorError::rpc(id.as_str(), err.to_string()))?;
        Ok(())
    }

    /// `status == 0` completes the transition and freezes the TTL
    /// timer so a paused slave's recycling clock stops ticking; any
    /// other status leaves the slave in `RequestedPause` for the caller
    /// to retry. A late ack for a slave already terminating is
    /// discarded rather than treated as an error (§8).
    pub fn on_pause_ack(&mut self, id: &SlaveId, status: i32) -> SupervisorResult<()> {
        let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
        if !slave.is_active() {
            return Ok(());
        }
        if slave.state != SlaveState::RequestedPause || status != 0 {
            return Ok(());
        }
        let ttl_timer = slave.ttl_timer;
        if let Some(handle) = ttl_timer {
            self.timers.freeze(handle);
        }
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.state = SlaveState::Paused;
            let snapshot = slave.snapshot();
            slave.observers.pause.dispatch(&snapshot, &EventContext::Pause);
        }
        Ok(())
    }

    pub fn on_resume_ack(&mut self, id: &SlaveId, status: i32) -> SupervisorResult<()> {
        let slave = self.registry.find_by_name(id).ok_or(CoreError::NotExist)?;
        if !slave.is_active() {
            return Ok(());
        }
        if slave.state != SlaveState::RequestedResume || status != 0 {
            return Ok(());
        }
        let ttl_timer = slave.ttl_timer;
        if let Some(handle) = ttl_timer {
            self.timers.thaw(handle);
        }
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.state = SlaveState::Resumed;
            let snapshot = slave.snapshot();
            slave.observers.resume.dispatch(&snapshot, &EventContext::Resume);
        }
        Ok(())
    }
}
