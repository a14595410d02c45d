// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer arming/cancellation and the fired-timer queue drain.
//!
//! Every timer the supervisor arms is a closure that only pushes a
//! [`TimerFire`] onto `Supervisor::timer_fires` — see
//! `crate::timer_service` for why it cannot reach back into `self`
//! directly. `poll_timers` is the one place that queue is drained, with
//! exclusive access to the rest of the supervisor's state.

use dpm_adapters::{DisplayMonitor, Launcher, PackageManager, RpcChannel};
use dpm_core::{Clock, SlaveId, TimerKind};

use super::Supervisor;
use crate::timer_service::TimerAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerFire {
    pub slave: SlaveId,
    pub kind: TimerKind,
}

impl<L, R, D, P, C> Supervisor<L, R, D, P, C>
where
    L: Launcher,
    R: RpcChannel,
    D: DisplayMonitor,
    P: PackageManager,
    C: Clock,
{
    /// Arm the activation-handshake timer. A no-op under `debug_mode`
    /// (§9 Open Question 2: activation timeouts are disabled while
    /// debugging a slave under a foreground debugger, where a human
    /// pause would otherwise trip the timer).
    pub(super) fn arm_activate_timer(&mut self, id: &SlaveId) {
        if self.tunables.debug_mode {
            return;
        }
        let interval = self.tunables.slave_activate_time;
        let handle = self.arm(id, TimerKind::Activate, interval);
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.activate_timer = Some(handle);
        } else {
            self.timers.delete(handle);
        }
    }

    pub(super) fn arm_relaunch_timer(&mut self, id: &SlaveId) {
        let interval = self.tunables.slave_relaunch_time;
        let handle = self.arm(id, TimerKind::Relaunch, interval);
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.relaunch_timer = Some(handle);
        } else {
            self.timers.delete(handle);
        }
    }

    /// Arm the TTL recycling timer. Secured slaves only (§4.3 "TTL
    /// expiry"); called after a clean activation handshake.
    pub(super) fn arm_ttl_timer(&mut self, id: &SlaveId) {
        let interval = self.tunables.slave_ttl;
        let handle = self.arm(id, TimerKind::Ttl, interval);
        if let Some(slave) = self.registry.find_by_name_mut(id) {
            slave.ttl_timer = Some(handle);
        } else {
            self.timers.delete(handle);
        }
    }

    fn arm(&mut self, id: &SlaveId, kind: TimerKind, interval: std::time::Duration) -> dpm_core::TimerHandle {
        let queue = self.timer_fires.clone();
        let slave = id.clone();
        self.timers.add(
            interval,
            Box::new(move || {
                queue.lock().push_back(TimerFire { slave: slave.clone(), kind });
                TimerAction::Cancel
            }),
        )
    }

    pub(super) fn cancel_timer_kind(&mut self, id: &SlaveId, kind: TimerKind) {
        let handle = self.registry.find_by_name_mut(id).and_then(|slave| match kind {
            TimerKind::Activate => slave.activate_timer.take(),
            TimerKind::Relaunch => slave.relaunch_timer.take(),
            TimerKind::Ttl => slave.ttl_timer.take(),
        });
        if let Some(handle) = handle {
            self.timers.delete(handle);
        }
    }

    pub(super) fn cancel_all_timers(&mut self, id: &SlaveId) {
        self.cancel_timer_kind(id, TimerKind::Activate);
        self.cancel_timer_kind(id, TimerKind::Relaunch);
        self.cancel_timer_kind(id, TimerKind::Ttl);
    }

    fn clear_timer_field(&mut self, fire: &TimerFire) {
        if let Some(slave) = self.registry.find_by_name_mut(&fire.slave) {
            match fire.kind {
                TimerKind::Activate => slave.activate_timer = None,
                TimerKind::Relaunch => slave.relaunch_timer = None,
                TimerKind::Ttl => slave.ttl_timer = None,
            }
        }
    }

    /// Drive the timer service forward and react to whatever fired.
    /// The daemon's main loop calls this once per `tokio::select!`
    /// iteration, sized against `self.timers().next_deadline()`.
    pub async fn poll_timers(&mut self) {
        let now = self.clock.now();
        self.timers.poll(now);
        let fired: Vec<TimerFire> = self.timer_fires.lock().drain(..).collect();
        for fire in fired {
            // The handle field is cleared before any handler runs, since
            // a handler may re-arm a timer of the same kind.
            self.clear_timer_field(&fire);
            if self.registry.find_by_name(&fire.slave).is_none() {
                continue;
            }
            match fire.kind {
                TimerKind::Activate => self.handle_activate_timeout(&fire.slave).await,
                TimerKind::Relaunch => self.handle_relaunch_fire(&fire.slave).await,
                TimerKind::Ttl => self.handle_ttl_expired(&fire.slave).await,
            }
        }
    }
}
