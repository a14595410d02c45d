// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monotonic-clock timer scheduler (§4.1).
//!
//! Poll-based rather than heap-based: at daemon scale (at most three
//! timers per slave) a linear scan per `poll()` is cheaper than
//! maintaining a binary heap, and it keeps `freeze`/`thaw`/`delay`
//! trivial to reason about. Grounded on the teacher's `Scheduler`
//! (`oj-engine::scheduler_tests`) poll-over-`Vec` pattern, generalized
//! from string timer ids to opaque handles and widened with
//! freeze/thaw/delay, which the teacher's scheduler does not need.
//!
//! Callbacks never reach back into the supervisor directly — they run
//! while `TimerService` itself is borrowed, so a callback that needs to
//! mutate a `Slave` record would alias that borrow. Supervisor code
//! arms timers with closures that only enqueue a `(SlaveId, TimerKind)`
//! onto a shared queue (see `crate::supervisor::timers`); the owning
//! main-loop call to `Supervisor::poll_timers` drains that queue after
//! `TimerService::poll` returns, with an exclusive `&mut Supervisor`.

use dpm_core::{Clock, TimerHandle, TimerHandleGen};
use std::time::{Duration, Instant};

/// What happens to a timer after its callback fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Remove the timer; it will not fire again.
    Cancel,
    /// Re-arm with the original interval, compensating for any drift
    /// (§4.1: "must compensate for coarse timer drift so that a
    /// period-aligned repeating callback does not accumulate skew").
    Renew,
}

pub type TimerCallback = Box<dyn FnMut() -> TimerAction + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerState {
    Armed { deadline: Instant },
    Frozen { remaining: Duration },
}

struct TimerEntry {
    handle: TimerHandle,
    interval: Duration,
    state: TimerState,
    callback: TimerCallback,
}

/// The scheduler itself. One instance per daemon, driven once per
/// iteration of the main event loop against an injected [`Clock`].
pub struct TimerService<C: Clock> {
    clock: C,
    handles: TimerHandleGen,
    entries: Vec<TimerEntry>,
}

impl<C: Clock> TimerService<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, handles: TimerHandleGen::new(), entries: Vec::new() }
    }

    /// Arm a new timer at `interval` from now. Mirrors `add(interval,
    /// callback, data) -> handle` (§4.1); the `data` half of the
    /// original pair is whatever the callback closure captures.
    pub fn add(&mut self, interval: Duration, callback: TimerCallback) -> TimerHandle {
        let handle = self.handles.next();
        let deadline = self.clock.now() + interval;
        self.entries.push(TimerEntry {
            handle,
            interval,
            state: TimerState::Armed { deadline },
            callback,
        });
        handle
    }

    /// Remove a timer. Returns `false` if the handle is unknown (already
    /// fired-and-cancelled, or never existed).
    pub fn delete(&mut self, handle: TimerHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        before != self.entries.len()
    }

    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Restart with the original interval, from now. Un-freezes if
    /// frozen.
    pub fn reset(&mut self, handle: TimerHandle) -> bool {
        let now = self.clock.now();
        match self.entries.iter_mut().find(|e| e.handle == handle) {
            Some(entry) => {
                entry.state = TimerState::Armed { deadline: now + entry.interval };
                true
            }
            None => false,
        }
    }

    /// Suspend without losing remaining time (§4.1 "freeze/thaw").
    pub fn freeze(&mut self, handle: TimerHandle) -> bool {
        let now = self.clock.now();
        match self.entries.iter_mut().find(|e| e.handle == handle) {
            Some(entry) => {
                if let TimerState::Armed { deadline } = entry.state {
                    let remaining = deadline.saturating_duration_since(now);
                    entry.state = TimerState::Frozen { remaining };
                }
                true
            }
            None => false,
        }
    }

    /// Resume a frozen timer with its remaining time intact.
    pub fn thaw(&mut self, handle: TimerHandle) -> bool {
        let now = self.clock.now();
        match self.entries.iter_mut().find(|e| e.handle == handle) {
            Some(entry) => {
                if let TimerState::Frozen { remaining } = entry.state {
                    entry.state = TimerState::Armed { deadline: now + remaining };
                }
                true
            }
            None => false,
        }
    }

    /// Seconds (as a `Duration`) remaining before this timer fires,
    /// whether armed or frozen. `None` if the handle is unknown.
    pub fn pending(&self, handle: TimerHandle) -> Option<Duration> {
        let now = self.clock.now();
        self.entries.iter().find(|e| e.handle == handle).map(|e| match e.state {
            TimerState::Armed { deadline } => deadline.saturating_duration_since(now),
            TimerState::Frozen { remaining } => remaining,
        })
    }

    /// Extend the remaining time by `extra`, whether armed or frozen.
    pub fn delay(&mut self, handle: TimerHandle, extra: Duration) -> bool {
        match self.entries.iter_mut().find(|e| e.handle == handle) {
            Some(entry) => {
                match &mut entry.state {
                    TimerState::Armed { deadline } => *deadline += extra,
                    TimerState::Frozen { remaining } => *remaining += extra,
                }
                true
            }
            None => false,
        }
    }

    /// Is any armed (non-frozen) timer due at `now`?
    pub fn has_due(&self, now: Instant) -> bool {
        self.entries.iter().any(|e| matches!(e.state, TimerState::Armed { deadline } if deadline <= now))
    }

    /// Earliest deadline among armed (non-frozen) timers, for the main
    /// loop to size its next `tokio::select!` sleep against.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .iter()
            .filter_map(|e| match e.state {
                TimerState::Armed { deadline } => Some(deadline),
                TimerState::Frozen { .. } => None,
            })
            .min()
    }

    /// Fire every armed timer whose deadline has passed, at the given
    /// `now`. Renewed timers are re-armed relative to their *original*
    /// deadline (not `now`), walked forward by whole intervals until
    /// the new deadline is in the future, so a period-aligned repeater
    /// never accumulates skew from being polled a little late.
    pub fn poll(&mut self, now: Instant) {
        let mut i = 0;
        while i < self.entries.len() {
            let due = matches!(self.entries[i].state, TimerState::Armed { deadline } if deadline <= now);
            if !due {
                i += 1;
                continue;
            }
            let action = (self.entries[i].callback)();
            match action {
                TimerAction::Cancel => {
                    self.entries.remove(i);
                }
                TimerAction::Renew => {
                    let interval = self.entries[i].interval;
                    if let TimerState::Armed { deadline } = &mut self.entries[i].state {
                        *deadline += interval;
                        while *deadline <= now {
                            *deadline += interval;
                        }
                    }
                    i += 1;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "timer_service_tests.rs"]
mod tests;
