// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer handle type shared between the timer service and slave records.
//!
//! A [`TimerHandle`] is an opaque token minted by the timer service on
//! `add` and held by whichever record owns the scheduled callback. It
//! carries no meaning on its own; `TimerKind` (below) records what a
//! handle stored on a [`crate::slave::Slave`] is *for*, so that the
//! supervisor can tell at a glance which of a slave's (at most three)
//! concurrent timers fired.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier for a single scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Test/internal constructor. Production code only ever receives
    /// handles minted by `TimerHandle::next()` inside the timer service.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Monotonic generator for fresh [`TimerHandle`]s.
#[derive(Debug, Default)]
pub struct TimerHandleGen(AtomicU64);

impl TimerHandleGen {
    pub fn new() -> Self {
        Self(AtomicU64::new(1))
    }

    pub fn next(&self) -> TimerHandle {
        TimerHandle(self.0.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which of a slave's three timer slots a handle occupies.
///
/// Used by the supervisor to decide which field on [`crate::slave::Slave`]
/// to clear when a timer fires or is cancelled (§9 Design Notes:
/// "timer-handle back-references").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Fires if the slave does not complete its activation handshake in time.
    Activate,
    /// Fires to retry a launch after a retryable launcher failure.
    Relaunch,
    /// Fires to cycle a secured slave for resource reclamation.
    Ttl,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TimerKind::Activate => "activate",
            TimerKind::Relaunch => "relaunch",
            TimerKind::Ttl => "ttl",
        })
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
