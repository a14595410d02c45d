// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer callback lists for slave lifecycle events.
//!
//! Each [`Slave`](crate::slave::Slave) owns one ordered list per event kind
//! (`ACTIVATE`, `DEACTIVATE`, `DELETE`, `PAUSE`, `RESUME`, `FAULT`).
//! Registration prepends, so the most recently registered observer runs
//! first. A callback's own captured state stands in for the original
//! system's separate `(callback, opaque data)` pair — Rust closures close
//! over their data directly.
//!
//! Callback lists must tolerate self-removal *and* removal of other
//! entries while iteration is in progress (a callback can, in principle,
//! unregister a sibling). We use a tombstone-and-compact strategy rather
//! than an intrusive list: entries are `Option<EventCallback>`, iteration
//! walks by index and skips `None` slots, and compaction only happens
//! between dispatches, never mid-iteration.
//!
//! Observers receive a [`SlaveSnapshot`] rather than a live `&Slave`. A
//! callback may itself trigger destruction of the slave record it was
//! called about (a collaborator releasing its own reference as a side
//! effect of the notification); handing out an owned snapshot instead of
//! a borrow into the registry's storage means that reentrant destruction
//! is a supervisor-level concern (it re-checks the record after dispatch
//! returns) rather than a borrow-checker hazard here.

use crate::fault::FaultAttribution;
use crate::slave::SlaveSnapshot;
use std::collections::VecDeque;
use std::fmt;

/// The six kinds of lifecycle event a collaborator may observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Activate,
    Deactivate,
    Delete,
    Pause,
    Resume,
    Fault,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventKind::Activate => "activate",
            EventKind::Deactivate => "deactivate",
            EventKind::Delete => "delete",
            EventKind::Pause => "pause",
            EventKind::Resume => "resume",
            EventKind::Fault => "fault",
        })
    }
}

/// Whether a callback should remain registered after this invocation.
///
/// Maps to the original "non-negative keeps, negative removes" integer
/// convention (§6 External Interfaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackDisposition {
    Keep,
    Remove,
}

/// Outcome of a single observer invocation.
///
/// `reactivate_vote` is only meaningful for `DEACTIVATE` callbacks: the
/// supervisor counts how many deactivate observers asked for
/// reactivation (§4.3 Deactivation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackResult {
    pub disposition: CallbackDisposition,
    pub reactivate_vote: bool,
}

impl CallbackResult {
    pub fn keep() -> Self {
        Self {
            disposition: CallbackDisposition::Keep,
            reactivate_vote: false,
        }
    }

    pub fn keep_and_vote_reactivate() -> Self {
        Self {
            disposition: CallbackDisposition::Keep,
            reactivate_vote: true,
        }
    }

    pub fn remove() -> Self {
        Self {
            disposition: CallbackDisposition::Remove,
            reactivate_vote: false,
        }
    }
}

/// Context passed alongside the slave to an observer callback.
pub enum EventContext<'a> {
    Activate,
    Deactivate,
    Delete,
    Pause,
    Resume,
    Fault(&'a FaultAttribution),
}

/// A registered observer. Boxed `FnMut` so a collaborator can close over
/// whatever opaque state it needs (an RPC handle, a package name, ...).
pub type EventCallback =
    Box<dyn FnMut(&SlaveSnapshot, &EventContext<'_>) -> CallbackResult + Send>;

/// Newest-first callback list for a single event kind.
///
/// `push` prepends. `dispatch` iterates front-to-back (i.e. newest
/// registration first), invoking each live callback once, and compacts
/// away any entries that asked to be removed (by themselves, in the
/// disposition they returned) once the pass is complete.
#[derive(Default)]
pub struct ObserverList {
    entries: VecDeque<Option<EventCallback>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer. Runs before any previously registered one.
    pub fn push(&mut self, callback: EventCallback) {
        self.entries.push_front(Some(callback));
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every live observer once, newest-first, then drop any that
    /// asked to be removed. Returns the number of observers that voted
    /// `reactivate` (meaningful only for the DEACTIVATE list).
    pub fn dispatch(&mut self, snapshot: &SlaveSnapshot, ctx: &EventContext<'_>) -> usize {
        let mut reactivate_votes = 0;
        // Index-based walk: `len()` is re-read from the live Vec length
        // (not the logical count) so entries appended *during* dispatch by
        // a callback (re-entrant registration) are not visited this pass,
        // matching "the most recently registered observer is invoked
        // first" for the *next* dispatch, not this one.
        let slot_count = self.entries.len();
        for i in 0..slot_count {
            let mut slot = self.entries[i].take();
            if let Some(callback) = slot.as_mut() {
                let result = callback(snapshot, ctx);
                if result.reactivate_vote {
                    reactivate_votes += 1;
                }
                if result.disposition == CallbackDisposition::Keep {
                    self.entries[i] = slot;
                }
                // CallbackDisposition::Remove: leave the slot as None.
            }
        }
        self.entries.retain(|e| e.is_some());
        reactivate_votes
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.len())
            .finish()
    }
}

/// One [`ObserverList`] per [`EventKind`], owned by a [`Slave`] record.
#[derive(Debug, Default)]
pub struct Observers {
    pub activate: ObserverList,
    pub deactivate: ObserverList,
    pub delete: ObserverList,
    pub pause: ObserverList,
    pub resume: ObserverList,
    pub fault: ObserverList,
}

impl Observers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_mut(&mut self, kind: EventKind) -> &mut ObserverList {
        match kind {
            EventKind::Activate => &mut self.activate,
            EventKind::Deactivate => &mut self.deactivate,
            EventKind::Delete => &mut self.delete,
            EventKind::Pause => &mut self.pause,
            EventKind::Resume => &mut self.resume,
            EventKind::Fault => &mut self.fault,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
