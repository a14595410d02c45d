// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The slave record: the central entity of the supervisor core.
//!
//! Unlike the `define_id!`-generated identifiers elsewhere in this crate,
//! a slave's name is chosen by its caller (`find_or_create(name, ...)`),
//! not minted randomly, so [`SlaveId`] is a plain interned-string newtype
//! rather than a `define_id!` type.

use crate::event::Observers;
use crate::timer::TimerHandle;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// A slave's name, used as its identity within the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlaveId(String);

impl SlaveId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlaveId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SlaveId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for SlaveId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for SlaveId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for SlaveId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// The slave lifecycle state machine (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlaveState {
    RequestedLaunch,
    Resumed,
    Paused,
    RequestedPause,
    RequestedResume,
    RequestedTerminate,
    Terminated,
    /// Not part of the original state diagram; used when launch exhausts
    /// its relaunch budget or hits a fatal launcher error and no further
    /// transition applies until the record is destroyed or relaunched.
    Error,
}

impl SlaveState {
    /// Invariant 1: every state except `RequestedTerminate`/`Terminated`
    /// counts as active for scheduling purposes.
    pub fn is_active(&self) -> bool {
        !matches!(self, SlaveState::RequestedTerminate | SlaveState::Terminated)
    }
}

impl fmt::Display for SlaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlaveState::RequestedLaunch => "requested_launch",
            SlaveState::Resumed => "resumed",
            SlaveState::Paused => "paused",
            SlaveState::RequestedPause => "requested_pause",
            SlaveState::RequestedResume => "requested_resume",
            SlaveState::RequestedTerminate => "requested_terminate",
            SlaveState::Terminated => "terminated",
            SlaveState::Error => "error",
        })
    }
}

/// A cheap, owned copy of the fields observers and callers care about.
///
/// Handed to event callbacks and returned from lookups instead of a live
/// borrow into the registry's storage, so that a callback which triggers
/// destruction of the record it was invoked about never has to alias a
/// borrow the supervisor is also holding (see `crate::event`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlaveSnapshot {
    pub id: SlaveId,
    pub package: String,
    pub abi: String,
    pub secured: bool,
    pub network: bool,
    pub state: SlaveState,
    pub pid: Option<u32>,
    pub loaded_package: usize,
    pub loaded_instance: usize,
    pub fault_count: u64,
    pub critical_fault_count: u32,
}

impl SlaveSnapshot {
    /// Builds a snapshot with sensible test defaults, overriding only the
    /// name. Used by unit tests that need a `SlaveSnapshot` but do not
    /// care about its other fields.
    #[cfg(any(test, feature = "test-support"))]
    pub fn test_default(name: impl Into<String>) -> Self {
        Self {
            id: SlaveId::new(name),
            package: String::new(),
            abi: String::new(),
            secured: false,
            network: false,
            state: SlaveState::Terminated,
            pid: None,
            loaded_package: 0,
            loaded_instance: 0,
            fault_count: 0,
            critical_fault_count: 0,
        }
    }
}

/// The slave record (§3 Data Model).
#[derive(Debug)]
pub struct Slave {
    pub id: SlaveId,
    pub package: String,
    pub abi: String,
    pub secured: bool,
    pub network: bool,
    pub state: SlaveState,
    pub pid: Option<u32>,
    /// Strong references held against this record. The registry itself
    /// holds exactly one; other components may hold more (invariant 3).
    pub refcount: u32,
    /// Distinct packages currently assigned to this slave. `loaded_package`
    /// (§3) is `packages.len()`.
    packages: HashMap<String, usize>,
    pub loaded_instance: usize,
    pub fault_count: u64,
    pub critical_fault_count: u32,
    pub activated_at: Option<u64>,
    pub reactivate_slave: bool,
    pub reactivate_instances: bool,
    pub relaunch_count: u32,
    pub ttl_timer: Option<TimerHandle>,
    pub activate_timer: Option<TimerHandle>,
    pub relaunch_timer: Option<TimerHandle>,
    pub observers: Observers,
    /// Scratchpad for collaborators. Distinct from the event lists.
    pub scratchpad: HashMap<String, serde_json::Value>,
}

impl Slave {
    pub fn new(id: SlaveId, package: impl Into<String>, abi: impl Into<String>, secured: bool, network: bool) -> Self {
        Self {
            id,
            package: package.into(),
            abi: abi.into(),
            secured,
            network,
            state: SlaveState::Terminated,
            pid: None,
            refcount: 1,
            packages: HashMap::new(),
            loaded_instance: 0,
            fault_count: 0,
            critical_fault_count: 0,
            activated_at: None,
            reactivate_slave: true,
            reactivate_instances: true,
            relaunch_count: 0,
            ttl_timer: None,
            activate_timer: None,
            relaunch_timer: None,
            observers: Observers::new(),
            scratchpad: HashMap::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn loaded_package(&self) -> usize {
        self.packages.len()
    }

    /// Invariant 6: a secured slave may have at most one package with any
    /// instances loaded.
    pub fn assign_package(&mut self, package: impl Into<String>) {
        let package = package.into();
        *self.packages.entry(package).or_insert(0) += 1;
    }

    pub fn release_package(&mut self, package: &str) {
        if let Some(count) = self.packages.get_mut(package) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.packages.remove(package);
            }
        }
    }

    pub fn hosts_single_package(&self) -> Option<&str> {
        if self.packages.len() == 1 {
            self.packages.keys().next().map(String::as_str)
        } else {
            None
        }
    }

    /// Whether `package` is currently assigned to this slave, whether
    /// or not it is the slave's primary launch `package`.
    pub fn hosts_package(&self, package: &str) -> bool {
        self.package == package || self.packages.contains_key(package)
    }

    pub fn snapshot(&self) -> SlaveSnapshot {
        SlaveSnapshot {
            id: self.id.clone(),
            package: self.package.clone(),
            abi: self.abi.clone(),
            secured: self.secured,
            network: self.network,
            state: self.state,
            pid: self.pid,
            loaded_package: self.loaded_package(),
            loaded_instance: self.loaded_instance,
            fault_count: self.fault_count,
            critical_fault_count: self.critical_fault_count,
        }
    }
}

#[cfg(test)]
#[path = "slave_tests.rs"]
mod tests;
