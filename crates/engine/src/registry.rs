// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide directory of slave records (§4.2).
//!
//! Owns creation and destruction of [`Slave`] records. Lookup is by
//! name (primary key), pid, RPC handle, or owning package; `order`
//! tracks insertion order separately from the `HashMap` so
//! [`Registry::find_available`] can honor "first slave in insertion
//! order" (§4.2) without pulling in an index-preserving map crate the
//! workspace does not otherwise depend on.

use dpm_core::event::EventContext;
use dpm_core::{CoreError, CoreResult, Slave, SlaveId, SlaveState};
use std::collections::HashMap;

/// Result of an operation that may have destroyed the slave record it
/// operated on (§9 "Reentrancy through refcounts"). Callers must match
/// on this instead of continuing to dereference a handle that might now
/// be dangling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlaveOutcome {
    Alive(SlaveId),
    Destroyed,
}

#[derive(Default)]
pub struct Registry {
    slaves: HashMap<SlaveId, Slave>,
    order: Vec<SlaveId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `find_or_create(name, ...)` (§3 Lifecycle). Returns the existing
    /// record's id if `name` is already registered, after a sanity
    /// check that `secured` agrees with the existing record.
    pub fn find_or_create(
        &mut self,
        name: impl Into<SlaveId>,
        secured: bool,
        abi: impl Into<String>,
        package: impl Into<String>,
        network: bool,
    ) -> CoreResult<SlaveId> {
        let id = name.into();
        if let Some(existing) = self.slaves.get(&id) {
            if existing.secured != secured {
                return Err(CoreError::invalid(format!(
                    "slave {id} already exists with secured={}, requested secured={secured}",
                    existing.secured
                )));
            }
            return Ok(id);
        }
        let slave = Slave::new(id.clone(), package, abi, secured, network);
        self.slaves.insert(id.clone(), slave);
        self.order.push(id.clone());
        Ok(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Slave> {
        self.slaves.get(name)
    }

    pub fn find_by_name_mut(&mut self, name: &str) -> Option<&mut Slave> {
        self.slaves.get_mut(name)
    }

    pub fn find_by_pid(&self, pid: u32) -> Option<&Slave> {
        self.order.iter().filter_map(|id| self.slaves.get(id)).find(|s| s.pid == Some(pid))
    }

    /// The original system indexes slaves by a separate "RPC handle";
    /// in this crate the RPC transport is an external collaborator
    /// (§1) addressed by `SlaveId` directly, so this is an alias for
    /// [`Self::find_by_name`] kept distinct to preserve the §4.2
    /// lookup surface at the call sites that name it.
    pub fn find_by_rpc_handle(&self, handle: &str) -> Option<&Slave> {
        self.find_by_name(handle)
    }

    pub fn find_by_package(&self, package: &str) -> Vec<&Slave> {
        self.order
            .iter()
            .filter_map(|id| self.slaves.get(id))
            .filter(|s| s.hosts_package(package))
            .collect()
    }

    /// `find_available(abi, secured, network)` (§4.2 selection
    /// algorithm). `default_abi`/`max_load` are tunables threaded
    /// through by the caller rather than cached here, since `Registry`
    /// has no config dependency of its own.
    pub fn find_available(
        &self,
        abi: &str,
        secured: bool,
        network: bool,
        default_abi: &str,
        max_load: usize,
    ) -> Option<SlaveId> {
        for id in &self.order {
            let Some(slave) = self.slaves.get(id) else { continue };
            if slave.secured != secured {
                continue;
            }
            if slave.state == SlaveState::RequestedTerminate && slave.loaded_instance == 0 {
                continue;
            }
            if !slave.abi.eq_ignore_ascii_case(abi) {
                continue;
            }
            if secured {
                if slave.loaded_package() != 0 {
                    continue;
                }
            } else {
                if slave.network != network {
                    continue;
                }
                let is_default_abi = slave.abi.eq_ignore_ascii_case(default_abi);
                if is_default_abi && slave.loaded_package() >= max_load {
                    continue;
                }
            }
            return Some(id.clone());
        }
        None
    }

    pub fn all(&self) -> impl Iterator<Item = &Slave> {
        self.order.iter().filter_map(|id| self.slaves.get(id))
    }

    pub fn len(&self) -> usize {
        self.slaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slaves.is_empty()
    }

    /// `ref(name)` (§4.2 "Reference counting").
    pub fn ref_slave(&mut self, id: &SlaveId) -> CoreResult<u32> {
        let slave = self.slaves.get_mut(id).ok_or(CoreError::NotExist)?;
        slave.refcount += 1;
        Ok(slave.refcount)
    }

    /// `unref(name)`. Reaching zero with `pid == none` destroys the
    /// record: fires delete-callbacks, frees the scratchpad and event
    /// lists (by dropping the record), and removes it from the
    /// registry. By the time a slave's refcount can reach zero its
    /// timers are already cancelled — the supervisor clears all three
    /// timer handles as part of the `Terminated` transition, which
    /// always happens before any `unref` drops the count to zero.
    ///
    /// Reaching zero while `pid` is still set is the "programming
    /// error" case from §4.2: the refcount is still decremented (the
    /// caller's reference is gone either way) but the record is *not*
    /// destroyed, and `CoreError::Invalid` is reported.
    pub fn unref(&mut self, id: &SlaveId) -> CoreResult<SlaveOutcome> {
        let slave = self.slaves.get_mut(id).ok_or(CoreError::NotExist)?;
        slave.refcount = slave.refcount.saturating_sub(1);
        if slave.refcount > 0 {
            return Ok(SlaveOutcome::Alive(id.clone()));
        }
        if let Some(pid) = slave.pid {
            return Err(CoreError::invalid(format!(
                "refcount reached zero for slave {id} while pid {pid} is still set; not destroying"
            )));
        }
        self.destroy(id)?;
        Ok(SlaveOutcome::Destroyed)
    }

    fn destroy(&mut self, id: &SlaveId) -> CoreResult<()> {
        let slave = self.slaves.get_mut(id).ok_or(CoreError::NotExist)?;
        let snapshot = slave.snapshot();
        slave.observers.delete.dispatch(&snapshot, &EventContext::Delete);
        self.slaves.remove(id);
        self.order.retain(|x| x != id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
