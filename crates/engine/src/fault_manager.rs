// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crash attribution (§4.4).
//!
//! Consumes a slave's exit notice plus its on-disk crash-log breadcrumb
//! plus the in-memory shadow call stack, and produces a best-effort
//! `(package, file, function)` attribution. The log probe is small
//! synchronous blocking I/O run on the main loop itself (§5): log files
//! are a handful of bytes, so `tokio::task::spawn_blocking` buys nothing
//! here.

use dpm_core::{FaultAttribution, FaultCallRecord, SlaveId};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What the caller (the supervisor) should do once attribution completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributionOutcome {
    /// A package was identified; carries the broadcast-ready triple.
    Attributed(FaultAttribution),
    /// Best-effort and came up empty — an informational, not an error,
    /// condition (§4.4 "Failure semantics").
    NoAttribution,
}

/// Process-wide shadow call stack and crash-log reader.
///
/// One instance per daemon. `fault_mark_count` is the boolean-by-
/// convention counter from §3 ("Fault mark counter"): incremented on
/// every call-enter and every `record_fault`, decremented on every
/// matched return, and force-reset to zero whenever an attribution
/// completes (§8: "`fault_mark_count == 0` immediately after
/// `fault_check_pkgs` returns for any slave").
pub struct FaultManager {
    log_path: PathBuf,
    calls: Vec<FaultCallRecord>,
    fault_mark_count: i64,
}

impl FaultManager {
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        Self { log_path: log_path.into(), calls: Vec::new(), fault_mark_count: 0 }
    }

    pub fn fault_mark_count(&self) -> i64 {
        self.fault_mark_count
    }

    pub fn has_outstanding_calls(&self) -> bool {
        self.fault_mark_count > 0
    }

    /// `call(slave, pkg, file, func)` (§4.4 "Call/return tracking").
    pub fn call(&mut self, record: FaultCallRecord) {
        self.fault_mark_count += 1;
        self.calls.push(record);
    }

    /// `return(slave, pkg, file, func)`. Removes the first exact match
    /// (FIFO order among overlapping identical calls, matching the
    /// original system's linear unwind semantics) and returns whether
    /// one was found.
    pub fn return_call(&mut self, slave: &SlaveId, package: &str, file: &str, function: &str) -> bool {
        if let Some(pos) = self.calls.iter().position(|c| c.matches_return(slave, package, file, function)) {
            self.calls.remove(pos);
            self.fault_mark_count -= 1;
            true
        } else {
            false
        }
    }

    /// Note that a fault has been observed for `slave`, ahead of running
    /// [`Self::attribute`]. §3: the mark counter is "incremented on each
    /// call-enter and each set-fault".
    pub fn record_fault(&mut self) {
        self.fault_mark_count += 1;
    }

    /// The three-step attribution algorithm (§4.4), run once a slave has
    /// terminated (cleanly or by fault).
    ///
    /// `secured_single_package` is `Some(pkg)` when the slave is secured
    /// and currently hosts exactly one package (§4.4 step 2).
    pub fn attribute(
        &mut self,
        slave: &SlaveId,
        pid: u32,
        secured_single_package: Option<&str>,
    ) -> AttributionOutcome {
        let outcome = self
            .probe_crash_log(slave, pid)
            .or_else(|| self.secured_slave_rule(secured_single_package))
            .or_else(|| self.shadow_call_stack(slave));

        // §8 invariant: zero out the mark counter as attribution
        // concludes, whether or not it found anything to attribute.
        self.fault_mark_count = 0;

        match outcome {
            Some(attribution) => AttributionOutcome::Attributed(attribution),
            None => {
                info!(slave = %slave, pid, "fault attribution produced no match");
                AttributionOutcome::NoAttribution
            }
        }
    }

    /// Step 1: crash-log probe.
    fn probe_crash_log(&mut self, slave: &SlaveId, pid: u32) -> Option<FaultAttribution> {
        let path = self.log_path.join(format!("slave.{pid}"));
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "crash log read failed");
                return None;
            }
        };
        let first_line = contents.lines().next()?;
        let package = parse_liblive_line(first_line)?;

        self.calls.retain(|c| &c.slave != slave);
        if let Err(err) = fs::remove_file(&path) {
            warn!(path = %path.display(), error = %err, "crash log delete failed");
        }
        Some(FaultAttribution::package_only(package))
    }

    /// Step 2: secured-slave rule.
    fn secured_slave_rule(&self, secured_single_package: Option<&str>) -> Option<FaultAttribution> {
        secured_single_package.map(FaultAttribution::package_only)
    }

    /// Step 3: walk the shadow call stack in reverse (most recent
    /// first), attribute to the first match for this slave, mark
    /// earlier matches as false logs (diagnostic only), then drop all
    /// of this slave's records.
    fn shadow_call_stack(&mut self, slave: &SlaveId) -> Option<FaultAttribution> {
        let mut attribution = None;
        let mut false_logs = 0u32;
        for record in self.calls.iter().rev() {
            if &record.slave == slave {
                if attribution.is_none() {
                    attribution = Some(FaultAttribution::from_call_record(record));
                } else {
                    false_logs += 1;
                }
            }
        }
        if false_logs > 0 {
            info!(slave = %slave, false_logs, "earlier shadow-stack entries superseded by most recent fault");
        }
        self.calls.retain(|c| &c.slave != slave);
        attribution
    }

    /// Records still outstanding for `slave`, for test assertions.
    #[cfg(any(test, feature = "test-support"))]
    pub fn calls_for(&self, slave: &SlaveId) -> Vec<&FaultCallRecord> {
        self.calls.iter().filter(|c| &c.slave == slave).collect()
    }
}

/// Parse a crash-log first line of the form `liblive-<package>.so`,
/// optionally trailing debug text on later lines which we never read.
fn parse_liblive_line(line: &str) -> Option<String> {
    let line = line.trim();
    let rest = line.strip_prefix("liblive-")?;
    let package = rest.strip_suffix(".so")?;
    if package.is_empty() {
        None
    } else {
        Some(package.to_string())
    }
}

pub fn crash_log_path(log_dir: &Path, pid: u32) -> PathBuf {
    log_dir.join(format!("slave.{pid}"))
}

#[cfg(test)]
#[path = "fault_manager_tests.rs"]
mod tests;
