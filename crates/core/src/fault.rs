// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fault-attribution data types.
//!
//! The attribution algorithm itself lives in `dpm-engine::fault_manager`;
//! this module only defines the record shapes it operates on, so that
//! both the engine and the adapters that feed it (crash-log reads, RPC
//! broadcasts) can share one definition.

use crate::slave::SlaveId;

/// A single outstanding plugin call, appended on entry and removed on a
/// matching return (§3 "Fault call record").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultCallRecord {
    pub slave: SlaveId,
    pub package: String,
    pub file: String,
    pub function: String,
    pub recorded_at: u64,
}

impl FaultCallRecord {
    pub fn new(
        slave: SlaveId,
        package: impl Into<String>,
        file: impl Into<String>,
        function: impl Into<String>,
        recorded_at: u64,
    ) -> Self {
        Self {
            slave,
            package: package.into(),
            file: file.into(),
            function: function.into(),
            recorded_at,
        }
    }

    /// Whether this record matches an exact `return(slave, pkg, file, func)` call.
    pub fn matches_return(&self, slave: &SlaveId, package: &str, file: &str, function: &str) -> bool {
        &self.slave == slave && self.package == package && self.file == file && self.function == function
    }
}

/// Result of the three-step attribution algorithm (§4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultAttribution {
    pub package: String,
    pub file: String,
    pub function: String,
}

impl FaultAttribution {
    /// Steps 1 and 2 carry no file/function.
    pub fn package_only(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            file: String::new(),
            function: String::new(),
        }
    }

    /// Step 3 carries the full call-record triple.
    pub fn from_call_record(record: &FaultCallRecord) -> Self {
        Self {
            package: record.package.clone(),
            file: record.file.clone(),
            function: record.function.clone(),
        }
    }
}

#[cfg(test)]
#[path = "fault_tests.rs"]
mod tests;
