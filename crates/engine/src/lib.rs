// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dpm-engine: the slave lifecycle supervisor and its coupled fault
//! manager (§4).
//!
//! [`Registry`] owns slave records and reference counting (§4.2).
//! [`TimerService`] schedules the activate/relaunch/ttl timers every
//! slave carries (§4.1). [`FaultManager`] attributes a terminated
//! slave's crash to a package (§4.4). [`Supervisor`] ties all three
//! together with the state machine that drives a slave from launch
//! through deactivation (§4.3), generic over the
//! `dpm_adapters::{Launcher, RpcChannel, DisplayMonitor, PackageManager}`
//! ports so it stays testable without a real child process, wire
//! transport, display server, or package manager.

pub mod error;
pub mod fault_manager;
pub mod registry;
pub mod supervisor;
pub mod timer_service;

pub use error::{SupervisorError, SupervisorResult};
pub use fault_manager::{AttributionOutcome, FaultManager};
pub use registry::{Registry, SlaveOutcome};
pub use supervisor::Supervisor;
pub use timer_service::{TimerAction, TimerCallback, TimerService};
