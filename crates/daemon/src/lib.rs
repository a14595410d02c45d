// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! dpm-daemon: the runnable binary that wires `dpm-engine`'s supervisor
//! to real adapters (a Unix-domain-socket RPC transport, a
//! process-spawning launcher, a static display monitor, a no-op package
//! manager) and drives it from a single `tokio` main loop (§5
//! "Scheduling model: single-threaded cooperative").
//!
//! Exposed as a library so `main.rs` stays a thin entry point and the
//! main-loop wiring itself is unit-testable.

pub mod config;
pub mod error;
pub mod rpc_server;

pub use config::{load_tunables, socket_path};
pub use error::{DaemonError, DaemonResult};
pub use rpc_server::{SlaveEvent, UnixRpcChannel};
