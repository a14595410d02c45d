// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC channel port: the out-of-scope wire transport (§1 Non-goals)
//! represented as a trait so the supervisor can send pause/resume
//! requests and fault broadcasts without knowing the transport.

use async_trait::async_trait;
use dpm_core::{FaultAttribution, SlaveId};
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("no channel open for slave {0}")]
    ChannelClosed(String),
}

#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Fire-and-forget: returns once the request is queued, not once the
    /// slave has acted on it. The slave's own ack arrives later through
    /// whatever notification path the daemon's main loop is wired to.
    async fn send_pause(&self, slave: &SlaveId, timestamp: f64) -> Result<(), RpcError>;

    async fn send_resume(&self, slave: &SlaveId, timestamp: f64) -> Result<(), RpcError>;

    /// Broadcast a fault attribution to every interested collaborator
    /// over the wire (§4.4 "every attribution is broadcast").
    async fn broadcast_fault(&self, attribution: &FaultAttribution) -> Result<(), RpcError>;
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Default)]
pub struct FakeRpcChannel {
    pub paused: Mutex<Vec<(SlaveId, f64)>>,
    pub resumed: Mutex<Vec<(SlaveId, f64)>>,
    pub faults: Mutex<Vec<FaultAttribution>>,
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl RpcChannel for FakeRpcChannel {
    async fn send_pause(&self, slave: &SlaveId, timestamp: f64) -> Result<(), RpcError> {
        self.paused.lock().push((slave.clone(), timestamp));
        Ok(())
    }

    async fn send_resume(&self, slave: &SlaveId, timestamp: f64) -> Result<(), RpcError> {
        self.resumed.lock().push((slave.clone(), timestamp));
        Ok(())
    }

    async fn broadcast_fault(&self, attribution: &FaultAttribution) -> Result<(), RpcError> {
        self.faults.lock().push(attribution.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "rpc_tests.rs"]
mod tests;
