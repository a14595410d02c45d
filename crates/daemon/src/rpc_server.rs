// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix-domain-socket transport for the out-of-scope RPC channel port
//! (§1 Non-goals: "the wire RPC transport and packet codec" is an
//! external collaborator; this module is the minimal concrete wiring
//! that makes the binary runnable, not a reimplementation of a
//! client-facing protocol).
//!
//! Wire format mirrors the teacher's: a 4-byte big-endian length
//! prefix followed by a JSON payload. A slave registers itself with a
//! `hello` once connected; `send_pause`/`send_resume` address it by
//! the id it announced, and `broadcast_fault` writes to every
//! currently connected slave.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dpm_adapters::{RpcChannel, RpcError};
use dpm_core::{FaultAttribution, SlaveId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutboundMessage {
    Pause { timestamp: f64 },
    Resume { timestamp: f64 },
    Fault { package: String, file: String, function: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InboundMessage {
    Hello { slave: String },
    ExitNotice { slave: String },
    PauseAck { slave: String, status: i32 },
    ResumeAck { slave: String, status: i32 },
}

/// A parsed inbound message, handed to the daemon's main loop over a
/// channel so it can drive the supervisor from a single task.
#[derive(Debug, Clone)]
pub enum SlaveEvent {
    Hello(SlaveId),
    ExitNotice(SlaveId),
    PauseAck(SlaveId, i32),
    ResumeAck(SlaveId, i32),
}

type Writer = Arc<tokio::sync::Mutex<OwnedWriteHalf>>;

/// `RpcChannel` backed by a Unix domain socket. Connections register
/// themselves once their `hello` names a slave; until then they are
/// readable but not addressable.
pub struct UnixRpcChannel {
    connections: Mutex<HashMap<SlaveId, Writer>>,
}

impl UnixRpcChannel {
    pub fn new() -> Self {
        Self { connections: Mutex::new(HashMap::new()) }
    }

    fn register(&self, slave: SlaveId, writer: Writer) {
        self.connections.lock().insert(slave, writer);
    }

    fn unregister(&self, slave: &SlaveId) {
        self.connections.lock().remove(slave);
    }

    async fn send(&self, slave: &SlaveId, message: OutboundMessage) -> Result<(), RpcError> {
        let writer = self.connections.lock().get(slave).cloned();
        let writer = writer.ok_or_else(|| RpcError::ChannelClosed(slave.to_string()))?;
        let payload = serde_json::to_vec(&message).map_err(|err| RpcError::ChannelClosed(err.to_string()))?;
        let mut guard = writer.lock().await;
        write_framed(&mut *guard, &payload).await.map_err(|err| RpcError::ChannelClosed(err.to_string()))
    }
}

impl Default for UnixRpcChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RpcChannel for UnixRpcChannel {
    async fn send_pause(&self, slave: &SlaveId, timestamp: f64) -> Result<(), RpcError> {
        self.send(slave, OutboundMessage::Pause { timestamp }).await
    }

    async fn send_resume(&self, slave: &SlaveId, timestamp: f64) -> Result<(), RpcError> {
        self.send(slave, OutboundMessage::Resume { timestamp }).await
    }

    async fn broadcast_fault(&self, attribution: &FaultAttribution) -> Result<(), RpcError> {
        let message = OutboundMessage::Fault {
            package: attribution.package.clone(),
            file: attribution.file.clone(),
            function: attribution.function.clone(),
        };
        let payload = serde_json::to_vec(&message).map_err(|err| RpcError::ChannelClosed(err.to_string()))?;
        let targets: Vec<Writer> = self.connections.lock().values().cloned().collect();
        for writer in targets {
            let mut guard = writer.lock().await;
            if let Err(err) = write_framed(&mut *guard, &payload).await {
                warn!(error = %err, "fault broadcast write failed");
            }
        }
        Ok(())
    }
}

async fn write_framed<W: AsyncWriteExt + Unpin>(writer: &mut W, payload: &[u8]) -> std::io::Result<()> {
    let len = payload.len() as u32;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

async fn read_framed<R: AsyncReadExt + Unpin>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Accepts slave connections until the listener itself errors out,
/// spawning one task per connection (teacher's `listener::run` accept
/// loop pattern).
pub async fn run_accept_loop(listener: UnixListener, channel: Arc<UnixRpcChannel>, events: mpsc::Sender<SlaveEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let channel = Arc::clone(&channel);
                let events = events.clone();
                tokio::spawn(async move {
                    handle_connection(stream, channel, events).await;
                });
            }
            Err(err) => {
                warn!(error = %err, "accept failed");
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, channel: Arc<UnixRpcChannel>, events: mpsc::Sender<SlaveEvent>) {
    let (mut read_half, write_half) = stream.into_split();
    let write_half: Writer = Arc::new(tokio::sync::Mutex::new(write_half));
    let mut registered: Option<SlaveId> = None;

    loop {
        let payload = match read_framed(&mut read_half).await {
            Ok(payload) => payload,
            Err(err) => {
                debug!(error = %err, "slave connection closed");
                break;
            }
        };
        let message: InboundMessage = match serde_json::from_slice(&payload) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "malformed message on slave connection");
                continue;
            }
        };
        let event = match message {
            InboundMessage::Hello { slave } => {
                let id = SlaveId::new(slave);
                channel.register(id.clone(), Arc::clone(&write_half));
                registered = Some(id.clone());
                SlaveEvent::Hello(id)
            }
            InboundMessage::ExitNotice { slave } => SlaveEvent::ExitNotice(SlaveId::new(slave)),
            InboundMessage::PauseAck { slave, status } => SlaveEvent::PauseAck(SlaveId::new(slave), status),
            InboundMessage::ResumeAck { slave, status } => SlaveEvent::ResumeAck(SlaveId::new(slave), status),
        };
        if events.send(event).await.is_err() {
            break;
        }
    }

    if let Some(id) = registered {
        channel.unregister(&id);
    }
}

#[cfg(test)]
#[path = "rpc_server_tests.rs"]
mod tests;
