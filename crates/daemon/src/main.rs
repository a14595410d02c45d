// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dpmd`: the data provider master daemon binary.
//!
//! Wires a [`dpm_engine::Supervisor`] to the Unix-socket RPC transport,
//! a process-spawning launcher, a static display monitor, and a no-op
//! package manager, then drives it from a single `tokio` task (§5
//! "Scheduling model"). Every `SlaveEvent` the accept loop produces and
//! every timer fire is handled on this one task — there is no
//! cross-task mutation of the registry or fault call list.

use std::sync::Arc;

use dpm_adapters::{DisplayMonitor, Launcher, NoopPackageManager, PackageManager, ProcessLauncher, RpcChannel, StaticDisplayMonitor};
use dpm_core::{Clock, SystemClock};
use dpm_daemon::rpc_server::{self, SlaveEvent, UnixRpcChannel};
use dpm_daemon::{config, load_tunables};
use dpm_engine::Supervisor;
use tokio::net::UnixListener;
use tokio::sync::mpsc;
use tokio::time::Instant as TokioInstant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let tunables = load_tunables();
    let socket_path = config::socket_path();
    let launcher_path = config::launcher_binary_path();

    if socket_path.exists() {
        if let Err(err) = std::fs::remove_file(&socket_path) {
            warn!(path = %socket_path.display(), error = %err, "could not remove stale socket");
        }
    }
    let listener = match UnixListener::bind(&socket_path) {
        Ok(listener) => listener,
        Err(err) => {
            error!(path = %socket_path.display(), error = %err, "failed to bind slave socket");
            std::process::exit(1);
        }
    };
    info!(path = %socket_path.display(), launcher = %launcher_path.display(), ?tunables, "dpmd listening");

    let rpc = Arc::new(UnixRpcChannel::new());
    let launcher = Arc::new(ProcessLauncher::new(launcher_path));
    let display = Arc::new(StaticDisplayMonitor::new(false));
    let package_manager = Arc::new(NoopPackageManager);
    let clock = SystemClock;

    let mut supervisor = Supervisor::new(launcher, rpc.clone(), display, package_manager, clock, tunables);

    let (events_tx, mut events_rx) = mpsc::channel(256);
    tokio::spawn(rpc_server::run_accept_loop(listener, rpc, events_tx));

    loop {
        let deadline = supervisor
            .timers()
            .next_deadline()
            .map(TokioInstant::from_std)
            .unwrap_or_else(|| TokioInstant::now() + std::time::Duration::from_secs(1));

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, quiescing all slaves");
                supervisor.deactivate_all(false, false).await;
                break;
            }
            _ = tokio::time::sleep_until(deadline) => {
                supervisor.poll_timers().await;
            }
            event = events_rx.recv() => {
                match event {
                    Some(event) => handle_event(&mut supervisor, event).await,
                    None => {
                        warn!("slave event channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }
}

async fn handle_event<L, R, D, P, C>(supervisor: &mut Supervisor<L, R, D, P, C>, event: SlaveEvent)
where
    L: Launcher,
    R: RpcChannel,
    D: DisplayMonitor,
    P: PackageManager,
    C: Clock,
{
    let result = match event {
        SlaveEvent::Hello(id) => supervisor.on_hello(&id).await,
        SlaveEvent::ExitNotice(id) => supervisor.on_exit_notice(&id).await,
        SlaveEvent::PauseAck(id, status) => supervisor.on_pause_ack(&id, status),
        SlaveEvent::ResumeAck(id, status) => supervisor.on_resume_ack(&id, status),
    };
    if let Err(err) = result {
        warn!(error = %err, "slave event handling failed");
    }
}
