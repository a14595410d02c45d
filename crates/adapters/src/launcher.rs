// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process launcher port (§6 External Interfaces, "Launcher bundle").
//!
//! [`ProcessLauncher`] spawns a slave binary as a real child process.
//! It is deliberately thin: the slave binary itself is responsible for
//! loading the requested ABI runtime and package, the launcher only
//! gets it running and reaps it on request.

use async_trait::async_trait;
use dpm_core::{FatalLaunchError, LaunchOutcome, LauncherBundle, RetryableLaunchError};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Command;
use tracing::warn;

#[derive(Debug, Clone, Error)]
pub enum LauncherError {
    #[error("signal delivery to pid {0} failed: {1}")]
    Signal(u32, String),
}

#[async_trait]
pub trait Launcher: Send + Sync {
    /// Attempt one launch. Never blocks past the process spawn itself —
    /// the activation handshake that follows is the supervisor's job.
    async fn launch(&self, bundle: &LauncherBundle) -> LaunchOutcome;

    /// Best-effort termination. A launcher that cannot find `pid` should
    /// still return `Ok`; the supervisor treats termination as fire-and-forget.
    async fn terminate(&self, pid: u32) -> Result<(), LauncherError>;
}

/// Spawns the configured slave binary per launch, passing the launch
/// bundle as environment variables. Reaping happens on a detached task
/// so `terminate` does not have to block the main loop on process exit.
pub struct ProcessLauncher {
    binary_path: PathBuf,
    children: Arc<Mutex<HashMap<u32, tokio::process::Child>>>,
}

impl ProcessLauncher {
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        Self {
            binary_path: binary_path.into(),
            children: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, bundle: &LauncherBundle) -> LaunchOutcome {
        let mut cmd = Command::new(&self.binary_path);
        cmd.env("DPM_SLAVE_NAME", &bundle.slave_name)
            .env("DPM_SLAVE_SECURED", if bundle.secured { "true" } else { "false" })
            .env("DPM_SLAVE_ABI", &bundle.abi)
            .kill_on_drop(false);

        match cmd.spawn() {
            Ok(child) => match child.id() {
                Some(pid) => {
                    self.children.lock().insert(pid, child);
                    LaunchOutcome::Ok { pid }
                }
                None => LaunchOutcome::Retryable(RetryableLaunchError::CommFailure),
            },
            Err(err) => {
                warn!(slave = %bundle.slave_name, error = %err, "slave spawn failed");
                match err.kind() {
                    std::io::ErrorKind::NotFound => LaunchOutcome::Fatal(FatalLaunchError::NoLaunchpad),
                    std::io::ErrorKind::PermissionDenied => LaunchOutcome::Fatal(FatalLaunchError::IllAccess),
                    _ => LaunchOutcome::Retryable(RetryableLaunchError::CommFailure),
                }
            }
        }
    }

    async fn terminate(&self, pid: u32) -> Result<(), LauncherError> {
        let child = self.children.lock().remove(&pid);
        if let Err(errno) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            if errno != nix::errno::Errno::ESRCH {
                return Err(LauncherError::Signal(pid, errno.to_string()));
            }
        }
        if let Some(mut child) = child {
            tokio::spawn(async move {
                let _ = child.wait().await;
            });
        }
        Ok(())
    }
}

/// Scripted launcher for tests: returns outcomes from a fixed queue in
/// order, falling back to a generic fatal error once exhausted.
#[cfg(any(test, feature = "test-support"))]
pub struct FakeLauncher {
    scripted: Mutex<std::collections::VecDeque<LaunchOutcome>>,
    terminated: Mutex<Vec<u32>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeLauncher {
    pub fn new(outcomes: impl IntoIterator<Item = LaunchOutcome>) -> Self {
        Self {
            scripted: Mutex::new(outcomes.into_iter().collect()),
            terminated: Mutex::new(Vec::new()),
        }
    }

    pub fn terminated_pids(&self) -> Vec<u32> {
        self.terminated.lock().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl Launcher for FakeLauncher {
    async fn launch(&self, _bundle: &LauncherBundle) -> LaunchOutcome {
        self.scripted
            .lock()
            .pop_front()
            .unwrap_or(LaunchOutcome::Fatal(FatalLaunchError::GenericError))
    }

    async fn terminate(&self, pid: u32) -> Result<(), LauncherError> {
        self.terminated.lock().push(pid);
        Ok(())
    }
}

#[cfg(test)]
#[path = "launcher_tests.rs"]
mod tests;
