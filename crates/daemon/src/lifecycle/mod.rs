// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

mod startup;
pub use startup::startup;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hf_cluster::ClusterError;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::records::RecordError;

/// What a daemon process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Owns a cluster backend and answers the control API for it
    Cluster,
    /// Forwards the control API to a cluster daemon and reconciles its
    /// status into the system of record
    Control,
}

hf_core::simple_display! {
    Mode {
        Cluster => "cluster",
        Control => "control",
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cluster" => Ok(Mode::Cluster),
            "control" => Ok(Mode::Control),
            other => Err(format!("unknown daemon mode {other:?} (expected cluster or control)")),
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    /// Root state directory (e.g. ~/.local/state/hashfleet)
    pub state_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
}

impl Config {
    /// Load configuration for the given mode under the resolved state
    /// directory. A cluster daemon and a control daemon can share one.
    pub fn load(mode: Mode) -> Result<Self, LifecycleError> {
        Ok(Self::for_mode(&crate::env::state_dir()?, mode))
    }

    pub fn for_mode(state_dir: &Path, mode: Mode) -> Self {
        Self {
            mode,
            socket_path: state_dir.join(format!("{mode}.sock")),
            lock_path: state_dir.join(format!("{mode}.pid")),
            state_dir: state_dir.to_path_buf(),
        }
    }
}

/// Daemon state during operation.
///
/// The listener is returned separately from startup to be spawned as a
/// Listener task.
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

/// Result of daemon startup
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The Unix socket listener to spawn as a task
    pub listener: UnixListener,
}

impl DaemonState {
    /// Remove the socket and PID files. The lock is released when `self`
    /// drops.
    pub fn shutdown(self) {
        info!(mode = %self.config.mode, "shutting down daemon");

        for path in [&self.config.socket_path, &self.config.lock_path] {
            if path.exists() {
                if let Err(e) = std::fs::remove_file(path) {
                    warn!(path = %path.display(), error = %e, "failed to remove daemon file");
                }
            }
        }

        info!("daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cluster error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("Record error: {0}")]
    Records(#[from] RecordError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
