// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use anyhow::Result;
use hf_daemon::{Config, DaemonAddr, Mode};

/// Daemon to talk to: HF_DAEMON_ADDR > the local cluster daemon socket.
pub fn daemon_addr() -> Result<DaemonAddr> {
    match std::env::var("HF_DAEMON_ADDR") {
        Ok(s) if !s.trim().is_empty() => s.parse().map_err(anyhow::Error::msg),
        _ => {
            let state_dir = hf_daemon::env::state_dir()?;
            Ok(DaemonAddr::Unix(Config::for_mode(&state_dir, Mode::Cluster).socket_path))
        }
    }
}

pub fn auth_token() -> Option<String> {
    hf_daemon::env::auth_token()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
