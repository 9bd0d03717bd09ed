// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the worker agent.

use crate::config::{AgentConfig, DEFAULT_IDLE_COOLDOWN, DEFAULT_TICK};
use hf_core::InstanceId;
use hf_storage::WatchMode;
use std::path::PathBuf;
use std::time::Duration;

/// Instance this agent runs for (required).
pub fn instance_id() -> Option<InstanceId> {
    std::env::var("HF_INSTANCE_ID").ok().filter(|s| !s.is_empty()).map(InstanceId::from_string)
}

/// Storage root (required).
pub fn storage_root() -> Option<PathBuf> {
    std::env::var("HF_STORAGE_ROOT").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Cracking binary, looked up on `PATH` when not a path (default `hashcat`).
pub fn hashcat_path() -> PathBuf {
    std::env::var("HF_HASHCAT_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("hashcat"))
}

/// Tick interval (default 1s).
pub fn tick() -> Duration {
    std::env::var("HF_TICK_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TICK)
}

/// Idle ticks tolerated before the agent exits (default 60).
pub fn idle_cooldown() -> u32 {
    std::env::var("HF_IDLE_COOLDOWN")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_IDLE_COOLDOWN)
}

/// Change notification mode: `native` (default) or `poll`.
pub fn watch_mode() -> WatchMode {
    std::env::var("HF_WATCH").ok().and_then(|s| s.parse().ok()).unwrap_or(WatchMode::Native)
}

/// Assemble a config from the environment. `None` when a required variable
/// is missing.
pub fn config() -> Option<AgentConfig> {
    Some(
        AgentConfig::new(instance_id()?, storage_root()?)
            .hashcat_path(hashcat_path())
            .tick(tick())
            .idle_cooldown(idle_cooldown())
            .watch(watch_mode()),
    )
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
