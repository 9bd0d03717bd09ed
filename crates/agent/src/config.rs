// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hf_core::InstanceId;
use hf_storage::WatchMode;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);
pub const DEFAULT_IDLE_COOLDOWN: u32 = 60;

/// Everything an agent needs to run one instance.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub instance_id: InstanceId,
    /// Storage root holding `instances/`, `wordlists/` and `rules/`
    pub storage_root: PathBuf,
    pub hashcat_path: PathBuf,
    pub tick: Duration,
    /// Consecutive idle ticks tolerated before exiting
    pub idle_cooldown: u32,
    pub watch: WatchMode,
}

impl AgentConfig {
    pub fn new(instance_id: InstanceId, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            instance_id,
            storage_root: storage_root.into(),
            hashcat_path: PathBuf::from("hashcat"),
            tick: DEFAULT_TICK,
            idle_cooldown: DEFAULT_IDLE_COOLDOWN,
            watch: WatchMode::Native,
        }
    }

    hf_core::setters! {
        into { hashcat_path: PathBuf }
        set { tick: Duration, idle_cooldown: u32, watch: WatchMode }
    }
}
