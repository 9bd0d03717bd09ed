// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use hf_adapters::K8sConfig;
use hf_cluster::{AgentSettings, BackendKind, CloudSettings, ClusterSettings};
use hf_core::InstanceId;

use crate::client::DaemonAddr;
use crate::lifecycle::{Config, LifecycleError, Mode};

/// Resolve state directory: HF_STATE_DIR > platform state dir > ~/.local/state
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("HF_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = dirs::state_dir() {
        return Ok(dir.join("hashfleet"));
    }
    let home = dirs::home_dir().ok_or(LifecycleError::NoStateDir)?;
    Ok(home.join(".local/state/hashfleet"))
}

/// `cluster` (default) serves a backend; `control` mirrors one into records.
pub fn mode() -> Result<Mode, LifecycleError> {
    match std::env::var("HF_DAEMON_MODE") {
        Ok(s) => s.parse().map_err(LifecycleError::Config),
        Err(_) => Ok(Mode::Cluster),
    }
}

/// Daily-rolling log files go here when set.
pub fn log_dir() -> Option<PathBuf> {
    std::env::var("HF_LOG_DIR").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    duration_ms("HF_IPC_TIMEOUT_MS").unwrap_or(Duration::from_secs(5))
}

/// TCP port for remote connections, in addition to the Unix socket.
pub fn tcp_port() -> Option<u16> {
    std::env::var("HF_TCP_PORT").ok().and_then(|s| s.parse::<u16>().ok())
}

/// Token TCP clients must present in `Hello`.
pub fn auth_token() -> Option<String> {
    std::env::var("HF_AUTH_TOKEN").ok().filter(|s| !s.is_empty())
}

pub fn storage_root(config: &Config) -> PathBuf {
    std::env::var("HF_STORAGE_ROOT")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| config.state_dir.join("storage"))
}

pub fn backend() -> Result<BackendKind, LifecycleError> {
    match std::env::var("HF_BACKEND") {
        Ok(s) => s.parse().map_err(LifecycleError::Config),
        Err(_) => Ok(BackendKind::Debug),
    }
}

pub fn hashcat_path() -> PathBuf {
    std::env::var("HF_HASHCAT_PATH").map(PathBuf::from).unwrap_or_else(|_| "hashcat".into())
}

/// `hf-agent` binary: HF_AGENT_PATH > next to this executable > `PATH`
pub fn agent_path() -> PathBuf {
    if let Ok(path) = std::env::var("HF_AGENT_PATH") {
        return PathBuf::from(path);
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("hf-agent")))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from("hf-agent"))
}

/// Comma-separated instance types (default depends on the backend).
pub fn instance_types(backend: BackendKind) -> Vec<String> {
    match std::env::var("HF_INSTANCE_TYPES") {
        Ok(s) => split_list(&s),
        Err(_) => backend.default_instance_types(),
    }
}

/// Comma-separated pre-registered instance IDs for the external backend.
pub fn external_instances() -> Vec<InstanceId> {
    std::env::var("HF_EXTERNAL_INSTANCES")
        .map(|s| split_list(&s).into_iter().map(InstanceId::from_string).collect())
        .unwrap_or_default()
}

pub fn cloud_settings() -> CloudSettings {
    let defaults = CloudSettings::default();
    CloudSettings {
        visibility_attempts: std::env::var("HF_CLOUD_VISIBILITY_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.visibility_attempts),
        visibility_delay: duration_ms("HF_CLOUD_VISIBILITY_DELAY_MS")
            .unwrap_or(defaults.visibility_delay),
    }
}

/// Pod settings for cloud agents.
pub fn k8s_config() -> K8sConfig {
    K8sConfig {
        namespace: var_or("HF_K8S_NAMESPACE", "hashfleet"),
        image: var_or("HF_K8S_IMAGE", "hashfleet/agent:latest"),
        storage_claim: std::env::var("HF_K8S_STORAGE_CLAIM").ok().filter(|s| !s.is_empty()),
        storage_root: PathBuf::from(var_or("HF_K8S_STORAGE_ROOT", "/storage")),
        hashcat_path: var_or("HF_K8S_HASHCAT_PATH", "hashcat"),
        agent_env: Vec::new(),
    }
}

/// Everything the cluster backend factory needs.
pub fn cluster_settings(config: &Config) -> Result<ClusterSettings, LifecycleError> {
    let backend = backend()?;
    let agent = AgentSettings {
        tick: hf_agent::env::tick(),
        idle_cooldown: hf_agent::env::idle_cooldown(),
        watch: hf_agent::env::watch_mode(),
    };
    let mut settings = ClusterSettings::new(backend, storage_root(config))
        .hashcat_path(hashcat_path())
        .agent_path(agent_path())
        .instance_types(instance_types(backend))
        .external_instances(external_instances())
        .agent(agent)
        .cloud(cloud_settings());
    if backend == BackendKind::Cloud {
        settings = settings.k8s(k8s_config());
    }
    Ok(settings)
}

/// JSON system of record for control mode.
pub fn records_path(config: &Config) -> PathBuf {
    std::env::var("HF_RECORDS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config.state_dir.join("records.json"))
}

pub fn reconcile_interval() -> Duration {
    duration_ms("HF_RECONCILE_INTERVAL_MS").unwrap_or(Duration::from_secs(5))
}

/// Cluster daemon address for control mode: a socket path or `host:port`.
pub fn cluster_addr(config: &Config) -> Result<DaemonAddr, LifecycleError> {
    match std::env::var("HF_CLUSTER_ADDR") {
        Ok(s) => s.parse().map_err(LifecycleError::Config),
        Err(_) => {
            let cluster = Config::for_mode(&config.state_dir, Mode::Cluster);
            Ok(DaemonAddr::Unix(cluster.socket_path))
        }
    }
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}

fn var_or(var: &str, default: &str) -> String {
    std::env::var(var).ok().filter(|s| !s.is_empty()).unwrap_or_else(|| default.to_string())
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
