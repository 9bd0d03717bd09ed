// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend selection from configuration.

use crate::backend::ClusterBackend;
use crate::base::FsCluster;
use crate::error::ClusterError;
use crate::launcher::{
    BackendKind, CloudLauncher, ExternalLauncher, InProcessLauncher, ProcessLauncher,
};
use hf_adapters::{K8sConfig, KubernetesProvisioner};
use hf_core::InstanceId;
use hf_storage::WatchMode;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Agent loop tuning for locally launched agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSettings {
    pub tick: Duration,
    pub idle_cooldown: u32,
    pub watch: WatchMode,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            tick: hf_agent::DEFAULT_TICK,
            idle_cooldown: hf_agent::DEFAULT_IDLE_COOLDOWN,
            watch: WatchMode::Native,
        }
    }
}

/// Propagation wait before provisioning a cloud instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudSettings {
    pub visibility_attempts: u32,
    pub visibility_delay: Duration,
}

impl Default for CloudSettings {
    fn default() -> Self {
        Self { visibility_attempts: 10, visibility_delay: Duration::from_secs(1) }
    }
}

/// Everything needed to construct any backend.
#[derive(Debug, Clone)]
pub struct ClusterSettings {
    pub backend: BackendKind,
    pub storage_root: PathBuf,
    pub hashcat_path: PathBuf,
    /// `hf-agent` binary for the shared backend
    pub agent_path: PathBuf,
    pub instance_types: Vec<String>,
    /// Pre-registered instances for the external backend
    pub external_instances: Vec<InstanceId>,
    pub agent: AgentSettings,
    pub cloud: CloudSettings,
    /// Pod settings for the cloud backend
    pub k8s: Option<K8sConfig>,
}

impl ClusterSettings {
    pub fn new(backend: BackendKind, storage_root: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            storage_root: storage_root.into(),
            hashcat_path: PathBuf::from("hashcat"),
            agent_path: PathBuf::from("hf-agent"),
            instance_types: backend.default_instance_types(),
            external_instances: Vec::new(),
            agent: AgentSettings::default(),
            cloud: CloudSettings::default(),
            k8s: None,
        }
    }

    hf_core::setters! {
        into { hashcat_path: PathBuf, agent_path: PathBuf }
        set {
            instance_types: Vec<String>,
            external_instances: Vec<InstanceId>,
            agent: AgentSettings,
            cloud: CloudSettings,
        }
        option { k8s: K8sConfig }
    }
}

/// Construct the backend named by `settings.backend`.
///
/// Cloud clients are connected here so a bad configuration fails before
/// the backend is loaded.
pub async fn build(settings: ClusterSettings) -> Result<Arc<dyn ClusterBackend>, ClusterError> {
    let ClusterSettings { storage_root, hashcat_path, instance_types, agent, .. } = settings;
    let backend: Arc<dyn ClusterBackend> = match settings.backend {
        BackendKind::Debug => {
            let launcher =
                InProcessLauncher::new(hashcat_path, instance_types).with_agent_settings(agent);
            Arc::new(FsCluster::new(storage_root, launcher))
        }
        BackendKind::Shared => {
            let launcher = ProcessLauncher::new(settings.agent_path, hashcat_path, instance_types)
                .with_agent_settings(agent);
            Arc::new(FsCluster::new(storage_root, launcher))
        }
        BackendKind::Cloud => {
            let Some(k8s) = settings.k8s else {
                return Err(ClusterError::Prerequisite(
                    "cloud backend requires pod settings".to_string(),
                ));
            };
            let provisioner = KubernetesProvisioner::new(k8s).await?;
            let launcher = CloudLauncher::new(provisioner, instance_types, settings.cloud);
            Arc::new(FsCluster::new(storage_root, launcher))
        }
        BackendKind::External => {
            let launcher = ExternalLauncher::new(settings.external_instances);
            Arc::new(FsCluster::new(storage_root, launcher))
        }
    };
    Ok(backend)
}
