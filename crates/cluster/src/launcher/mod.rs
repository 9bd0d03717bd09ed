// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch strategies: how an instance's worker agent comes to life.

mod cloud;
mod external;
mod in_process;
mod process;
mod slots;

pub use cloud::CloudLauncher;
pub use external::ExternalLauncher;
pub use in_process::InProcessLauncher;
pub use process::ProcessLauncher;

use crate::base::ClusterContext;
use crate::error::ClusterError;
use async_trait::async_trait;
use hf_core::{InstanceId, InstanceMetadata, JobId};
use std::fmt;
use std::str::FromStr;

/// Deployment mode selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Agents run as tasks inside the control process
    Debug,
    /// Agents run as local processes over a shared folder
    Shared,
    /// Agents run on provisioned remote machines
    Cloud,
    /// Agents are started by someone else and pull work
    External,
}

impl BackendKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Debug => "debug",
            BackendKind::Shared => "shared",
            BackendKind::Cloud => "cloud",
            BackendKind::External => "external",
        }
    }

    /// Instance types accepted when none are configured.
    pub fn default_instance_types(self) -> Vec<String> {
        let types: &[&str] = match self {
            BackendKind::Debug => &["debug", "cpu", "gpu"],
            _ => &["cpu", "gpu"],
        };
        types.iter().map(|t| t.to_string()).collect()
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(BackendKind::Debug),
            "shared" => Ok(BackendKind::Shared),
            "cloud" => Ok(BackendKind::Cloud),
            "external" => Ok(BackendKind::External),
            other => Err(format!(
                "unknown backend {other:?} (expected debug, shared, cloud or external)"
            )),
        }
    }
}

/// Strategy plugged into [`crate::FsCluster`].
///
/// The filesystem base owns every metadata write the control plane makes;
/// a launcher only starts and stops workers, and may record launch failures.
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    fn kind(&self) -> BackendKind;

    /// Instance types accepted by `createInstance`.
    fn instance_types(&self) -> &[String];

    /// Whether instances can be created and deleted through the backend.
    fn manages_lifecycle(&self) -> bool {
        true
    }

    /// Instance IDs that exist by configuration and get folders at load.
    fn registered_instances(&self) -> &[InstanceId] {
        &[]
    }

    async fn check_prerequisites(&self, ctx: &ClusterContext) -> Result<(), ClusterError>;

    /// Bring up the worker for an instance already marked for launch.
    async fn launch(&self, ctx: &ClusterContext, id: &InstanceId) -> Result<(), ClusterError>;

    /// Release whatever backs a stopped instance.
    async fn terminate(
        &self,
        _ctx: &ClusterContext,
        _id: &InstanceId,
        _meta: &InstanceMetadata,
    ) -> Result<(), ClusterError> {
        Ok(())
    }

    /// Advisory hook after a job is written. Failures are logged, never returned.
    async fn job_created(&self, _id: &InstanceId, _meta: &InstanceMetadata, _job: &JobId) {}

    /// Stop every worker this launcher started.
    async fn shutdown(&self) {}
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
