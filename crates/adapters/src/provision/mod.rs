// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote compute provisioning for cloud instances.
//!
//! A provisioner starts a machine that runs the worker agent for one
//! instance, forwards advisory job notifications to it, and terminates it.

mod k8s;

pub use k8s::{K8sConfig, KubernetesProvisioner};

use async_trait::async_trait;
use hf_core::{InstanceId, JobId};
use thiserror::Error;

/// Errors from provisioning operations
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("provisioner client error: {0}")]
    Client(String),
    #[error("provisioning failed: {0}")]
    Failed(String),
    #[error("machine not found: {0}")]
    NotFound(String),
}

/// Remote orchestration boundary for cloud instances.
#[async_trait]
pub trait Provisioner: Clone + Send + Sync + 'static {
    /// Start a machine for `instance`; returns the provider's machine handle.
    async fn provision(
        &self,
        instance: &InstanceId,
        instance_type: &str,
    ) -> Result<String, ProvisionError>;

    /// Tell the machine backing `instance` that `job` was queued. Advisory only.
    async fn notify_job(&self, machine: &str, job: &JobId) -> Result<(), ProvisionError>;

    /// Terminate a machine. `NotFound` means it is already gone.
    async fn terminate(&self, machine: &str) -> Result<(), ProvisionError>;
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProvisioner, ProvisionCall};
