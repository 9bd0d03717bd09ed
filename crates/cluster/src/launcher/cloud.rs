// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cloud launcher: each instance runs on a provisioned remote machine that
//! mounts the same storage.

use super::{BackendKind, Launcher};
use crate::base::ClusterContext;
use crate::error::ClusterError;
use crate::factory::CloudSettings;
use async_trait::async_trait;
use hf_adapters::{ProvisionError, Provisioner};
use hf_core::{InstanceId, InstanceMetadata, InstanceStatus, JobId};

pub struct CloudLauncher<P: Provisioner> {
    provisioner: P,
    instance_types: Vec<String>,
    settings: CloudSettings,
}

impl<P: Provisioner> CloudLauncher<P> {
    /// The provisioner must already be connected.
    pub fn new(provisioner: P, instance_types: Vec<String>, settings: CloudSettings) -> Self {
        Self { provisioner, instance_types, settings }
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    /// Poll until the instance record is readable through the shared mount.
    async fn wait_visible(
        &self,
        ctx: &ClusterContext,
        id: &InstanceId,
    ) -> Option<InstanceMetadata> {
        for attempt in 1..=self.settings.visibility_attempts {
            let meta = ctx.store().get_instance_metadata(id);
            if !meta.is_unknown() {
                return Some(meta);
            }
            tracing::debug!(instance_id = %id, attempt, "instance folder not visible yet");
            tokio::time::sleep(self.settings.visibility_delay).await;
        }
        None
    }

    fn record_failure(
        &self,
        ctx: &ClusterContext,
        id: &InstanceId,
        meta: InstanceMetadata,
        msg: &str,
    ) {
        tracing::warn!(instance_id = %id, error = %msg, "cloud launch failed");
        if let Err(e) = ctx.store().write_instance_metadata(id, &meta.failed(msg)) {
            tracing::warn!(instance_id = %id, error = %e, "failed to record launch error");
        }
    }
}

#[async_trait]
impl<P: Provisioner> Launcher for CloudLauncher<P> {
    fn kind(&self) -> BackendKind {
        BackendKind::Cloud
    }

    fn instance_types(&self) -> &[String] {
        &self.instance_types
    }

    async fn check_prerequisites(&self, _ctx: &ClusterContext) -> Result<(), ClusterError> {
        if self.settings.visibility_attempts == 0 {
            return Err(ClusterError::Prerequisite(
                "cloud visibility attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    async fn launch(&self, ctx: &ClusterContext, id: &InstanceId) -> Result<(), ClusterError> {
        let Some(meta) = self.wait_visible(ctx, id).await else {
            let msg = format!(
                "instance folder not visible after {} attempts",
                self.settings.visibility_attempts
            );
            let fallback = InstanceMetadata::new("");
            self.record_failure(ctx, id, fallback, &msg);
            return Err(ClusterError::Launch(msg));
        };

        match self.provisioner.provision(id, &meta.instance_type).await {
            Ok(machine) => {
                tracing::info!(instance_id = %id, machine = %machine, "instance provisioned");
                let mut running = meta.with_status(InstanceStatus::Running);
                running.machine = Some(machine);
                running.error = None;
                ctx.store().write_instance_metadata(id, &running)?;
                Ok(())
            }
            Err(e) => {
                self.record_failure(ctx, id, meta, &e.to_string());
                Err(e.into())
            }
        }
    }

    async fn terminate(
        &self,
        _ctx: &ClusterContext,
        id: &InstanceId,
        meta: &InstanceMetadata,
    ) -> Result<(), ClusterError> {
        let Some(machine) = &meta.machine else {
            tracing::debug!(instance_id = %id, "no machine to terminate");
            return Ok(());
        };
        match self.provisioner.terminate(machine).await {
            Ok(()) => {
                tracing::info!(instance_id = %id, machine = %machine, "machine terminated");
                Ok(())
            }
            Err(ProvisionError::NotFound(_)) => {
                tracing::debug!(instance_id = %id, machine = %machine, "machine already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn job_created(&self, id: &InstanceId, meta: &InstanceMetadata, job: &JobId) {
        let Some(machine) = &meta.machine else { return };
        if let Err(e) = self.provisioner.notify_job(machine, job).await {
            tracing::warn!(
                instance_id = %id,
                job_id = %job,
                error = %e,
                "job notification failed"
            );
        }
    }
}

#[cfg(test)]
#[path = "cloud_tests.rs"]
mod tests;
