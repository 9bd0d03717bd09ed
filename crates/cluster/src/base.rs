// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed cluster shared by every deployment mode.

use crate::backend::{ClusterBackend, JobRequest};
use crate::error::ClusterError;
use crate::launcher::{BackendKind, Launcher};
use crate::status::project_status;
use async_trait::async_trait;
use hf_core::{
    normalize_hashes, ClusterStatus, HashType, InstanceId, InstanceMetadata, InstanceStatus, JobId,
    JobStatus, RuleId, WordlistId,
};
use hf_storage::{Blobs, MetadataStore};
use std::path::{Path, PathBuf};

/// Instance type recorded for pre-registered external instances.
const EXTERNAL_TYPE: &str = "external";

/// Storage handles shared by the base and its launcher.
#[derive(Debug, Clone)]
pub struct ClusterContext {
    storage_root: PathBuf,
    store: MetadataStore,
    blobs: Blobs,
}

impl ClusterContext {
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        let storage_root = storage_root.into();
        let store = MetadataStore::new(hf_storage::cluster_root(&storage_root));
        let blobs = Blobs::new(&storage_root);
        Self { storage_root, store, blobs }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn blobs(&self) -> &Blobs {
        &self.blobs
    }
}

/// A [`ClusterBackend`] over the shared metadata tree, launching workers
/// through `L`.
pub struct FsCluster<L: Launcher> {
    ctx: ClusterContext,
    launcher: L,
}

impl<L: Launcher> FsCluster<L> {
    pub fn new(storage_root: impl Into<PathBuf>, launcher: L) -> Self {
        Self { ctx: ClusterContext::new(storage_root), launcher }
    }

    pub fn context(&self) -> &ClusterContext {
        &self.ctx
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    fn require_lifecycle(&self, operation: &'static str) -> Result<(), ClusterError> {
        if self.launcher.manages_lifecycle() {
            Ok(())
        } else {
            Err(ClusterError::Unsupported { operation, backend: self.launcher.kind().as_str() })
        }
    }

    fn check_type(&self, instance_type: &str) -> Result<(), ClusterError> {
        let allowed = self.launcher.instance_types();
        if allowed.iter().any(|t| t == instance_type) {
            Ok(())
        } else {
            Err(ClusterError::UnsupportedType {
                instance_type: instance_type.to_string(),
                allowed: allowed.to_vec(),
            })
        }
    }

    /// Mark the instance Running and hand it to the launcher.
    ///
    /// A launch failure is recorded on the instance before it is returned.
    async fn start(&self, id: &InstanceId, meta: InstanceMetadata) -> Result<(), ClusterError> {
        let mut running = meta.with_status(InstanceStatus::Running);
        running.error = None;
        self.ctx.store.write_instance_metadata(id, &running)?;
        tracing::info!(instance_id = %id, backend = %self.launcher.kind(), "launching instance");

        if let Err(e) = self.launcher.launch(&self.ctx, id).await {
            let current = self.ctx.store.get_instance_metadata(id);
            if current.status != InstanceStatus::Error {
                let failed = current.failed(e.to_string());
                if let Err(write) = self.ctx.store.write_instance_metadata(id, &failed) {
                    tracing::warn!(instance_id = %id, error = %write, "failed to record error");
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn stop_jobs(&self, id: &InstanceId) -> Result<(), ClusterError> {
        for job in self.ctx.store.list_jobs(id)? {
            let meta = self.ctx.store.get_job_metadata(id, &job);
            if meta.is_unknown() || meta.status.is_terminal() {
                continue;
            }
            let stopped = meta.with_status(JobStatus::Stopped);
            if let Err(e) = self.ctx.store.write_job_metadata(id, &job, &stopped) {
                tracing::warn!(instance_id = %id, job_id = %job, error = %e, "failed to stop job");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<L: Launcher> ClusterBackend for FsCluster<L> {
    fn kind(&self) -> BackendKind {
        self.launcher.kind()
    }

    fn instance_types(&self) -> Vec<String> {
        self.launcher.instance_types().to_vec()
    }

    async fn load(&self) -> Result<(), ClusterError> {
        self.ctx.store.create_cluster_root()?;
        self.launcher.check_prerequisites(&self.ctx).await?;

        for id in self.launcher.registered_instances() {
            self.ctx.store.create_instance(id, EXTERNAL_TYPE)?;
        }

        let mut reset = 0usize;
        for id in self.ctx.store.list_instances()? {
            let meta = self.ctx.store.get_instance_metadata(&id);
            match meta.status {
                InstanceStatus::Stopped | InstanceStatus::Pending | InstanceStatus::Unknown => {}
                InstanceStatus::Running | InstanceStatus::Error => {
                    let pending = meta.with_status(InstanceStatus::Pending);
                    self.ctx.store.write_instance_metadata(&id, &pending)?;
                    reset += 1;
                }
            }
        }
        tracing::info!(backend = %self.launcher.kind(), reset, "cluster loaded");
        Ok(())
    }

    async fn create_instance_folder(
        &self,
        instance_type: &str,
    ) -> Result<InstanceId, ClusterError> {
        self.require_lifecycle("createInstance")?;
        self.check_type(instance_type)?;
        let id = InstanceId::new();
        self.ctx.store.create_instance(&id, instance_type)?;
        tracing::info!(instance_id = %id, instance_type, "instance folder created");
        Ok(id)
    }

    async fn launch_instance(&self, id: &InstanceId) -> Result<(), ClusterError> {
        self.require_lifecycle("launchInstance")?;
        let meta = self.ctx.store.get_instance_metadata(id);
        match meta.status {
            InstanceStatus::Stopped => Err(ClusterError::InstanceStopped(id.clone())),
            // The folder may not be visible yet; the launcher decides how long to wait.
            InstanceStatus::Unknown => self.launcher.launch(&self.ctx, id).await,
            _ => self.start(id, meta).await,
        }
    }

    async fn delete_instance(&self, id: &InstanceId) -> Result<(), ClusterError> {
        self.require_lifecycle("deleteInstance")?;
        let meta = self.ctx.store.get_instance_metadata(id);
        if meta.is_unknown() {
            tracing::debug!(instance_id = %id, "delete of unknown instance");
            return Ok(());
        }

        if meta.status != InstanceStatus::Stopped {
            let stopped = meta.clone().with_status(InstanceStatus::Stopped);
            self.ctx.store.write_instance_metadata(id, &stopped)?;
            tracing::info!(instance_id = %id, "instance stopped");
        }
        self.stop_jobs(id)?;

        if let Err(e) = self.launcher.terminate(&self.ctx, id, &meta).await {
            tracing::warn!(instance_id = %id, error = %e, "failed to release instance worker");
        }
        Ok(())
    }

    async fn create_job_with_id(
        &self,
        instance: &InstanceId,
        job: &JobId,
        request: JobRequest,
    ) -> Result<(), ClusterError> {
        let meta = self.ctx.store.get_instance_metadata(instance);
        match meta.status {
            InstanceStatus::Unknown => return Err(ClusterError::UnknownInstance(instance.clone())),
            InstanceStatus::Stopped => return Err(ClusterError::InstanceStopped(instance.clone())),
            _ => {}
        }

        let hash_type = HashType::parse(&request.hash_type)?;
        let hashes = normalize_hashes(&request.hashes);
        if hashes.is_empty() {
            return Err(ClusterError::NoHashes);
        }
        if !self.ctx.blobs.wordlist_exists(&request.wordlist) {
            return Err(ClusterError::UnknownWordlist(request.wordlist));
        }
        if let Some(rule) = &request.rule {
            if !self.ctx.blobs.rule_exists(rule) {
                return Err(ClusterError::UnknownRule(rule.clone()));
            }
        }
        if !self.ctx.store.get_job_metadata(instance, job).is_unknown() {
            return Err(ClusterError::JobExists(job.clone()));
        }

        self.ctx.store.create_job(
            instance,
            job,
            hash_type,
            request.wordlist,
            request.rule,
            &hashes,
        )?;
        tracing::info!(
            instance_id = %instance,
            job_id = %job,
            hashes = hashes.len(),
            "job created"
        );

        if meta.status == InstanceStatus::Pending && self.launcher.manages_lifecycle() {
            // The job is durable; a failed kick is visible as instance Error.
            if let Err(e) = self.start(instance, meta).await {
                tracing::warn!(instance_id = %instance, error = %e, "failed to kick instance");
            }
        }

        let current = self.ctx.store.get_instance_metadata(instance);
        self.launcher.job_created(instance, &current, job).await;
        Ok(())
    }

    async fn delete_job(&self, instance: &InstanceId, job: &JobId) -> Result<(), ClusterError> {
        let meta = self.ctx.store.get_job_metadata(instance, job);
        if meta.is_unknown() || meta.status.is_terminal() {
            tracing::debug!(job_id = %job, status = %meta.status, "delete of settled job");
            return Ok(());
        }
        self.ctx.store.write_job_metadata(instance, job, &meta.with_status(JobStatus::Stopped))?;
        tracing::info!(instance_id = %instance, job_id = %job, "job stopped");
        Ok(())
    }

    async fn status(&self) -> Result<ClusterStatus, ClusterError> {
        Ok(project_status(&self.ctx.store)?)
    }

    async fn create_wordlist(&self, content: &[u8]) -> Result<WordlistId, ClusterError> {
        let id = self.ctx.blobs.create_wordlist(content)?;
        tracing::info!(wordlist = %id, bytes = content.len(), "wordlist stored");
        Ok(id)
    }

    async fn delete_wordlist(&self, id: &WordlistId) -> Result<(), ClusterError> {
        if self.ctx.blobs.delete_wordlist(id)? {
            Ok(())
        } else {
            Err(ClusterError::UnknownWordlist(id.clone()))
        }
    }

    async fn create_rule(&self, content: &[u8]) -> Result<RuleId, ClusterError> {
        let id = self.ctx.blobs.create_rule(content)?;
        tracing::info!(rule = %id, bytes = content.len(), "rule stored");
        Ok(id)
    }

    async fn delete_rule(&self, id: &RuleId) -> Result<(), ClusterError> {
        if self.ctx.blobs.delete_rule(id)? {
            Ok(())
        } else {
            Err(ClusterError::UnknownRule(id.clone()))
        }
    }

    async fn shutdown(&self) {
        self.launcher.shutdown().await;
    }
}

#[cfg(test)]
#[path = "base_tests.rs"]
mod tests;
