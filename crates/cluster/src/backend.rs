// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cluster backend contract shared by every deployment mode.

use crate::error::ClusterError;
use crate::launcher::BackendKind;
use async_trait::async_trait;
use hf_core::{ClusterStatus, InstanceId, JobId, RuleId, WordlistId};

/// Parameters of a new cracking job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    /// Catalogue name or numeric hashcat mode
    pub hash_type: String,
    pub wordlist: WordlistId,
    pub rule: Option<RuleId>,
    /// Target hashes, one per entry
    pub hashes: Vec<String>,
}

impl JobRequest {
    pub fn new(hash_type: impl Into<String>, wordlist: WordlistId, hashes: Vec<String>) -> Self {
        Self { hash_type: hash_type.into(), wordlist, rule: None, hashes }
    }

    pub fn with_rule(mut self, rule: RuleId) -> Self {
        self.rule = Some(rule);
        self
    }
}

/// Instance, job and blob lifecycle for one deployment mode.
///
/// Mutations are idempotent on "already in target state": deleting a
/// stopped or never-created instance or job succeeds.
#[async_trait]
pub trait ClusterBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Instance types accepted by [`ClusterBackend::create_instance`].
    fn instance_types(&self) -> Vec<String>;

    /// Validate prerequisites and recover state left by a previous run.
    /// Never launches anything.
    async fn load(&self) -> Result<(), ClusterError>;

    /// Create an instance folder with a `Pending` record.
    async fn create_instance_folder(&self, instance_type: &str)
        -> Result<InstanceId, ClusterError>;

    async fn launch_instance(&self, id: &InstanceId) -> Result<(), ClusterError>;

    async fn create_instance(&self, instance_type: &str) -> Result<InstanceId, ClusterError> {
        let id = self.create_instance_folder(instance_type).await?;
        self.launch_instance(&id).await?;
        Ok(id)
    }

    async fn delete_instance(&self, id: &InstanceId) -> Result<(), ClusterError>;

    /// Delete every instance, reporting each outcome.
    async fn delete_instances(
        &self,
        ids: &[InstanceId],
    ) -> Vec<(InstanceId, Result<(), ClusterError>)> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            results.push((id.clone(), self.delete_instance(id).await));
        }
        results
    }

    async fn create_job(
        &self,
        instance: &InstanceId,
        request: JobRequest,
    ) -> Result<JobId, ClusterError> {
        let job = JobId::new();
        self.create_job_with_id(instance, &job, request).await?;
        Ok(job)
    }

    async fn create_job_with_id(
        &self,
        instance: &InstanceId,
        job: &JobId,
        request: JobRequest,
    ) -> Result<(), ClusterError>;

    async fn delete_job(&self, instance: &InstanceId, job: &JobId) -> Result<(), ClusterError>;

    /// Delete every job, reporting each outcome.
    async fn delete_jobs(
        &self,
        jobs: &[(InstanceId, JobId)],
    ) -> Vec<(JobId, Result<(), ClusterError>)> {
        let mut results = Vec::with_capacity(jobs.len());
        for (instance, job) in jobs {
            results.push((job.clone(), self.delete_job(instance, job).await));
        }
        results
    }

    async fn status(&self) -> Result<ClusterStatus, ClusterError>;

    async fn create_wordlist(&self, content: &[u8]) -> Result<WordlistId, ClusterError>;

    /// Fails with [`ClusterError::UnknownWordlist`] when nothing was stored.
    async fn delete_wordlist(&self, id: &WordlistId) -> Result<(), ClusterError>;

    async fn create_rule(&self, content: &[u8]) -> Result<RuleId, ClusterError>;

    async fn delete_rule(&self, id: &RuleId) -> Result<(), ClusterError>;

    /// Stop locally supervised workers.
    async fn shutdown(&self);
}
