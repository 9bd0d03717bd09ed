// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker agent control loop.

use crate::config::AgentConfig;
use crate::queue::JobQueue;
use hf_adapters::{HashcatError, HashcatJob, HashcatProcess};
use hf_core::{InstanceId, InstanceStatus, JobId, JobMetadata, JobStatus};
use hf_storage::{Blobs, MetadataChange, MetadataStore, StorageError, Subscription};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Why the agent loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentExit {
    /// Instance was stopped
    Stopped,
    /// No work arrived within the idle cooldown
    Idle,
    /// Shut down from outside the cluster (signal or token)
    Cancelled,
    /// Instance is in error or has no record
    Failed(String),
}

/// The job currently executing.
struct Current {
    job: JobId,
    process: HashcatProcess,
}

pub struct Agent {
    config: AgentConfig,
    store: MetadataStore,
    blobs: Blobs,
    queue: JobQueue,
    current: Option<Current>,
    idle_ticks: u32,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        let store = MetadataStore::new(hf_storage::cluster_root(&config.storage_root));
        let blobs = Blobs::new(&config.storage_root);
        Self { config, store, blobs, queue: JobQueue::default(), current: None, idle_ticks: 0 }
    }

    fn instance(&self) -> &InstanceId {
        &self.config.instance_id
    }

    /// Run until the instance stops, errors, idles out, or `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<AgentExit, AgentError> {
        if let Some(exit) = self.claim_instance()? {
            return Ok(exit);
        }
        self.recover_jobs()?;

        let mut subscription: Option<Subscription> =
            Some(self.store.subscribe(self.instance(), self.config.watch)?);
        let mut ticker = tokio::time::interval(self.config.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            instance_id = %self.instance(),
            queued = self.queue.len(),
            "agent started"
        );

        loop {
            let exit = tokio::select! {
                _ = cancel.cancelled() => Some(self.shutdown()),
                change = recv(&mut subscription), if subscription.is_some() => match change {
                    Some(change) => self.handle_change(change),
                    None => {
                        tracing::warn!(
                            instance_id = %self.instance(),
                            "watcher closed; relying on ticks"
                        );
                        subscription = None;
                        None
                    }
                },
                _ = ticker.tick() => self.tick(),
            };
            if let Some(exit) = exit {
                tracing::info!(instance_id = %self.instance(), ?exit, "agent exiting");
                return Ok(exit);
            }
        }
    }

    /// Check the instance record before doing any work. `Pending` becomes
    /// `Running`; `Stopped`, `Error` and a missing record end the agent.
    pub(crate) fn claim_instance(&self) -> Result<Option<AgentExit>, AgentError> {
        let meta = self.store.get_instance_metadata(self.instance());
        match meta.status {
            InstanceStatus::Stopped => Ok(Some(AgentExit::Stopped)),
            InstanceStatus::Error => Ok(Some(AgentExit::Failed(
                meta.error.unwrap_or_else(|| "instance is in error".to_string()),
            ))),
            InstanceStatus::Unknown => {
                Ok(Some(AgentExit::Failed(format!("instance {} not found", self.instance()))))
            }
            InstanceStatus::Pending => {
                let running = meta.with_status(InstanceStatus::Running);
                self.store.write_instance_metadata(self.instance(), &running)?;
                tracing::info!(instance_id = %self.instance(), "instance running");
                Ok(None)
            }
            InstanceStatus::Running => Ok(None),
        }
    }

    /// Build the initial queue. Any job that did not finish cleanly is reset to
    /// `Pending`: a `Running` record left by a previous agent is never trusted.
    pub(crate) fn recover_jobs(&mut self) -> Result<(), AgentError> {
        for job in self.store.list_jobs(self.instance())? {
            let meta = self.store.get_job_metadata(self.instance(), &job);
            match meta.status {
                JobStatus::Complete | JobStatus::Stopped | JobStatus::Unknown => continue,
                JobStatus::Pending => {}
                JobStatus::Running | JobStatus::Error => {
                    tracing::info!(
                        instance_id = %self.instance(),
                        job_id = %job,
                        from = %meta.status,
                        "requeueing job"
                    );
                    let pending = meta.with_status(JobStatus::Pending);
                    self.store.write_job_metadata(self.instance(), &job, &pending)?;
                }
            }
            self.queue.push(job);
        }
        Ok(())
    }

    fn handle_change(&mut self, change: MetadataChange) -> Option<AgentExit> {
        match change {
            MetadataChange::Instance => {
                let meta = self.store.get_instance_metadata(self.instance());
                match meta.status {
                    InstanceStatus::Stopped => {
                        self.abort_current(JobStatus::Stopped);
                        Some(AgentExit::Stopped)
                    }
                    InstanceStatus::Error => {
                        self.abort_current(JobStatus::Stopped);
                        Some(AgentExit::Failed(
                            meta.error.unwrap_or_else(|| "instance is in error".to_string()),
                        ))
                    }
                    _ => None,
                }
            }
            MetadataChange::Job(job) => {
                let meta = self.store.get_job_metadata(self.instance(), &job);
                match meta.status {
                    JobStatus::Pending if !self.is_current(&job) => {
                        if self.queue.push(job.clone()) {
                            tracing::debug!(
                                instance_id = %self.instance(),
                                job_id = %job,
                                "job queued"
                            );
                        }
                    }
                    JobStatus::Stopped => {
                        if self.is_current(&job) {
                            self.kill_current();
                        } else if self.queue.remove(&job) {
                            tracing::info!(
                                instance_id = %self.instance(),
                                job_id = %job,
                                "dropped stopped job"
                            );
                        }
                    }
                    _ => {}
                }
                None
            }
        }
    }

    pub(crate) fn tick(&mut self) -> Option<AgentExit> {
        if self.current.is_some() {
            self.idle_ticks = 0;
            self.poll_current();
            return None;
        }

        if let Some(job) = self.next_pending() {
            self.idle_ticks = 0;
            self.start(job);
            return None;
        }

        // Catch jobs whose change notification was missed
        self.rescan();
        if !self.queue.is_empty() {
            return None;
        }

        self.idle_ticks += 1;
        if self.idle_ticks <= self.config.idle_cooldown {
            return None;
        }
        Some(self.release_instance())
    }

    fn is_current(&self, job: &JobId) -> bool {
        self.current.as_ref().is_some_and(|c| &c.job == job)
    }

    /// Pop until a job whose record is still `Pending` is found.
    fn next_pending(&mut self) -> Option<(JobId, JobMetadata)> {
        while let Some(job) = self.queue.pop() {
            let meta = self.store.get_job_metadata(self.instance(), &job);
            if meta.status == JobStatus::Pending {
                return Some((job, meta));
            }
            tracing::debug!(
                instance_id = %self.instance(),
                job_id = %job,
                status = %meta.status,
                "discarding dequeued job"
            );
        }
        None
    }

    fn rescan(&mut self) {
        let jobs = match self.store.list_jobs(self.instance()) {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(instance_id = %self.instance(), error = %e, "job rescan failed");
                return;
            }
        };
        for job in jobs {
            if self.store.get_job_metadata(self.instance(), &job).status == JobStatus::Pending {
                self.queue.push(job);
            }
        }
    }

    fn start(&mut self, (job, meta): (JobId, JobMetadata)) {
        let running = meta.clone().with_status(JobStatus::Running);
        if let Err(e) = self.store.write_job_metadata(self.instance(), &job, &running) {
            tracing::warn!(
                instance_id = %self.instance(),
                job_id = %job,
                error = %e,
                "failed to claim job"
            );
            return;
        }

        match self.spawn(&job, &meta) {
            Ok(process) => {
                tracing::info!(
                    instance_id = %self.instance(),
                    job_id = %job,
                    hash_type = %meta.hash_type,
                    pid = ?process.id(),
                    "job started"
                );
                self.current = Some(Current { job, process });
            }
            Err(e) => {
                tracing::warn!(
                    instance_id = %self.instance(),
                    job_id = %job,
                    error = %e,
                    "job failed to start"
                );
                self.finish(&job, JobStatus::Error);
            }
        }
    }

    fn spawn(&self, job: &JobId, meta: &JobMetadata) -> Result<HashcatProcess, HashcatError> {
        let paths = self.store.job_paths(self.instance(), job);
        let wordlist = self.blobs.wordlist_path(&meta.wordlist);
        let rule = meta.rule.as_ref().map(|r| self.blobs.rule_path(r));
        HashcatJob {
            hash_type: &meta.hash_type,
            hashes: &paths.hashes,
            output: &paths.output,
            wordlist: &wordlist,
            rule: rule.as_deref(),
        }
        .spawn(&self.config.hashcat_path)
    }

    /// Advance the running job: honour a stop that arrived without a
    /// notification, or record the outcome once the process has exited.
    fn poll_current(&mut self) {
        let Some(job) = self.current.as_ref().map(|c| c.job.clone()) else { return };

        if self.store.get_job_metadata(self.instance(), &job).status == JobStatus::Stopped {
            self.kill_current();
            return;
        }

        let polled = match self.current.as_mut() {
            Some(current) => current.process.try_exit_code(),
            None => return,
        };
        let status = match polled {
            Ok(None) => return,
            Ok(Some(code)) => {
                tracing::info!(
                    instance_id = %self.instance(),
                    job_id = %job,
                    exit_code = code,
                    "job exited"
                );
                JobStatus::from_exit_code(code)
            }
            Err(e) => {
                tracing::warn!(
                    instance_id = %self.instance(),
                    job_id = %job,
                    error = %e,
                    "lost cracking process"
                );
                JobStatus::Error
            }
        };
        self.current = None;
        self.finish(&job, status);
    }

    /// Record a final status unless the job was stopped meanwhile.
    fn finish(&self, job: &JobId, status: JobStatus) {
        let meta = self.store.get_job_metadata(self.instance(), job);
        if meta.status != JobStatus::Running {
            tracing::info!(
                instance_id = %self.instance(),
                job_id = %job,
                status = %meta.status,
                "keeping job status"
            );
            return;
        }
        match self.store.write_job_metadata(self.instance(), job, &meta.with_status(status)) {
            Ok(()) => tracing::info!(
                    instance_id = %self.instance(),
                    job_id = %job,
                    %status,
                    "job finished"
                ),
            Err(e) => {
                tracing::warn!(
                    instance_id = %self.instance(),
                    job_id = %job,
                    error = %e,
                    "failed to record job outcome"
                )
            }
        }
    }

    /// Kill the running process and forget it. Its record is left to whoever
    /// requested the stop.
    fn kill_current(&mut self) {
        let Some(mut current) = self.current.take() else { return };
        if let Err(e) = current.process.kill() {
            tracing::warn!(
                instance_id = %self.instance(),
                job_id = %current.job,
                error = %e,
                "failed to kill cracking process"
            );
        }
        tracing::info!(instance_id = %self.instance(), job_id = %current.job, "job killed");
    }

    /// Kill the running job and record `status` for it if it is still
    /// marked `Running`.
    fn abort_current(&mut self, status: JobStatus) {
        let Some(job) = self.current.as_ref().map(|c| c.job.clone()) else { return };
        self.kill_current();
        self.finish(&job, status);
    }

    /// Idle cooldown reached: hand the instance back as `Pending` so the next
    /// job kicks a fresh agent.
    fn release_instance(&self) -> AgentExit {
        let meta = self.store.get_instance_metadata(self.instance());
        match meta.status {
            InstanceStatus::Running => {
                let pending = meta.with_status(InstanceStatus::Pending);
                if let Err(e) = self.store.write_instance_metadata(self.instance(), &pending) {
                    tracing::warn!(
                        instance_id = %self.instance(),
                        error = %e,
                        "failed to release instance"
                    );
                }
                AgentExit::Idle
            }
            InstanceStatus::Stopped => AgentExit::Stopped,
            _ => AgentExit::Idle,
        }
    }

    /// External shutdown: requeue the running job and release the instance.
    fn shutdown(&mut self) -> AgentExit {
        self.abort_current(JobStatus::Pending);
        self.release_instance();
        AgentExit::Cancelled
    }
}

async fn recv(subscription: &mut Option<Subscription>) -> Option<MetadataChange> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
