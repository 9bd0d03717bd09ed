// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System of record for the control plane.
//!
//! Tracks the instances and jobs created through a control daemon, and the
//! plaintext of every hash the cluster has cracked. Only reconciliation
//! records found hashes.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hf_core::{normalize_hashes, InstanceId, InstanceStatus, JobId, JobStatus};
use hf_storage::StorageError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt records: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub status: InstanceStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashRecord {
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plaintext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found_at: Option<DateTime<Utc>>,
}

impl HashRecord {
    pub fn is_found(&self) -> bool {
        self.plaintext.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub instance: InstanceId,
    pub status: JobStatus,
    /// Target hashes in submission order
    pub hashes: Vec<HashRecord>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Records {
    #[serde(default)]
    pub instances: BTreeMap<InstanceId, InstanceRecord>,
    #[serde(default)]
    pub jobs: BTreeMap<JobId, JobRecord>,
}

/// One change observed by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordUpdate {
    InstanceStatus { instance: InstanceId, status: InstanceStatus },
    JobStatus { job: JobId, status: JobStatus },
    HashFound { job: JobId, hash: String, plaintext: String },
}

impl Records {
    /// Start tracking an instance as `Pending`. Existing records are kept.
    pub fn track_instance(&mut self, id: &InstanceId, now: DateTime<Utc>) {
        self.instances
            .entry(id.clone())
            .or_insert(InstanceRecord { status: InstanceStatus::Pending, updated_at: now });
    }

    /// Start tracking a job as `Pending` with none of its hashes found.
    pub fn track_job(
        &mut self,
        instance: &InstanceId,
        job: &JobId,
        hashes: &[String],
        now: DateTime<Utc>,
    ) {
        self.jobs.entry(job.clone()).or_insert_with(|| JobRecord {
            instance: instance.clone(),
            status: JobStatus::Pending,
            hashes: normalize_hashes(hashes)
                .into_iter()
                .map(|hash| HashRecord { hash, plaintext: None, found_at: None })
                .collect(),
            updated_at: now,
        });
    }

    /// Apply one update. Returns false when it names nothing tracked.
    pub fn apply(&mut self, update: &RecordUpdate, now: DateTime<Utc>) -> bool {
        match update {
            RecordUpdate::InstanceStatus { instance, status } => {
                let Some(record) = self.instances.get_mut(instance) else { return false };
                record.status = *status;
                record.updated_at = now;
            }
            RecordUpdate::JobStatus { job, status } => {
                let Some(record) = self.jobs.get_mut(job) else { return false };
                record.status = *status;
                record.updated_at = now;
            }
            RecordUpdate::HashFound { job, hash, plaintext } => {
                let Some(record) = self.jobs.get_mut(job) else { return false };
                let Some(entry) = record.hashes.iter_mut().find(|h| &h.hash == hash) else {
                    return false;
                };
                entry.plaintext = Some(plaintext.clone());
                entry.found_at = Some(now);
                record.updated_at = now;
            }
        }
        true
    }
}

/// Storage for the control plane's records.
pub trait RecordStore: Send + Sync + 'static {
    /// Snapshot of everything tracked.
    fn tracked(&self) -> Result<Records, RecordError>;

    fn apply(&self, updates: &[RecordUpdate]) -> Result<(), RecordError>;

    fn track_instance(&self, id: &InstanceId) -> Result<(), RecordError>;

    fn track_job(
        &self,
        instance: &InstanceId,
        job: &JobId,
        hashes: &[String],
    ) -> Result<(), RecordError>;
}

/// Records kept in one JSON file, rewritten atomically on every change.
pub struct FileRecordStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Records, RecordError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Records::default()),
            Err(source) => Err(RecordError::Io { path: self.path.clone(), source }),
        }
    }

    fn save(&self, records: &Records) -> Result<(), RecordError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| RecordError::Io { path: parent.to_path_buf(), source })?;
        }
        let json = serde_json::to_vec_pretty(records)?;
        hf_storage::write_atomic(&self.path, &json)?;
        Ok(())
    }

    fn modify(&self, f: impl FnOnce(&mut Records)) -> Result<(), RecordError> {
        let _guard = self.lock.lock();
        let mut records = self.load()?;
        f(&mut records);
        self.save(&records)
    }
}

impl RecordStore for FileRecordStore {
    fn tracked(&self) -> Result<Records, RecordError> {
        let _guard = self.lock.lock();
        self.load()
    }

    fn apply(&self, updates: &[RecordUpdate]) -> Result<(), RecordError> {
        if updates.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        self.modify(|records| {
            for update in updates {
                if !records.apply(update, now) {
                    tracing::debug!(?update, "update for untracked record");
                }
            }
        })
    }

    fn track_instance(&self, id: &InstanceId) -> Result<(), RecordError> {
        self.modify(|records| records.track_instance(id, Utc::now()))
    }

    fn track_job(
        &self,
        instance: &InstanceId,
        job: &JobId,
        hashes: &[String],
    ) -> Result<(), RecordError> {
        self.modify(|records| records.track_job(instance, job, hashes, Utc::now()))
    }
}

#[cfg(test)]
#[path = "records_tests.rs"]
mod tests;
