// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metadata store over the shared folder tree.

use crate::atomic::write_atomic;
use crate::layout::{JobPaths, Layout};
use crate::watch::{Subscription, WatchMode};
use crate::StorageError;
use hf_core::{HashType, InstanceId, InstanceMetadata, JobId, JobMetadata, RuleId, WordlistId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Read/write/list primitives for instance and job records.
///
/// Reads of a missing or unreadable record return the `Unknown` sentinel
/// rather than an error. Every write replaces the whole file.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    layout: Layout,
}

impl MetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { layout: Layout::new(root) }
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Create the cluster root folder. Idempotent.
    pub fn create_cluster_root(&self) -> Result<(), StorageError> {
        create_dir(self.root())
    }

    /// Create the folder for `id` and, if no record exists yet, a `Pending`
    /// record of the given type. Idempotent.
    pub fn create_instance(
        &self,
        id: &InstanceId,
        instance_type: &str,
    ) -> Result<(), StorageError> {
        check_id(id.as_str(), id.is_path_safe())?;
        create_dir(&self.layout.jobs_dir(id))?;
        if !self.layout.instance_metadata(id).exists() {
            self.write_instance_metadata(id, &InstanceMetadata::new(instance_type))?;
        }
        Ok(())
    }

    pub fn get_instance_metadata(&self, id: &InstanceId) -> InstanceMetadata {
        if !id.is_path_safe() {
            return InstanceMetadata::unknown();
        }
        read_record(&self.layout.instance_metadata(id)).unwrap_or_else(InstanceMetadata::unknown)
    }

    /// Replace the instance record, creating the folder if needed.
    pub fn write_instance_metadata(
        &self,
        id: &InstanceId,
        metadata: &InstanceMetadata,
    ) -> Result<(), StorageError> {
        check_id(id.as_str(), id.is_path_safe())?;
        create_dir(&self.layout.instance_dir(id))?;
        write_record(&self.layout.instance_metadata(id), metadata)
    }

    /// Every instance folder under the root, sorted by ID. A missing root
    /// lists nothing.
    pub fn list_instances(&self) -> Result<Vec<InstanceId>, StorageError> {
        let mut ids: Vec<_> =
            list_dirs(self.root())?.into_iter().map(InstanceId::from_string).collect();
        ids.sort();
        Ok(ids)
    }

    /// Create a job folder holding its target hashes and a `Pending` record.
    ///
    /// Hashes are written before the record so that a watcher reacting to the
    /// record always finds its input.
    pub fn create_job(
        &self,
        instance: &InstanceId,
        job: &JobId,
        hash_type: HashType,
        wordlist: WordlistId,
        rule: Option<RuleId>,
        hashes: &[String],
    ) -> Result<(), StorageError> {
        check_id(instance.as_str(), instance.is_path_safe())?;
        check_id(job.as_str(), job.is_path_safe())?;
        let paths = self.layout.job_paths(instance, job);
        create_dir(&paths.dir)?;

        let mut body = hashes.join("\n");
        body.push('\n');
        write_atomic(&paths.hashes, body.as_bytes())?;
        self.write_job_metadata(instance, job, &JobMetadata::new(hash_type, wordlist, rule))
    }

    pub fn get_job_metadata(&self, instance: &InstanceId, job: &JobId) -> JobMetadata {
        if !instance.is_path_safe() || !job.is_path_safe() {
            return JobMetadata::unknown();
        }
        read_record(&self.layout.job_metadata(instance, job)).unwrap_or_else(JobMetadata::unknown)
    }

    pub fn write_job_metadata(
        &self,
        instance: &InstanceId,
        job: &JobId,
        metadata: &JobMetadata,
    ) -> Result<(), StorageError> {
        check_id(instance.as_str(), instance.is_path_safe())?;
        check_id(job.as_str(), job.is_path_safe())?;
        write_record(&self.layout.job_metadata(instance, job), metadata)
    }

    /// Every job folder of `instance`, oldest first.
    ///
    /// Creation order is approximated by the modification time of
    /// `hashes.txt`, which is written once, with the ID as a tie-breaker.
    pub fn list_jobs(&self, instance: &InstanceId) -> Result<Vec<JobId>, StorageError> {
        if !instance.is_path_safe() {
            return Ok(Vec::new());
        }
        let mut entries: Vec<_> = list_dirs(&self.layout.jobs_dir(instance))?
            .into_iter()
            .map(|name| {
                let job = JobId::from_string(name);
                let created = modified(&self.layout.job_paths(instance, &job).hashes);
                (created, job)
            })
            .collect();
        entries.sort();
        Ok(entries.into_iter().map(|(_, job)| job).collect())
    }

    /// Target hashes of a job, one per line, blank lines skipped.
    pub fn read_hashes(
        &self,
        instance: &InstanceId,
        job: &JobId,
    ) -> Result<Vec<String>, StorageError> {
        let path = self.layout.job_paths(instance, job).hashes;
        let body = std::fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        Ok(body.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
    }

    pub fn job_paths(&self, instance: &InstanceId, job: &JobId) -> JobPaths {
        self.layout.job_paths(instance, job)
    }

    /// Subscribe to record changes under one instance's folder.
    pub fn subscribe(
        &self,
        instance: &InstanceId,
        mode: WatchMode,
    ) -> Result<Subscription, StorageError> {
        check_id(instance.as_str(), instance.is_path_safe())?;
        Subscription::start(self.layout.instance_dir(instance), mode)
    }
}

fn check_id(id: &str, safe: bool) -> Result<(), StorageError> {
    if safe {
        Ok(())
    } else {
        Err(StorageError::InvalidId(id.to_string()))
    }
}

fn create_dir(path: &Path) -> Result<(), StorageError> {
    std::fs::create_dir_all(path).map_err(|e| StorageError::io(path, e))
}

fn write_record<T: Serialize>(path: &Path, record: &T) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(record)?;
    write_atomic(path, &json)
}

/// Read a JSON record. Missing files are silent misses; anything else that
/// prevents reading is logged and also treated as a miss.
fn read_record<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read record");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt record");
            None
        }
    }
}

fn modified(path: &Path) -> SystemTime {
    std::fs::metadata(path).and_then(|m| m.modified()).unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Names of the subfolders of `dir` that are valid IDs.
fn list_dirs(dir: &Path) -> Result<Vec<String>, StorageError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::io(dir, e)),
    };

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(dir, e))?;
        if !entry.file_type().is_ok_and(|t| t.is_dir()) {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else { continue };
        if !hf_core::id::is_path_component(&name) {
            continue;
        }
        out.push(name);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
