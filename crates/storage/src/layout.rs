// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Folder layout of the cluster root.
//!
//! ```text
//! {root}/{instance}/metadata.json
//! {root}/{instance}/jobs/{job}/metadata.json
//! {root}/{instance}/jobs/{job}/hashes.txt
//! {root}/{instance}/jobs/{job}/output.pot
//! ```

use hf_core::{InstanceId, JobId};
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";
pub const HASHES_FILE: &str = "hashes.txt";
pub const OUTPUT_FILE: &str = "output.pot";
const JOBS_DIR: &str = "jobs";
const CLUSTER_DIR: &str = "instances";

/// Cluster root inside a storage root: `{storage}/instances`.
pub fn cluster_root(storage_root: &Path) -> PathBuf {
    storage_root.join(CLUSTER_DIR)
}

/// Path arithmetic over a cluster root. Performs no IO.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn instance_dir(&self, id: &InstanceId) -> PathBuf {
        self.root.join(id.as_str())
    }

    pub fn instance_metadata(&self, id: &InstanceId) -> PathBuf {
        self.instance_dir(id).join(METADATA_FILE)
    }

    pub fn jobs_dir(&self, id: &InstanceId) -> PathBuf {
        self.instance_dir(id).join(JOBS_DIR)
    }

    pub fn job_dir(&self, instance: &InstanceId, job: &JobId) -> PathBuf {
        self.jobs_dir(instance).join(job.as_str())
    }

    pub fn job_metadata(&self, instance: &InstanceId, job: &JobId) -> PathBuf {
        self.job_dir(instance, job).join(METADATA_FILE)
    }

    pub fn job_paths(&self, instance: &InstanceId, job: &JobId) -> JobPaths {
        let dir = self.job_dir(instance, job);
        JobPaths { hashes: dir.join(HASHES_FILE), output: dir.join(OUTPUT_FILE), dir }
    }
}

/// Input and output files of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    pub dir: PathBuf,
    pub hashes: PathBuf,
    pub output: PathBuf,
}

/// Identify which record a path under `instance_dir` belongs to.
///
/// Returns `Some(None)` for the instance record, `Some(Some(job))` for a job
/// record one level below `jobs/`, and `None` for anything else.
pub(crate) fn record_for_path(instance_dir: &Path, path: &Path) -> Option<Option<JobId>> {
    let rel = path.strip_prefix(instance_dir).ok()?;
    let parts: Vec<_> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    match parts.as_slice() {
        [Some(METADATA_FILE)] => Some(None),
        [Some(JOBS_DIR), Some(job), Some(METADATA_FILE)] => Some(Some(JobId::from_string(*job))),
        _ => None,
    }
}
