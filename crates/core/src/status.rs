// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cluster status projection.
//!
//! Recomputed from the metadata store on every request; never persisted.

use crate::instance::{InstanceId, InstanceStatus};
use crate::job::{JobId, JobStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reported state of one job: status plus every cracked hash so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub status: JobStatus,
    /// hash → plaintext
    #[serde(default)]
    pub results: BTreeMap<String, String>,
}

/// Reported state of one instance and its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceReport {
    pub status: InstanceStatus,
    #[serde(default)]
    pub jobs: BTreeMap<JobId, JobReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStatus {
    #[serde(default)]
    pub instances: BTreeMap<InstanceId, InstanceReport>,
}

impl ClusterStatus {
    /// Status of an instance, `Unknown` when the cluster did not report it.
    pub fn instance_status(&self, id: &InstanceId) -> InstanceStatus {
        self.instances.get(id).map(|i| i.status).unwrap_or(InstanceStatus::Unknown)
    }

    /// Find a job by its globally unique ID.
    pub fn job(&self, id: &JobId) -> Option<&JobReport> {
        self.instances.values().find_map(|i| i.jobs.get(id))
    }

    /// Status of a job, `Unknown` when the cluster did not report it.
    pub fn job_status(&self, id: &JobId) -> JobStatus {
        self.job(id).map(|j| j.status).unwrap_or(JobStatus::Unknown)
    }

    /// Plaintext recovered for `hash` within `job`, if cracked.
    pub fn plaintext(&self, job: &JobId, hash: &str) -> Option<&str> {
        self.job(job).and_then(|j| j.results.get(hash)).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
