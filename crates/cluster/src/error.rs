// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hf_adapters::{HashcatError, ProvisionError};
use hf_core::{HashTypeError, InstanceId, JobId, RuleId, WordlistId};
use hf_storage::StorageError;
use thiserror::Error;

/// Errors from cluster backend operations
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("unsupported instance type {instance_type:?} (allowed: {})", allowed.join(", "))]
    UnsupportedType { instance_type: String, allowed: Vec<String> },
    #[error("unknown instance: {0}")]
    UnknownInstance(InstanceId),
    #[error("instance {0} is stopped")]
    InstanceStopped(InstanceId),
    #[error("unknown job {job} on instance {instance}")]
    UnknownJob { instance: InstanceId, job: JobId },
    #[error("job {0} already exists")]
    JobExists(JobId),
    #[error("unknown wordlist: {0}")]
    UnknownWordlist(WordlistId),
    #[error("unknown rule: {0}")]
    UnknownRule(RuleId),
    #[error("job has no target hashes")]
    NoHashes,
    #[error(transparent)]
    HashType(#[from] HashTypeError),
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported { operation: &'static str, backend: &'static str },
    #[error("prerequisite missing: {0}")]
    Prerequisite(String),
    #[error("launch failed: {0}")]
    Launch(String),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    Hashcat(#[from] HashcatError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClusterError {
    /// Caller mistakes, as opposed to infrastructure failures.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            ClusterError::UnsupportedType { .. }
                | ClusterError::UnknownInstance(_)
                | ClusterError::InstanceStopped(_)
                | ClusterError::UnknownJob { .. }
                | ClusterError::JobExists(_)
                | ClusterError::UnknownWordlist(_)
                | ClusterError::UnknownRule(_)
                | ClusterError::NoHashes
                | ClusterError::HashType(_)
                | ClusterError::Unsupported { .. }
        )
    }
}
