// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, status, and persisted metadata record.

use crate::blob::{RuleId, WordlistId};
use crate::hash_type::HashType;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a cracking job.
    ///
    /// Globally unique across instances; doubles as the job folder name.
    pub struct JobId("job-");
}

/// Status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for the instance's agent to claim it
    Pending,
    /// Cracking binary is executing
    Running,
    /// Cracking binary exited 0
    Complete,
    /// Cancelled by a delete
    Stopped,
    /// Cracking binary exited nonzero or could not start
    Error,
    /// No metadata record exists
    Unknown,
}

impl JobStatus {
    /// Complete, Stopped and Error are final outcomes.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Stopped | JobStatus::Error)
    }

    /// Outcome for a finished cracking process.
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            JobStatus::Complete
        } else {
            JobStatus::Error
        }
    }
}

crate::simple_display! {
    JobStatus {
        Pending => "pending",
        Running => "running",
        Complete => "complete",
        Stopped => "stopped",
        Error => "error",
        Unknown => "unknown",
    }
}

/// Contents of `{root}/{instance}/jobs/{job}/metadata.json`.
///
/// Target hashes live next to it in `hashes.txt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub status: JobStatus,
    #[serde(rename = "hashType")]
    pub hash_type: HashType,
    pub wordlist: WordlistId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleId>,
}

impl JobMetadata {
    /// A freshly created job in `Pending`.
    pub fn new(hash_type: HashType, wordlist: WordlistId, rule: Option<RuleId>) -> Self {
        Self { status: JobStatus::Pending, hash_type, wordlist, rule }
    }

    /// The sentinel returned for a record that does not exist.
    pub fn unknown() -> Self {
        Self {
            status: JobStatus::Unknown,
            hash_type: HashType::default(),
            wordlist: WordlistId::from_string(""),
            rule: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.status == JobStatus::Unknown
    }

    /// Replace the status, keeping every other field.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }
}

/// Target hashes as a job stores them: trimmed, blank entries dropped.
pub fn normalize_hashes<S: AsRef<str>>(hashes: &[S]) -> Vec<String> {
    hashes
        .iter()
        .map(|h| h.as_ref().trim())
        .filter(|h| !h.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
