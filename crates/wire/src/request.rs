// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hf_core::{InstanceId, JobId, RuleId, WordlistId};
use serde::{Deserialize, Serialize};

/// A job addressed through its owning instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRef {
    pub instance: InstanceId,
    pub job: JobId,
}

/// Request from a client to the daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Version handshake; TCP connections must open with it
    Hello {
        version: String,
        /// Shared token for TCP connections (ignored for Unix socket)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },

    /// Cluster status snapshot
    Status,

    CreateInstance { instance_type: String },

    DeleteInstance { instance: InstanceId },

    DeleteInstances { instances: Vec<InstanceId> },

    CreateJob {
        instance: InstanceId,
        /// Caller-chosen ID; generated when absent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        job: Option<JobId>,
        hash_type: String,
        wordlist: WordlistId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rule: Option<RuleId>,
        hashes: Vec<String>,
    },

    DeleteJob { instance: InstanceId, job: JobId },

    DeleteJobs { jobs: Vec<JobRef> },

    CreateWordlist {
        #[serde(with = "crate::bytes")]
        content: Vec<u8>,
    },

    DeleteWordlist { wordlist: WordlistId },

    CreateRule {
        #[serde(with = "crate::bytes")]
        content: Vec<u8>,
    },

    DeleteRule { rule: RuleId },

    /// Stop the daemon and every worker it supervises
    Shutdown,
}

impl Request {
    /// Read-only requests, logged at debug level.
    pub fn is_query(&self) -> bool {
        matches!(self, Request::Ping | Request::Hello { .. } | Request::Status)
    }

    /// Variant name for logs; payloads can hold tokens and blob content.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Ping => "Ping",
            Request::Hello { .. } => "Hello",
            Request::Status => "Status",
            Request::CreateInstance { .. } => "CreateInstance",
            Request::DeleteInstance { .. } => "DeleteInstance",
            Request::DeleteInstances { .. } => "DeleteInstances",
            Request::CreateJob { .. } => "CreateJob",
            Request::DeleteJob { .. } => "DeleteJob",
            Request::DeleteJobs { .. } => "DeleteJobs",
            Request::CreateWordlist { .. } => "CreateWordlist",
            Request::DeleteWordlist { .. } => "DeleteWordlist",
            Request::CreateRule { .. } => "CreateRule",
            Request::DeleteRule { .. } => "DeleteRule",
            Request::Shutdown => "Shutdown",
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
