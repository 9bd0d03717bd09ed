// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hf_core::{ClusterStatus, InstanceId, JobId, RuleId, WordlistId};
use serde::{Deserialize, Serialize};

/// Outcome of one item in a batch delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemResult {
    pub fn ok(id: impl Into<String>) -> Self {
        Self { id: id.into(), error: None }
    }

    pub fn failed(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self { id: id.into(), error: Some(error.into()) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Response from the daemon to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success
    Ok,

    /// Health check response
    Pong,

    /// Version handshake response
    Hello { version: String },

    /// Daemon is shutting down
    ShuttingDown,

    Status { status: ClusterStatus },

    InstanceCreated { instance: InstanceId },

    JobCreated { job: JobId },

    WordlistCreated { wordlist: WordlistId },

    RuleCreated { rule: RuleId },

    /// Per-item results of a batch delete, in request order
    Deleted { results: Vec<ItemResult> },

    /// The request failed
    Error {
        message: String,
        /// The caller asked for something invalid, as opposed to an
        /// infrastructure failure
        #[serde(default)]
        rejected: bool,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into(), rejected: false }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Response::Error { message: message.into(), rejected: true }
    }
}
