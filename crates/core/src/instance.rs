// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance identifier, status, and persisted metadata record.

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a worker instance.
    ///
    /// Doubles as the instance folder name under the cluster root.
    pub struct InstanceId("ins-");
}

/// Lifecycle status of an instance.
///
/// `Unknown` is not a lifecycle state: it is what a read of a missing
/// metadata record produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Pending,
    Running,
    Stopped,
    Error,
    Unknown,
}

impl InstanceStatus {
    /// True for the sentinel produced by reading an absent record.
    pub fn is_unknown(self) -> bool {
        matches!(self, InstanceStatus::Unknown)
    }
}

crate::simple_display! {
    InstanceStatus {
        Pending => "pending",
        Running => "running",
        Stopped => "stopped",
        Error => "error",
        Unknown => "unknown",
    }
}

/// Contents of `{root}/{instance}/metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    pub status: InstanceStatus,
    /// Compute flavor tag
    #[serde(rename = "type", default)]
    pub instance_type: String,
    /// Cloud-provider handle for the machine backing this instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
    /// Human-readable reason for an `Error` status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstanceMetadata {
    /// A freshly created instance: `Pending`, no machine, no error.
    pub fn new(instance_type: impl Into<String>) -> Self {
        Self {
            status: InstanceStatus::Pending,
            instance_type: instance_type.into(),
            machine: None,
            error: None,
        }
    }

    /// The sentinel returned for a record that does not exist.
    pub fn unknown() -> Self {
        Self {
            status: InstanceStatus::Unknown,
            instance_type: String::new(),
            machine: None,
            error: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.status.is_unknown()
    }

    /// Replace the status, keeping every other field.
    pub fn with_status(mut self, status: InstanceStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark as `Error` with a recorded message.
    pub fn failed(mut self, message: impl Into<String>) -> Self {
        self.status = InstanceStatus::Error;
        self.error = Some(message.into());
        self
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
