// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External launcher: workers are started and stopped outside the cluster
//! and pull jobs from their instance folder.

use super::{BackendKind, Launcher};
use crate::base::ClusterContext;
use crate::error::ClusterError;
use async_trait::async_trait;
use hf_core::InstanceId;

pub struct ExternalLauncher {
    instances: Vec<InstanceId>,
}

impl ExternalLauncher {
    pub fn new(instances: Vec<InstanceId>) -> Self {
        Self { instances }
    }
}

#[async_trait]
impl Launcher for ExternalLauncher {
    fn kind(&self) -> BackendKind {
        BackendKind::External
    }

    fn instance_types(&self) -> &[String] {
        &[]
    }

    fn manages_lifecycle(&self) -> bool {
        false
    }

    fn registered_instances(&self) -> &[InstanceId] {
        &self.instances
    }

    async fn check_prerequisites(&self, _ctx: &ClusterContext) -> Result<(), ClusterError> {
        match self.instances.iter().find(|id| !id.is_path_safe()) {
            Some(id) => Err(ClusterError::Prerequisite(format!("invalid instance id: {id}"))),
            None => Ok(()),
        }
    }

    async fn launch(&self, _ctx: &ClusterContext, _id: &InstanceId) -> Result<(), ClusterError> {
        Err(ClusterError::Unsupported { operation: "launchInstance", backend: "external" })
    }
}
