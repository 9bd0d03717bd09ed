// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debug launcher: agents run as tokio tasks in the control process.

use super::slots::{AfterExit, AgentSlots};
use super::{BackendKind, Launcher};
use crate::base::ClusterContext;
use crate::error::ClusterError;
use crate::factory::AgentSettings;
use async_trait::async_trait;
use hf_agent::{Agent, AgentConfig, AgentExit};
use hf_core::InstanceId;
use std::path::PathBuf;
use std::time::Duration;

pub struct InProcessLauncher {
    hashcat_path: PathBuf,
    instance_types: Vec<String>,
    agent: AgentSettings,
    slots: AgentSlots,
}

impl InProcessLauncher {
    pub fn new(hashcat_path: impl Into<PathBuf>, instance_types: Vec<String>) -> Self {
        Self {
            hashcat_path: hashcat_path.into(),
            instance_types,
            agent: AgentSettings::default(),
            slots: AgentSlots::default(),
        }
    }

    pub fn with_agent_settings(mut self, agent: AgentSettings) -> Self {
        self.agent = agent;
        self
    }

    /// Whether an agent task currently serves `id`.
    pub fn is_live(&self, id: &InstanceId) -> bool {
        self.slots.is_live(id)
    }

    fn agent_config(&self, ctx: &ClusterContext, id: &InstanceId) -> AgentConfig {
        AgentConfig::new(id.clone(), ctx.storage_root())
            .hashcat_path(self.hashcat_path.clone())
            .tick(self.agent.tick)
            .idle_cooldown(self.agent.idle_cooldown)
            .watch(self.agent.watch)
    }
}

#[async_trait]
impl Launcher for InProcessLauncher {
    fn kind(&self) -> BackendKind {
        BackendKind::Debug
    }

    fn instance_types(&self) -> &[String] {
        &self.instance_types
    }

    async fn check_prerequisites(&self, _ctx: &ClusterContext) -> Result<(), ClusterError> {
        hf_adapters::resolve_binary(&self.hashcat_path)
            .map(|_| ())
            .map_err(|e| ClusterError::Prerequisite(e.to_string()))
    }

    async fn launch(&self, ctx: &ClusterContext, id: &InstanceId) -> Result<(), ClusterError> {
        if ctx.store().get_instance_metadata(id).is_unknown() {
            return Err(ClusterError::UnknownInstance(id.clone()));
        }
        let Some(cancel) = self.slots.claim(id) else {
            tracing::debug!(instance_id = %id, "agent already running");
            return Ok(());
        };

        let config = self.agent_config(ctx, id);
        let slots = self.slots.clone();
        let store = ctx.store().clone();
        let id = id.clone();
        tracing::info!(instance_id = %id, "starting in-process agent");

        tokio::spawn(async move {
            loop {
                let exit = Agent::new(config.clone()).run(cancel.clone()).await;
                let idle = match &exit {
                    Ok(AgentExit::Failed(reason)) => {
                        tracing::warn!(instance_id = %id, reason = %reason, "agent failed");
                        false
                    }
                    Ok(exit) => {
                        tracing::info!(instance_id = %id, exit = ?exit, "agent exited");
                        true
                    }
                    Err(e) => {
                        tracing::warn!(instance_id = %id, error = %e, "agent errored");
                        false
                    }
                };
                if slots.after_exit(&id, &store, idle) == AfterExit::Release {
                    break;
                }
                tracing::info!(instance_id = %id, "instance kicked during idle exit, restarting");
            }
        });
        Ok(())
    }

    async fn terminate(
        &self,
        _ctx: &ClusterContext,
        id: &InstanceId,
        _meta: &hf_core::InstanceMetadata,
    ) -> Result<(), ClusterError> {
        // The agent observes the Stopped record on its own; cancelling only
        // hurries it along when its watcher is slow.
        self.slots.cancel(id);
        Ok(())
    }

    async fn shutdown(&self) {
        self.slots.drain(Duration::from_secs(10)).await;
    }
}

#[cfg(test)]
#[path = "in_process_tests.rs"]
mod tests;
