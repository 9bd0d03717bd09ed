// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared-storage launcher: one local `hf-agent` process per live instance.

use super::slots::{AfterExit, AgentSlots};
use super::{BackendKind, Launcher};
use crate::base::ClusterContext;
use crate::error::ClusterError;
use crate::factory::AgentSettings;
use async_trait::async_trait;
use hf_core::{InstanceId, InstanceMetadata};
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

/// Grace period between SIGTERM and SIGKILL.
const TERM_GRACE: Duration = Duration::from_secs(5);

pub struct ProcessLauncher {
    agent_path: PathBuf,
    hashcat_path: PathBuf,
    instance_types: Vec<String>,
    agent: AgentSettings,
    slots: AgentSlots,
}

/// Everything needed to (re)spawn one agent process.
#[derive(Clone)]
struct AgentCommand {
    program: PathBuf,
    env: Vec<(&'static str, String)>,
}

impl AgentCommand {
    fn spawn(&self) -> std::io::Result<Child> {
        Command::new(&self.program)
            .envs(self.env.iter().map(|(k, v)| (*k, v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

impl ProcessLauncher {
    pub fn new(
        agent_path: impl Into<PathBuf>,
        hashcat_path: impl Into<PathBuf>,
        instance_types: Vec<String>,
    ) -> Self {
        Self {
            agent_path: agent_path.into(),
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

    pub fn is_live(&self, id: &InstanceId) -> bool {
        self.slots.is_live(id)
    }

    fn command(&self, storage_root: &Path, id: &InstanceId) -> AgentCommand {
        let env = vec![
            ("HF_INSTANCE_ID", id.to_string()),
            ("HF_STORAGE_ROOT", storage_root.display().to_string()),
            ("HF_HASHCAT_PATH", self.hashcat_path.display().to_string()),
            ("HF_TICK_MS", self.agent.tick.as_millis().to_string()),
            ("HF_IDLE_COOLDOWN", self.agent.idle_cooldown.to_string()),
            ("HF_WATCH", self.agent.watch.as_str().to_string()),
        ];
        AgentCommand { program: self.agent_path.clone(), env }
    }
}

#[async_trait]
impl Launcher for ProcessLauncher {
    fn kind(&self) -> BackendKind {
        BackendKind::Shared
    }

    fn instance_types(&self) -> &[String] {
        &self.instance_types
    }

    async fn check_prerequisites(&self, _ctx: &ClusterContext) -> Result<(), ClusterError> {
        for binary in [&self.agent_path, &self.hashcat_path] {
            hf_adapters::resolve_binary(binary)
                .map_err(|e| ClusterError::Prerequisite(e.to_string()))?;
        }
        Ok(())
    }

    async fn launch(&self, ctx: &ClusterContext, id: &InstanceId) -> Result<(), ClusterError> {
        if ctx.store().get_instance_metadata(id).is_unknown() {
            return Err(ClusterError::UnknownInstance(id.clone()));
        }
        let Some(cancel) = self.slots.claim(id) else {
            tracing::debug!(instance_id = %id, "agent process already running");
            return Ok(());
        };

        let command = self.command(ctx.storage_root(), id);
        let child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.slots.abandon(id);
                return Err(ClusterError::Launch(format!(
                    "failed to spawn {}: {e}",
                    command.program.display()
                )));
            }
        };
        tracing::info!(instance_id = %id, pid = ?child.id(), "started agent process");

        let slots = self.slots.clone();
        let store = ctx.store().clone();
        let id = id.clone();
        tokio::spawn(async move {
            let mut child = child;
            loop {
                let status = supervise(&mut child, &cancel).await;
                let idle = match &status {
                    Ok(status) => {
                        tracing::info!(instance_id = %id, %status, "agent process exited");
                        status.success()
                    }
                    Err(e) => {
                        tracing::warn!(instance_id = %id, error = %e, "lost agent process");
                        false
                    }
                };
                if slots.after_exit(&id, &store, idle) == AfterExit::Release {
                    break;
                }
                child = match command.spawn() {
                    Ok(child) => child,
                    Err(e) => {
                        tracing::warn!(instance_id = %id, error = %e, "agent respawn failed");
                        slots.abandon(&id);
                        break;
                    }
                };
                tracing::info!(instance_id = %id, "instance kicked during idle exit, respawned");
            }
        });
        Ok(())
    }

    async fn terminate(
        &self,
        _ctx: &ClusterContext,
        id: &InstanceId,
        _meta: &InstanceMetadata,
    ) -> Result<(), ClusterError> {
        self.slots.cancel(id);
        Ok(())
    }

    async fn shutdown(&self) {
        self.slots.drain(TERM_GRACE + Duration::from_secs(1)).await;
    }
}

/// Wait for the child, asking it to stop when `cancel` fires.
async fn supervise(child: &mut Child, cancel: &CancellationToken) -> std::io::Result<ExitStatus> {
    tokio::select! {
        status = child.wait() => status,
        _ = cancel.cancelled() => {
            terminate_child(child);
            match tokio::time::timeout(TERM_GRACE, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    tracing::warn!(pid = ?child.id(), "agent ignored SIGTERM, killing");
                    child.kill().await?;
                    child.wait().await
                }
            }
        }
    }
}

/// SIGTERM lets the agent requeue its running job before exiting.
fn terminate_child(child: &Child) {
    let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) else { return };
    if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGTERM) {
        tracing::debug!(pid, error = %e, "SIGTERM failed");
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
