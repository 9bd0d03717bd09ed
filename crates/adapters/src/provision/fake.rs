// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{ProvisionError, Provisioner};
use async_trait::async_trait;
use hf_core::{InstanceId, JobId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Recorded provisioner call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionCall {
    Provision { instance: InstanceId, instance_type: String },
    /// A finished machine was removed so a fresh one could start
    Replace { machine: String },
    NotifyJob { machine: String, job: JobId },
    Terminate { machine: String },
}

#[derive(Default)]
struct FakeProvisionState {
    calls: Vec<ProvisionCall>,
    live: HashSet<String>,
    finished: HashSet<String>,
    provision_error: Option<String>,
    terminate_error: Option<String>,
}

/// In-memory provisioner recording every call.
///
/// Machines are named `fake-{instance}`; terminating an unknown machine
/// returns `NotFound`. A finished machine still exists under its name and is
/// replaced by the next `provision`.
#[derive(Clone, Default)]
pub struct FakeProvisioner {
    inner: Arc<Mutex<FakeProvisionState>>,
}

impl FakeProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later `provision` call fail with `message`.
    pub fn fail_provision(&self, message: impl Into<String>) {
        self.inner.lock().provision_error = Some(message.into());
    }

    /// Make every later `terminate` call fail with `message`.
    pub fn fail_terminate(&self, message: impl Into<String>) {
        self.inner.lock().terminate_error = Some(message.into());
    }

    /// Model the agent on `machine` exiting while the machine lingers.
    pub fn finish_machine(&self, machine: &str) {
        let mut state = self.inner.lock();
        if state.live.contains(machine) {
            state.finished.insert(machine.to_string());
        }
    }

    /// Live machines whose agent has not exited.
    pub fn is_running(&self, machine: &str) -> bool {
        let state = self.inner.lock();
        state.live.contains(machine) && !state.finished.contains(machine)
    }

    pub fn calls(&self) -> Vec<ProvisionCall> {
        self.inner.lock().calls.clone()
    }

    /// Machines provisioned and not yet terminated.
    pub fn live_machines(&self) -> Vec<String> {
        let mut live: Vec<_> = self.inner.lock().live.iter().cloned().collect();
        live.sort();
        live
    }

    pub fn machine_name(instance: &InstanceId) -> String {
        format!("fake-{instance}")
    }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
    async fn provision(
        &self,
        instance: &InstanceId,
        instance_type: &str,
    ) -> Result<String, ProvisionError> {
        let mut state = self.inner.lock();
        state.calls.push(ProvisionCall::Provision {
            instance: instance.clone(),
            instance_type: instance_type.to_string(),
        });
        if let Some(message) = &state.provision_error {
            return Err(ProvisionError::Failed(message.clone()));
        }
        let machine = Self::machine_name(instance);
        if state.finished.remove(&machine) {
            state.calls.push(ProvisionCall::Replace { machine: machine.clone() });
        }
        state.live.insert(machine.clone());
        Ok(machine)
    }

    async fn notify_job(&self, machine: &str, job: &JobId) -> Result<(), ProvisionError> {
        self.inner
            .lock()
            .calls
            .push(ProvisionCall::NotifyJob { machine: machine.to_string(), job: job.clone() });
        Ok(())
    }

    async fn terminate(&self, machine: &str) -> Result<(), ProvisionError> {
        let mut state = self.inner.lock();
        state.calls.push(ProvisionCall::Terminate { machine: machine.to_string() });
        if let Some(message) = &state.terminate_error {
            return Err(ProvisionError::Failed(message.clone()));
        }
        state.finished.remove(machine);
        if state.live.remove(machine) {
            Ok(())
        } else {
            Err(ProvisionError::NotFound(machine.to_string()))
        }
    }
}
