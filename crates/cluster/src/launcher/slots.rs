// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping for locally supervised agents.
//!
//! At most one agent per instance. A kick that lands while an agent is
//! idling out is resolved under the same lock that releases the slot: the
//! supervisor either sees the instance Running and restarts, or the next
//! launch finds the slot empty and starts a fresh agent.

use hf_core::{InstanceId, InstanceStatus};
use hf_storage::MetadataStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a supervisor should do after its agent exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AfterExit {
    Restart,
    Release,
}

#[derive(Clone, Default)]
pub(crate) struct AgentSlots {
    inner: Arc<Mutex<HashMap<InstanceId, CancellationToken>>>,
}

impl AgentSlots {
    /// Reserve the slot for `id`. `None` when an agent already holds it.
    pub(crate) fn claim(&self, id: &InstanceId) -> Option<CancellationToken> {
        let mut slots = self.inner.lock();
        if slots.contains_key(id) {
            return None;
        }
        let token = CancellationToken::new();
        slots.insert(id.clone(), token.clone());
        Some(token)
    }

    /// Drop a reservation whose agent never started.
    pub(crate) fn abandon(&self, id: &InstanceId) {
        self.inner.lock().remove(id);
    }

    /// Decide, under the slot lock, whether an exited agent restarts.
    ///
    /// `idle` is true when the agent left on its own without failing. A
    /// Running record at that point means a job arrived after the agent
    /// released the instance.
    pub(crate) fn after_exit(
        &self,
        id: &InstanceId,
        store: &MetadataStore,
        idle: bool,
    ) -> AfterExit {
        let mut slots = self.inner.lock();
        let cancelled = slots.get(id).map(CancellationToken::is_cancelled).unwrap_or(true);
        if idle && !cancelled && store.get_instance_metadata(id).status == InstanceStatus::Running
        {
            return AfterExit::Restart;
        }
        slots.remove(id);
        AfterExit::Release
    }

    pub(crate) fn is_live(&self, id: &InstanceId) -> bool {
        self.inner.lock().contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Cancel one agent. Its supervisor releases the slot once it exits.
    pub(crate) fn cancel(&self, id: &InstanceId) {
        if let Some(token) = self.inner.lock().get(id) {
            token.cancel();
        }
    }

    /// Cancel every agent and wait up to `timeout` for all slots to drain.
    pub(crate) async fn drain(&self, timeout: Duration) -> bool {
        for token in self.inner.lock().values() {
            token.cancel();
        }
        let deadline = tokio::time::Instant::now() + timeout;
        while self.len() > 0 {
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(remaining = self.len(), "agents still running after shutdown");
                return false;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        true
    }
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
