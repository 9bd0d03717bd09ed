// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hf_core::JobId;
use std::collections::VecDeque;

/// FIFO of job IDs waiting to run. Each ID appears at most once.
#[derive(Debug, Default)]
pub(crate) struct JobQueue {
    items: VecDeque<JobId>,
}

impl JobQueue {
    /// Append `job` unless already queued. Returns true if it was added.
    pub fn push(&mut self, job: JobId) -> bool {
        if self.contains(&job) {
            return false;
        }
        self.items.push_back(job);
        true
    }

    pub fn pop(&mut self) -> Option<JobId> {
        self.items.pop_front()
    }

    /// Drop `job` from the queue. Returns true if it was queued.
    pub fn remove(&mut self, job: &JobId) -> bool {
        let before = self.items.len();
        self.items.retain(|j| j != job);
        self.items.len() != before
    }

    pub fn contains(&self, job: &JobId) -> bool {
        self.items.iter().any(|j| j == job)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
