// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciliation of cluster status into the system of record.
//!
//! On every interval the tracked records are compared against the status
//! the cluster reports, and every difference is written back. A status the
//! cluster cannot report (`Unknown`) never overwrites a recorded one, so an
//! unreachable cluster leaves the records untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hf_core::{ClusterStatus, InstanceStatus, JobStatus};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::ClientError;
use crate::records::{RecordStore, RecordUpdate, Records};

/// Anything that can report cluster status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<ClusterStatus, ClientError>;
}

/// Every change between `records` and `status`.
pub fn diff(records: &Records, status: &ClusterStatus) -> Vec<RecordUpdate> {
    let mut updates = Vec::new();

    for (id, record) in &records.instances {
        let reported = status.instance_status(id);
        if reported != InstanceStatus::Unknown && reported != record.status {
            updates.push(RecordUpdate::InstanceStatus { instance: id.clone(), status: reported });
        }
    }

    for (id, record) in &records.jobs {
        let Some(report) = status.job(id) else { continue };
        if report.status != JobStatus::Unknown && report.status != record.status {
            updates.push(RecordUpdate::JobStatus { job: id.clone(), status: report.status });
        }
        for hash in record.hashes.iter().filter(|h| !h.is_found()) {
            if let Some(plaintext) = report.results.get(&hash.hash) {
                updates.push(RecordUpdate::HashFound {
                    job: id.clone(),
                    hash: hash.hash.clone(),
                    plaintext: plaintext.clone(),
                });
            }
        }
    }

    updates
}

/// One reconciliation pass. Failures are logged, never returned; returns
/// the number of updates written.
pub async fn reconcile_once<S, T>(records: &S, source: &T) -> usize
where
    S: RecordStore + ?Sized,
    T: StatusSource + ?Sized,
{
    let tracked = match records.tracked() {
        Ok(tracked) => tracked,
        Err(e) => {
            warn!(error = %e, "failed to read records");
            return 0;
        }
    };
    if tracked.instances.is_empty() && tracked.jobs.is_empty() {
        return 0;
    }

    let status = match source.fetch_status().await {
        Ok(status) => status,
        Err(e) => {
            warn!(error = %e, "failed to fetch cluster status");
            ClusterStatus::default()
        }
    };

    let updates = diff(&tracked, &status);
    if updates.is_empty() {
        debug!("records up to date");
        return 0;
    }
    for update in &updates {
        match update {
            RecordUpdate::InstanceStatus { instance, status } => {
                info!(instance_id = %instance, %status, "instance status changed");
            }
            RecordUpdate::JobStatus { job, status } => {
                info!(job_id = %job, %status, "job status changed");
            }
            RecordUpdate::HashFound { job, hash, .. } => {
                info!(job_id = %job, hash = %hash, "hash found");
            }
        }
    }
    match records.apply(&updates) {
        Ok(()) => updates.len(),
        Err(e) => {
            warn!(error = %e, "failed to write records");
            0
        }
    }
}

/// Reconcile every `interval` until cancelled.
pub async fn run<S, T>(
    records: Arc<S>,
    source: Arc<T>,
    interval: Duration,
    cancel: CancellationToken,
) where
    S: RecordStore + ?Sized,
    T: StatusSource + ?Sized,
{
    info!(interval_ms = interval.as_millis() as u64, "reconciliation started");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                reconcile_once(records.as_ref(), source.as_ref()).await;
            }
        }
    }
    info!("reconciliation stopped");
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
