// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use hf_core::{ClusterStatus, InstanceReport, JobReport};
use hf_storage::{MetadataStore, StorageError};
use std::collections::BTreeMap;

/// Build the cluster status from the metadata tree.
///
/// Records that cannot be read are left out: an absent entity reports as
/// `Unknown` to anyone looking it up.
pub fn project_status(store: &MetadataStore) -> Result<ClusterStatus, StorageError> {
    let mut status = ClusterStatus::default();
    for instance in store.list_instances()? {
        let meta = store.get_instance_metadata(&instance);
        if meta.is_unknown() {
            continue;
        }

        let mut jobs = BTreeMap::new();
        for job in store.list_jobs(&instance)? {
            let job_meta = store.get_job_metadata(&instance, &job);
            if job_meta.is_unknown() {
                continue;
            }
            let results = hf_adapters::read_output(&store.job_paths(&instance, &job).output);
            jobs.insert(job, JobReport { status: job_meta.status, results });
        }
        status.instances.insert(instance, InstanceReport { status: meta.status, jobs });
    }
    Ok(status)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
