// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use hf_core::{InstanceStatus, JobStatus};
use tempfile::TempDir;

fn store() -> (TempDir, MetadataStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::new(dir.path().join("instances"));
    store.create_cluster_root().unwrap();
    (dir, store)
}

fn md5() -> HashType {
    HashType::parse("md5").unwrap()
}

fn add_job(store: &MetadataStore, instance: &InstanceId, job: &JobId) {
    store
        .create_job(
            instance,
            job,
            md5(),
            WordlistId::from_string("wl-test"),
            None,
            &["5f4dcc3b5aa765d61d8327deb882cf99".to_string()],
        )
        .unwrap();
}

#[test]
fn absent_instance_reads_unknown() {
    let (_dir, store) = store();
    let meta = store.get_instance_metadata(&InstanceId::from_string("ins-missing"));
    assert_eq!(meta.status, InstanceStatus::Unknown);
}

#[test]
fn absent_job_reads_unknown() {
    let (_dir, store) = store();
    let meta =
        store.get_job_metadata(&InstanceId::from_string("ins-a"), &JobId::from_string("job-b"));
    assert!(meta.is_unknown());
}

#[test]
fn corrupt_record_reads_unknown() {
    let (_dir, store) = store();
    let id = InstanceId::new();
    store.create_instance(&id, "gpu").unwrap();
    std::fs::write(store.layout().instance_metadata(&id), b"{not json").unwrap();
    assert!(store.get_instance_metadata(&id).is_unknown());
}

#[test]
fn unsafe_ids_read_unknown_and_refuse_writes() {
    let (_dir, store) = store();
    let bad = InstanceId::from_string("../escape");
    assert!(store.get_instance_metadata(&bad).is_unknown());
    assert!(matches!(
        store.write_instance_metadata(&bad, &InstanceMetadata::new("gpu")),
        Err(StorageError::InvalidId(_))
    ));
    assert!(matches!(store.create_instance(&bad, "gpu"), Err(StorageError::InvalidId(_))));
}

#[test]
fn create_instance_writes_pending_record() {
    let (_dir, store) = store();
    let id = InstanceId::new();
    store.create_instance(&id, "gpu").unwrap();

    let meta = store.get_instance_metadata(&id);
    assert_eq!(meta, InstanceMetadata::new("gpu"));
    assert!(store.layout().jobs_dir(&id).is_dir());
}

#[test]
fn create_instance_is_idempotent_and_keeps_existing_record() {
    let (_dir, store) = store();
    let id = InstanceId::new();
    store.create_instance(&id, "gpu").unwrap();
    store
        .write_instance_metadata(
            &id,
            &InstanceMetadata::new("gpu").with_status(InstanceStatus::Stopped),
        )
        .unwrap();

    store.create_instance(&id, "gpu").unwrap();
    assert_eq!(store.get_instance_metadata(&id).status, InstanceStatus::Stopped);
}

#[test]
fn instance_record_json_layout() {
    let (_dir, store) = store();
    let id = InstanceId::new();
    store.create_instance(&id, "local").unwrap();

    let raw = std::fs::read(store.layout().instance_metadata(&id)).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(json, serde_json::json!({"status": "pending", "type": "local"}));
}

#[test]
fn list_instances_is_sorted_and_ignores_files() {
    let (_dir, store) = store();
    let b = InstanceId::from_string("ins-b");
    let a = InstanceId::from_string("ins-a");
    store.create_instance(&b, "gpu").unwrap();
    store.create_instance(&a, "gpu").unwrap();
    std::fs::write(store.root().join("stray.txt"), b"").unwrap();

    assert_eq!(store.list_instances().unwrap(), vec![a, b]);
}

#[test]
fn missing_root_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::new(dir.path().join("nowhere"));
    assert!(store.list_instances().unwrap().is_empty());
    assert!(store.list_jobs(&InstanceId::new()).unwrap().is_empty());
}

#[test]
fn create_job_writes_hashes_and_pending_record() {
    let (_dir, store) = store();
    let ins = InstanceId::new();
    let job = JobId::new();
    store.create_instance(&ins, "gpu").unwrap();
    store
        .create_job(
            &ins,
            &job,
            md5(),
            WordlistId::from_string("wl-test"),
            Some(RuleId::from_string("rul-test")),
            &["aaa".to_string(), "bbb".to_string()],
        )
        .unwrap();

    let meta = store.get_job_metadata(&ins, &job);
    assert_eq!(meta.status, JobStatus::Pending);
    assert_eq!(meta.rule, Some(RuleId::from_string("rul-test")));
    assert_eq!(store.read_hashes(&ins, &job).unwrap(), vec!["aaa", "bbb"]);
    assert!(!store.job_paths(&ins, &job).output.exists());
}

#[test]
fn job_writes_replace_the_record() {
    let (_dir, store) = store();
    let ins = InstanceId::new();
    let job = JobId::new();
    store.create_instance(&ins, "gpu").unwrap();
    add_job(&store, &ins, &job);

    let running = store.get_job_metadata(&ins, &job).with_status(JobStatus::Running);
    store.write_job_metadata(&ins, &job, &running).unwrap();
    assert_eq!(store.get_job_metadata(&ins, &job), running);
}

#[test]
fn list_jobs_returns_every_job() {
    let (_dir, store) = store();
    let ins = InstanceId::new();
    store.create_instance(&ins, "gpu").unwrap();
    let jobs = [JobId::new(), JobId::new(), JobId::new()];
    for job in &jobs {
        add_job(&store, &ins, job);
    }

    let mut listed = store.list_jobs(&ins).unwrap();
    listed.sort();
    let mut expected = jobs.to_vec();
    expected.sort();
    assert_eq!(listed, expected);
}
