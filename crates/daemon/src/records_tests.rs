// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn hashes() -> Vec<String> {
    vec!["aaaa".to_string(), "bbbb".to_string()]
}

#[test]
fn missing_file_tracks_nothing() {
    let dir = tempdir().unwrap();
    let store = FileRecordStore::new(dir.path().join("records.json"));
    assert_eq!(store.tracked().unwrap(), Records::default());
}

#[test]
fn tracked_entities_start_pending() {
    let dir = tempdir().unwrap();
    let store = FileRecordStore::new(dir.path().join("nested/records.json"));
    let instance = InstanceId::new();
    let job = JobId::new();

    store.track_instance(&instance).unwrap();
    store.track_job(&instance, &job, &hashes()).unwrap();

    let records = store.tracked().unwrap();
    assert_eq!(records.instances[&instance].status, InstanceStatus::Pending);
    let record = &records.jobs[&job];
    assert_eq!(record.instance, instance);
    assert_eq!(record.status, JobStatus::Pending);
    assert_eq!(record.hashes.len(), 2);
    assert!(record.hashes.iter().all(|h| !h.is_found()));
}

#[test]
fn tracking_again_keeps_existing_state() {
    let dir = tempdir().unwrap();
    let store = FileRecordStore::new(dir.path().join("records.json"));
    let instance = InstanceId::new();
    store.track_instance(&instance).unwrap();
    store
        .apply(&[RecordUpdate::InstanceStatus {
            instance: instance.clone(),
            status: InstanceStatus::Running,
        }])
        .unwrap();

    store.track_instance(&instance).unwrap();

    assert_eq!(store.tracked().unwrap().instances[&instance].status, InstanceStatus::Running);
}

#[test]
fn updates_are_persisted() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    let store = FileRecordStore::new(&path);
    let instance = InstanceId::new();
    let job = JobId::new();
    store.track_instance(&instance).unwrap();
    store.track_job(&instance, &job, &hashes()).unwrap();

    store
        .apply(&[
            RecordUpdate::JobStatus { job: job.clone(), status: JobStatus::Complete },
            RecordUpdate::HashFound {
                job: job.clone(),
                hash: "bbbb".to_string(),
                plaintext: "hunter2".to_string(),
            },
        ])
        .unwrap();

    let reopened = FileRecordStore::new(&path).tracked().unwrap();
    let record = &reopened.jobs[&job];
    assert_eq!(record.status, JobStatus::Complete);
    assert_eq!(record.hashes[0].plaintext, None);
    assert_eq!(record.hashes[1].plaintext.as_deref(), Some("hunter2"));
    assert!(record.hashes[1].found_at.is_some());
}

#[test]
fn updates_for_untracked_entities_are_ignored() {
    let mut records = Records::default();
    let now = Utc::now();
    let job = JobId::new();

    let update = RecordUpdate::JobStatus { job: job.clone(), status: JobStatus::Error };
    assert!(!records.apply(&update, now));
    records.track_job(&InstanceId::new(), &job, &hashes(), now);
    let unknown_hash =
        RecordUpdate::HashFound { job, hash: "cccc".to_string(), plaintext: "x".to_string() };
    assert!(!records.apply(&unknown_hash, now));
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("records.json");
    std::fs::write(&path, b"{not json").unwrap();

    assert!(matches!(FileRecordStore::new(&path).tracked(), Err(RecordError::Json(_))));
}
