// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn store() -> (TempDir, MetadataStore, InstanceId) {
    let dir = TempDir::new().unwrap();
    let store = MetadataStore::new(dir.path().join("instances"));
    let id = InstanceId::new();
    store.create_instance(&id, "cpu").unwrap();
    (dir, store, id)
}

#[test]
fn claim_is_exclusive_until_released() {
    let (_dir, store, id) = store();
    let slots = AgentSlots::default();

    assert!(slots.claim(&id).is_some());
    assert!(slots.claim(&id).is_none());
    assert!(slots.is_live(&id));

    assert_eq!(slots.after_exit(&id, &store, true), AfterExit::Release);
    assert!(!slots.is_live(&id));
    assert!(slots.claim(&id).is_some());
}

#[test]
fn idle_exit_restarts_when_instance_was_kicked() {
    let (_dir, store, id) = store();
    let slots = AgentSlots::default();
    slots.claim(&id).unwrap();

    let meta = store.get_instance_metadata(&id).with_status(InstanceStatus::Running);
    store.write_instance_metadata(&id, &meta).unwrap();

    assert_eq!(slots.after_exit(&id, &store, true), AfterExit::Restart);
    assert!(slots.is_live(&id));
}

#[test]
fn failed_or_cancelled_agents_never_restart() {
    let (_dir, store, id) = store();
    let meta = store.get_instance_metadata(&id).with_status(InstanceStatus::Running);
    store.write_instance_metadata(&id, &meta).unwrap();

    let slots = AgentSlots::default();
    slots.claim(&id).unwrap();
    assert_eq!(slots.after_exit(&id, &store, false), AfterExit::Release);

    let token = slots.claim(&id).unwrap();
    token.cancel();
    assert_eq!(slots.after_exit(&id, &store, true), AfterExit::Release);
}

#[tokio::test]
async fn drain_cancels_and_waits_for_release() {
    let (_dir, store, id) = store();
    let slots = AgentSlots::default();
    let token = slots.claim(&id).unwrap();

    let supervisor = {
        let slots = slots.clone();
        let id = id.clone();
        tokio::spawn(async move {
            token.cancelled().await;
            slots.after_exit(&id, &store, true)
        })
    };

    assert!(slots.drain(Duration::from_secs(5)).await);
    assert_eq!(supervisor.await.unwrap(), AfterExit::Release);
    assert_eq!(slots.len(), 0);
}
