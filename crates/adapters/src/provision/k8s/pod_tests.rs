// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn params(claim: Option<&str>) -> PodParams {
    PodParams {
        pod_name: "hf-ins-abc".to_string(),
        instance_id: "ins-abc".to_string(),
        instance_type: "gpu".to_string(),
        image: "hashfleet/agent:latest".to_string(),
        namespace: "cracking".to_string(),
        storage_claim: claim.map(String::from),
        storage_root: "/storage".to_string(),
        hashcat_path: "/usr/bin/hashcat".to_string(),
        env: vec![("HF_TICK_MS".to_string(), "250".to_string())],
    }
}

fn env_value(pod: &Pod, name: &str) -> Option<String> {
    pod.spec.as_ref()?.containers[0]
        .env
        .as_ref()?
        .iter()
        .find(|e| e.name == name)
        .and_then(|e| e.value.clone())
}

#[test]
fn pod_name_prefixes_instance_id() {
    assert_eq!(pod_name(&InstanceId::from_string("ins-xyz")), "hf-ins-xyz");
}

#[test]
fn pod_runs_agent_for_instance() {
    let pod = build_pod(&params(None));
    assert_eq!(pod.metadata.name.as_deref(), Some("hf-ins-abc"));
    assert_eq!(pod.metadata.namespace.as_deref(), Some("cracking"));
    assert_eq!(env_value(&pod, "HF_INSTANCE_ID").as_deref(), Some("ins-abc"));
    assert_eq!(env_value(&pod, "HF_STORAGE_ROOT").as_deref(), Some("/storage"));
    assert_eq!(env_value(&pod, "HF_HASHCAT_PATH").as_deref(), Some("/usr/bin/hashcat"));
    assert_eq!(env_value(&pod, "HF_WATCH").as_deref(), Some("poll"));
    assert_eq!(env_value(&pod, "HF_TICK_MS").as_deref(), Some("250"));

    let spec = pod.spec.unwrap();
    assert_eq!(spec.restart_policy.as_deref(), Some("Never"));
    assert_eq!(spec.node_selector.unwrap().get(FLAVOR_LABEL).map(String::as_str), Some("gpu"));
}

#[test]
fn storage_claim_is_mounted_at_storage_root() {
    let pod = build_pod(&params(Some("hashfleet-storage")));
    let spec = pod.spec.unwrap();
    let volumes = spec.volumes.unwrap();
    assert_eq!(
        volumes[0].persistent_volume_claim.as_ref().map(|c| c.claim_name.as_str()),
        Some("hashfleet-storage")
    );
    let mounts = spec.containers[0].volume_mounts.clone().unwrap();
    assert_eq!(mounts[0].mount_path, "/storage");
}

#[test]
fn no_claim_means_no_volumes() {
    let spec = build_pod(&params(None)).spec.unwrap();
    assert!(spec.volumes.is_none());
    assert!(spec.containers[0].volume_mounts.is_none());
}

#[test]
fn pod_is_labelled_with_instance() {
    let pod = build_pod(&params(None));
    let labels = pod.metadata.labels.unwrap();
    assert_eq!(labels.get("app").map(String::as_str), Some("hf-agent"));
    assert_eq!(labels.get(INSTANCE_LABEL).map(String::as_str), Some("ins-abc"));
}

fn with_phase(phase: Option<&str>) -> Pod {
    let mut pod = build_pod(&params(None));
    pod.status = Some(k8s_openapi::api::core::v1::PodStatus {
        phase: phase.map(String::from),
        ..Default::default()
    });
    pod
}

#[yare::parameterized(
    fresh = { None, true },
    pending = { Some("Pending"), true },
    running = { Some("Running"), true },
    succeeded = { Some("Succeeded"), false },
    failed = { Some("Failed"), false },
)]
fn reusable_by_phase(phase: Option<&str>, expected: bool) {
    assert_eq!(is_reusable(&with_phase(phase)), expected);
}

#[test]
fn terminating_pod_is_not_reusable() {
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    let mut pod = with_phase(Some("Running"));
    pod.metadata.deletion_timestamp = Some(Time(k8s_openapi::chrono::Utc::now()));
    assert!(!is_reusable(&pod));
}
