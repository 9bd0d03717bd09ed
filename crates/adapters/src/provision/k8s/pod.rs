// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pod spec construction for agent pods.

use hf_core::InstanceId;
use k8s_openapi::api::core::v1::{
    Container, EnvVar, PersistentVolumeClaimVolumeSource, Pod, PodSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Node label matched against the instance type.
pub(super) const FLAVOR_LABEL: &str = "hashfleet/flavor";
pub(super) const INSTANCE_LABEL: &str = "hashfleet/instance-id";
pub(super) const LAST_JOB_ANNOTATION: &str = "hashfleet/last-job";
const STORAGE_VOLUME: &str = "storage";

/// Pod name for an instance. Instance IDs are lowercase alphanumerics with
/// dashes, so the result is a valid DNS label.
pub(crate) fn pod_name(instance: &InstanceId) -> String {
    format!("hf-{}", instance)
}

/// Whether an existing agent pod can still run the agent.
///
/// Pods never restart, so one that finished or is being deleted must be
/// replaced before the instance can run again.
pub(super) fn is_reusable(pod: &Pod) -> bool {
    if pod.metadata.deletion_timestamp.is_some() {
        return false;
    }
    let phase = pod.status.as_ref().and_then(|s| s.phase.as_deref());
    !matches!(phase, Some("Succeeded") | Some("Failed"))
}

/// Parameters for building an agent pod.
pub(super) struct PodParams {
    pub pod_name: String,
    pub instance_id: String,
    pub instance_type: String,
    pub image: String,
    pub namespace: String,
    pub storage_claim: Option<String>,
    pub storage_root: String,
    pub hashcat_path: String,
    /// Extra environment variables for the agent
    pub env: Vec<(String, String)>,
}

/// Build a Pod spec that runs `hf-agent` for one instance.
pub(super) fn build_pod(params: &PodParams) -> Pod {
    let mut env = vec![
        env_var("HF_INSTANCE_ID", &params.instance_id),
        env_var("HF_STORAGE_ROOT", &params.storage_root),
        env_var("HF_HASHCAT_PATH", &params.hashcat_path),
        // Network volumes rarely deliver native change events
        env_var("HF_WATCH", "poll"),
    ];
    for (k, v) in &params.env {
        env.push(env_var(k, v));
    }

    let (volumes, volume_mounts) = match &params.storage_claim {
        Some(claim) => (
            Some(vec![Volume {
                name: STORAGE_VOLUME.to_string(),
                persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                    claim_name: claim.clone(),
                    read_only: Some(false),
                }),
                ..Default::default()
            }]),
            Some(vec![VolumeMount {
                name: STORAGE_VOLUME.to_string(),
                mount_path: params.storage_root.clone(),
                ..Default::default()
            }]),
        ),
        None => (None, None),
    };

    let container = Container {
        name: "agent".to_string(),
        image: Some(params.image.clone()),
        command: Some(vec!["hf-agent".to_string()]),
        env: Some(env),
        volume_mounts,
        ..Default::default()
    };

    Pod {
        metadata: ObjectMeta {
            name: Some(params.pod_name.clone()),
            namespace: Some(params.namespace.clone()),
            labels: Some(
                [
                    ("app".to_string(), "hf-agent".to_string()),
                    (INSTANCE_LABEL.to_string(), params.instance_id.clone()),
                ]
                .into_iter()
                .collect(),
            ),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![container],
            volumes,
            node_selector: Some(
                [(FLAVOR_LABEL.to_string(), params.instance_type.clone())].into_iter().collect(),
            ),
            // The agent exits on idle cooldown; the instance is relaunched on
            // the next job instead of restarting the pod.
            restart_policy: Some("Never".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn env_var(name: &str, value: &str) -> EnvVar {
    EnvVar { name: name.to_string(), value: Some(value.to_string()), ..Default::default() }
}

#[cfg(test)]
#[path = "pod_tests.rs"]
mod tests;
