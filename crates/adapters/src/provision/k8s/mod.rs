// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes provisioner: each cloud instance is a pod running `hf-agent`.
//!
//! # Module layout
//!
//! - [`pod`]: pod spec construction helpers
//!
//! Pods are scheduled onto nodes labelled with the instance type and mount the
//! shared storage volume so the agent sees the same cluster root as the
//! control process.

mod pod;

use super::{ProvisionError, Provisioner};
use async_trait::async_trait;
use hf_core::{InstanceId, JobId};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams};
use kube::Client;
use pod::{pod_name, PodParams};
use std::path::PathBuf;
use std::time::Duration;

/// Create attempts while a finished pod of the same name is going away.
const CREATE_ATTEMPTS: u32 = 20;
const CREATE_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Settings for agent pods.
#[derive(Debug, Clone)]
pub struct K8sConfig {
    pub namespace: String,
    pub image: String,
    /// PersistentVolumeClaim holding shared storage; none mounts nothing
    pub storage_claim: Option<String>,
    /// Storage root as seen inside the pod
    pub storage_root: PathBuf,
    /// Cracking binary path inside the image
    pub hashcat_path: String,
    /// Extra environment forwarded to the agent
    pub agent_env: Vec<(String, String)>,
}

/// Provisioner backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubernetesProvisioner {
    client: Client,
    config: K8sConfig,
}

impl KubernetesProvisioner {
    /// Construct the API client up front so a bad kubeconfig fails at load.
    pub async fn new(config: K8sConfig) -> Result<Self, ProvisionError> {
        let client = Client::try_default().await.map_err(|e| {
            ProvisionError::Client(format!("failed to create kube client: {}", e))
        })?;
        Ok(Self { client, config })
    }

    fn pods(&self) -> Api<Pod> {
        Api::namespaced(self.client.clone(), &self.config.namespace)
    }

    /// Create the agent pod, replacing a finished pod left by an earlier run.
    async fn create_pod(&self, name: &str, spec: &Pod) -> Result<(), ProvisionError> {
        let pods = self.pods();
        for _ in 0..CREATE_ATTEMPTS {
            let err = match pods.create(&PostParams::default(), spec).await {
                Ok(_) => return Ok(()),
                Err(e) if is_status(&e, 409) => e,
                Err(e) => return Err(ProvisionError::Failed(format!("pod creation failed: {}", e))),
            };
            tracing::debug!(pod_name = %name, error = %err, "agent pod name taken");

            match pods.get_opt(name).await {
                Ok(Some(existing)) if pod::is_reusable(&existing) => {
                    tracing::info!(pod_name = %name, "agent pod already running");
                    return Ok(());
                }
                Ok(Some(_)) => {
                    tracing::info!(pod_name = %name, "replacing finished agent pod");
                    match pods.delete(name, &DeleteParams::default()).await {
                        Ok(_) => {}
                        Err(e) if is_status(&e, 404) => {}
                        Err(e) => {
                            return Err(ProvisionError::Failed(format!(
                                "finished pod deletion failed: {}",
                                e
                            )))
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    return Err(ProvisionError::Failed(format!("pod lookup failed: {}", e)));
                }
            }
            tokio::time::sleep(CREATE_RETRY_DELAY).await;
        }
        Err(ProvisionError::Failed(format!("agent pod {} is still terminating", name)))
    }
}

fn is_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == code)
}

#[async_trait]
impl Provisioner for KubernetesProvisioner {
    async fn provision(
        &self,
        instance: &InstanceId,
        instance_type: &str,
    ) -> Result<String, ProvisionError> {
        let params = PodParams {
            pod_name: pod_name(instance),
            instance_id: instance.to_string(),
            instance_type: instance_type.to_string(),
            image: self.config.image.clone(),
            namespace: self.config.namespace.clone(),
            storage_claim: self.config.storage_claim.clone(),
            storage_root: self.config.storage_root.display().to_string(),
            hashcat_path: self.config.hashcat_path.clone(),
            env: self.config.agent_env.clone(),
        };
        let spec = pod::build_pod(&params);

        tracing::info!(
            instance_id = %instance,
            pod_name = %params.pod_name,
            k8s_namespace = %self.config.namespace,
            "creating agent pod"
        );
        self.create_pod(&params.pod_name, &spec).await?;
        Ok(params.pod_name)
    }

    async fn notify_job(&self, machine: &str, job: &JobId) -> Result<(), ProvisionError> {
        let mut annotations = serde_json::Map::new();
        annotations.insert(pod::LAST_JOB_ANNOTATION.to_string(), job.as_str().into());
        let patch = serde_json::json!({ "metadata": { "annotations": annotations } });
        self.pods()
            .patch(machine, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .map(|_| ())
            .map_err(|e| {
                if is_status(&e, 404) {
                    ProvisionError::NotFound(machine.to_string())
                } else {
                    ProvisionError::Failed(format!("pod annotation failed: {}", e))
                }
            })
    }

    async fn terminate(&self, machine: &str) -> Result<(), ProvisionError> {
        tracing::info!(pod_name = %machine, "deleting agent pod");
        match self.pods().delete(machine, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(e) if is_status(&e, 404) => Err(ProvisionError::NotFound(machine.to_string())),
            Err(e) => Err(ProvisionError::Failed(format!("pod deletion failed: {}", e))),
        }
    }
}
