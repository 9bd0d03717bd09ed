// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::backend::{ClusterBackend, JobRequest};
use crate::base::FsCluster;
use hf_adapters::testing;
use hf_core::{InstanceStatus, JobId, JobStatus};
use hf_storage::WatchMode;
use std::path::Path;
use tempfile::TempDir;

const MD5_PASSWORD: &str = "5f4dcc3b5aa765d61d8327deb882cf99";
const MD5_LETMEIN: &str = "0d107d09f5bbe40cade3de5c71e9e9b7";

fn fast_agents() -> AgentSettings {
    AgentSettings {
        tick: Duration::from_millis(20),
        idle_cooldown: 5,
        watch: WatchMode::Poll { interval: Duration::from_millis(20) },
    }
}

struct Fixture {
    _dir: TempDir,
    cluster: FsCluster<InProcessLauncher>,
}

impl Fixture {
    async fn new(binary: impl FnOnce(&Path) -> PathBuf) -> Self {
        let dir = TempDir::new().unwrap();
        let bin_dir = dir.path().join("bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        let hashcat = binary(&bin_dir);
        let launcher = InProcessLauncher::new(hashcat, BackendKind::Debug.default_instance_types())
            .with_agent_settings(fast_agents());
        let cluster = FsCluster::new(dir.path().join("storage"), launcher);
        cluster.load().await.unwrap();
        Self { _dir: dir, cluster }
    }

    async fn job(&self, instance: &InstanceId, hash: &str) -> JobId {
        let wordlist =
            self.cluster.create_wordlist(b"123456\npassword\nletmein\n").await.unwrap();
        let request = JobRequest::new("md5", wordlist, vec![hash.to_string()]);
        self.cluster.create_job(instance, request).await.unwrap()
    }

    fn job_status(&self, instance: &InstanceId, job: &JobId) -> JobStatus {
        self.cluster.context().store().get_job_metadata(instance, job).status
    }

    fn instance_status(&self, instance: &InstanceId) -> InstanceStatus {
        self.cluster.context().store().get_instance_metadata(instance).status
    }
}

async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    while !check() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn md5_job_cracks_password() {
    let fx = Fixture::new(|dir| testing::md5_cracker(dir).unwrap()).await;
    let instance = fx.cluster.create_instance_folder("debug").await.unwrap();

    let job = fx.job(&instance, MD5_PASSWORD).await;
    assert_eq!(fx.instance_status(&instance), InstanceStatus::Running);

    eventually("job completion", || fx.job_status(&instance, &job) == JobStatus::Complete).await;
    let status = fx.cluster.status().await.unwrap();
    assert_eq!(status.plaintext(&job, MD5_PASSWORD), Some("password"));

    eventually("idle release", || {
        fx.instance_status(&instance) == InstanceStatus::Pending
            && !fx.cluster.launcher().is_live(&instance)
    })
    .await;
}

#[tokio::test]
async fn idle_instance_is_relaunched_by_next_job() {
    let fx = Fixture::new(|dir| testing::md5_cracker(dir).unwrap()).await;
    let instance = fx.cluster.create_instance_folder("cpu").await.unwrap();

    let first = fx.job(&instance, MD5_PASSWORD).await;
    eventually("first job", || fx.job_status(&instance, &first) == JobStatus::Complete).await;
    eventually("idle release", || !fx.cluster.launcher().is_live(&instance)).await;

    let second = fx.job(&instance, MD5_LETMEIN).await;
    eventually("second job", || fx.job_status(&instance, &second) == JobStatus::Complete).await;
    let status = fx.cluster.status().await.unwrap();
    assert_eq!(status.plaintext(&second, MD5_LETMEIN), Some("letmein"));
}

#[tokio::test]
async fn deleting_running_job_stops_it() {
    let fx = Fixture::new(|dir| testing::sleeping(dir).unwrap()).await;
    let instance = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let job = fx.job(&instance, MD5_PASSWORD).await;
    eventually("job start", || fx.job_status(&instance, &job) == JobStatus::Running).await;

    fx.cluster.delete_job(&instance, &job).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fx.job_status(&instance, &job), JobStatus::Stopped);
    fx.cluster.shutdown().await;
}

#[tokio::test]
async fn deleting_instance_stops_agent_and_jobs() {
    let fx = Fixture::new(|dir| testing::sleeping(dir).unwrap()).await;
    let instance = fx.cluster.create_instance("cpu").await.unwrap();
    let job = fx.job(&instance, MD5_PASSWORD).await;
    eventually("job start", || fx.job_status(&instance, &job) == JobStatus::Running).await;

    fx.cluster.delete_instance(&instance).await.unwrap();

    eventually("agent exit", || !fx.cluster.launcher().is_live(&instance)).await;
    assert_eq!(fx.instance_status(&instance), InstanceStatus::Stopped);
    assert_eq!(fx.job_status(&instance, &job), JobStatus::Stopped);
}

#[tokio::test]
async fn shutdown_requeues_running_work() {
    let fx = Fixture::new(|dir| testing::sleeping(dir).unwrap()).await;
    let instance = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let job = fx.job(&instance, MD5_PASSWORD).await;
    eventually("job start", || fx.job_status(&instance, &job) == JobStatus::Running).await;

    fx.cluster.shutdown().await;

    assert!(!fx.cluster.launcher().is_live(&instance));
    assert_eq!(fx.job_status(&instance, &job), JobStatus::Pending);
    assert_eq!(fx.instance_status(&instance), InstanceStatus::Pending);
}

#[tokio::test]
async fn second_launch_reuses_live_agent() {
    let fx = Fixture::new(|dir| testing::sleeping(dir).unwrap()).await;
    let instance = fx.cluster.create_instance("cpu").await.unwrap();
    assert!(fx.cluster.launcher().is_live(&instance));

    fx.cluster.launch_instance(&instance).await.unwrap();
    assert!(fx.cluster.launcher().is_live(&instance));
    fx.cluster.shutdown().await;
    assert!(!fx.cluster.launcher().is_live(&instance));
}

#[tokio::test]
async fn missing_binary_fails_load() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-hashcat");
    let cluster = FsCluster::new(dir.path(), InProcessLauncher::new(missing, vec![]));
    let err = cluster.load().await.unwrap_err();
    assert!(matches!(err, ClusterError::Prerequisite(_)), "{err}");
}

#[tokio::test]
async fn unknown_instance_is_not_launched() {
    let fx = Fixture::new(|dir| testing::sleeping(dir).unwrap()).await;
    let err = fx.cluster.launch_instance(&InstanceId::new()).await.unwrap_err();
    assert!(matches!(err, ClusterError::UnknownInstance(_)), "{err}");
}
