// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::launcher::ExternalLauncher;
use parking_lot::Mutex;
use std::sync::Arc;
use tempfile::TempDir;

const MD5_PASSWORD: &str = "5f4dcc3b5aa765d61d8327deb882cf99";

/// Launcher that records launches and never starts a worker.
#[derive(Clone, Default)]
struct RecordingLauncher {
    launches: Arc<Mutex<Vec<InstanceId>>>,
    terminations: Arc<Mutex<Vec<InstanceId>>>,
    fail: Arc<Mutex<Option<String>>>,
    types: Vec<String>,
}

impl RecordingLauncher {
    fn new() -> Self {
        Self { types: vec!["cpu".to_string()], ..Self::default() }
    }

    fn launches(&self) -> Vec<InstanceId> {
        self.launches.lock().clone()
    }
}

#[async_trait]
impl Launcher for RecordingLauncher {
    fn kind(&self) -> BackendKind {
        BackendKind::Debug
    }

    fn instance_types(&self) -> &[String] {
        &self.types
    }

    async fn check_prerequisites(&self, _ctx: &ClusterContext) -> Result<(), ClusterError> {
        Ok(())
    }

    async fn launch(&self, _ctx: &ClusterContext, id: &InstanceId) -> Result<(), ClusterError> {
        self.launches.lock().push(id.clone());
        match self.fail.lock().clone() {
            Some(msg) => Err(ClusterError::Launch(msg)),
            None => Ok(()),
        }
    }

    async fn terminate(
        &self,
        _ctx: &ClusterContext,
        id: &InstanceId,
        _meta: &InstanceMetadata,
    ) -> Result<(), ClusterError> {
        self.terminations.lock().push(id.clone());
        Ok(())
    }
}

struct Fixture {
    _dir: TempDir,
    launcher: RecordingLauncher,
    cluster: FsCluster<RecordingLauncher>,
}

impl Fixture {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let launcher = RecordingLauncher::new();
        let cluster = FsCluster::new(dir.path(), launcher.clone());
        cluster.load().await.unwrap();
        Self { _dir: dir, launcher, cluster }
    }

    fn store(&self) -> &MetadataStore {
        self.cluster.context().store()
    }

    fn instance_status(&self, id: &InstanceId) -> InstanceStatus {
        self.store().get_instance_metadata(id).status
    }

    fn set_instance_status(&self, id: &InstanceId, status: InstanceStatus) {
        let meta = self.store().get_instance_metadata(id).with_status(status);
        self.store().write_instance_metadata(id, &meta).unwrap();
    }

    async fn request(&self) -> JobRequest {
        let wordlist = self.cluster.create_wordlist(b"password\n").await.unwrap();
        JobRequest::new("md5", wordlist, vec![MD5_PASSWORD.to_string()])
    }
}

#[tokio::test]
async fn load_resets_live_instances_without_launching() {
    let fx = Fixture::new().await;
    let running = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let errored = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let stopped = fx.cluster.create_instance_folder("cpu").await.unwrap();
    fx.set_instance_status(&running, InstanceStatus::Running);
    fx.set_instance_status(&errored, InstanceStatus::Error);
    fx.set_instance_status(&stopped, InstanceStatus::Stopped);

    fx.cluster.load().await.unwrap();

    assert_eq!(fx.instance_status(&running), InstanceStatus::Pending);
    assert_eq!(fx.instance_status(&errored), InstanceStatus::Pending);
    assert_eq!(fx.instance_status(&stopped), InstanceStatus::Stopped);
    assert!(fx.launcher.launches().is_empty());
}

#[tokio::test]
async fn create_instance_launches_and_marks_running() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance("cpu").await.unwrap();
    assert_eq!(fx.instance_status(&id), InstanceStatus::Running);
    assert_eq!(fx.store().get_instance_metadata(&id).instance_type, "cpu");
    assert_eq!(fx.launcher.launches(), vec![id]);
}

#[tokio::test]
async fn create_instance_rejects_unsupported_type() {
    let fx = Fixture::new().await;
    let err = fx.cluster.create_instance("tpu").await.unwrap_err();
    assert!(matches!(err, ClusterError::UnsupportedType { .. }), "{err}");
    assert!(err.is_caller_error());
    assert!(fx.store().list_instances().unwrap().is_empty());
}

#[tokio::test]
async fn failed_launch_records_error_with_message() {
    let fx = Fixture::new().await;
    *fx.launcher.fail.lock() = Some("no capacity".to_string());
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();

    let err = fx.cluster.launch_instance(&id).await.unwrap_err();
    assert!(matches!(err, ClusterError::Launch(_)));

    let meta = fx.store().get_instance_metadata(&id);
    assert_eq!(meta.status, InstanceStatus::Error);
    assert!(meta.error.unwrap().contains("no capacity"));
}

#[tokio::test]
async fn job_on_pending_instance_kicks_it() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let request = fx.request().await;

    let job = fx.cluster.create_job(&id, request).await.unwrap();

    assert_eq!(fx.instance_status(&id), InstanceStatus::Running);
    assert_eq!(fx.launcher.launches(), vec![id.clone()]);
    let meta = fx.store().get_job_metadata(&id, &job);
    assert_eq!(meta.status, JobStatus::Pending);
    assert_eq!(meta.hash_type.as_str(), "md5");
    assert_eq!(fx.store().read_hashes(&id, &job).unwrap(), vec![MD5_PASSWORD.to_string()]);
}

#[tokio::test]
async fn job_on_running_instance_leaves_it_alone() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance("cpu").await.unwrap();
    let request = fx.request().await;

    fx.cluster.create_job(&id, request).await.unwrap();

    assert_eq!(fx.instance_status(&id), InstanceStatus::Running);
    assert_eq!(fx.launcher.launches().len(), 1);
}

#[tokio::test]
async fn failed_kick_keeps_the_job() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();
    *fx.launcher.fail.lock() = Some("spawn failed".to_string());
    let request = fx.request().await;

    let job = fx.cluster.create_job(&id, request).await.unwrap();

    assert_eq!(fx.store().get_job_metadata(&id, &job).status, JobStatus::Pending);
    assert_eq!(fx.instance_status(&id), InstanceStatus::Error);
}

#[tokio::test]
async fn create_job_validates_request() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let good = fx.request().await;

    let bad_type = JobRequest { hash_type: "rot13".to_string(), ..good.clone() };
    let err = fx.cluster.create_job(&id, bad_type).await.unwrap_err();
    assert!(matches!(err, ClusterError::HashType(_)), "{err}");

    let no_hashes = JobRequest { hashes: vec![" ".to_string()], ..good.clone() };
    let err = fx.cluster.create_job(&id, no_hashes).await.unwrap_err();
    assert!(matches!(err, ClusterError::NoHashes), "{err}");

    let missing = JobRequest { wordlist: WordlistId::from_content(b"other"), ..good.clone() };
    let err = fx.cluster.create_job(&id, missing).await.unwrap_err();
    assert!(matches!(err, ClusterError::UnknownWordlist(_)), "{err}");

    let rule = good.clone().with_rule(RuleId::from_content(b"u\n"));
    let err = fx.cluster.create_job(&id, rule).await.unwrap_err();
    assert!(matches!(err, ClusterError::UnknownRule(_)), "{err}");

    let err = fx.cluster.create_job(&InstanceId::new(), good).await.unwrap_err();
    assert!(matches!(err, ClusterError::UnknownInstance(_)), "{err}");

    assert!(fx.store().list_jobs(&id).unwrap().is_empty());
    assert!(fx.launcher.launches().is_empty());
}

#[tokio::test]
async fn create_job_with_rule_and_explicit_id() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let rule = fx.cluster.create_rule(b"u\n").await.unwrap();
    let request = fx.request().await.with_rule(rule.clone());
    let job = JobId::from_string("job-fixed");

    fx.cluster.create_job_with_id(&id, &job, request.clone()).await.unwrap();
    assert_eq!(fx.store().get_job_metadata(&id, &job).rule, Some(rule));

    let err = fx.cluster.create_job_with_id(&id, &job, request).await.unwrap_err();
    assert!(matches!(err, ClusterError::JobExists(_)), "{err}");
}

#[tokio::test]
async fn create_job_on_stopped_instance_fails() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();
    fx.cluster.delete_instance(&id).await.unwrap();
    let request = fx.request().await;

    let err = fx.cluster.create_job(&id, request).await.unwrap_err();
    assert!(matches!(err, ClusterError::InstanceStopped(_)), "{err}");
}

#[tokio::test]
async fn delete_instance_stops_live_jobs_only() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance("cpu").await.unwrap();
    let pending = fx.cluster.create_job(&id, fx.request().await).await.unwrap();
    let done = fx.cluster.create_job(&id, fx.request().await).await.unwrap();
    let complete = fx.store().get_job_metadata(&id, &done).with_status(JobStatus::Complete);
    fx.store().write_job_metadata(&id, &done, &complete).unwrap();

    fx.cluster.delete_instance(&id).await.unwrap();

    assert_eq!(fx.instance_status(&id), InstanceStatus::Stopped);
    assert_eq!(fx.store().get_job_metadata(&id, &pending).status, JobStatus::Stopped);
    assert_eq!(fx.store().get_job_metadata(&id, &done).status, JobStatus::Complete);
    assert_eq!(*fx.launcher.terminations.lock(), vec![id]);
}

#[tokio::test]
async fn deleting_settled_or_missing_entities_succeeds() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let job = fx.cluster.create_job(&id, fx.request().await).await.unwrap();

    fx.cluster.delete_job(&id, &job).await.unwrap();
    fx.cluster.delete_job(&id, &job).await.unwrap();
    fx.cluster.delete_job(&id, &JobId::new()).await.unwrap();
    assert_eq!(fx.store().get_job_metadata(&id, &job).status, JobStatus::Stopped);

    fx.cluster.delete_instance(&id).await.unwrap();
    fx.cluster.delete_instance(&id).await.unwrap();
    fx.cluster.delete_instance(&InstanceId::new()).await.unwrap();
    assert_eq!(fx.instance_status(&id), InstanceStatus::Stopped);
}

#[tokio::test]
async fn completed_job_is_not_stopped_by_delete() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let job = fx.cluster.create_job(&id, fx.request().await).await.unwrap();
    let complete = fx.store().get_job_metadata(&id, &job).with_status(JobStatus::Complete);
    fx.store().write_job_metadata(&id, &job, &complete).unwrap();

    fx.cluster.delete_job(&id, &job).await.unwrap();
    assert_eq!(fx.store().get_job_metadata(&id, &job).status, JobStatus::Complete);
}

#[tokio::test]
async fn batch_deletes_report_every_item() {
    let fx = Fixture::new().await;
    let a = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let b = fx.cluster.create_instance_folder("cpu").await.unwrap();
    let job = fx.cluster.create_job(&a, fx.request().await).await.unwrap();
    let missing = JobId::new();

    let jobs = fx.cluster.delete_jobs(&[(a.clone(), job.clone()), (b.clone(), missing)]).await;
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|(_, result)| result.is_ok()));

    let instances = fx.cluster.delete_instances(&[a.clone(), b.clone()]).await;
    assert_eq!(instances.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>(), vec![a, b]);
    assert!(instances.iter().all(|(_, result)| result.is_ok()));
}

#[tokio::test]
async fn blobs_are_content_addressed() {
    let fx = Fixture::new().await;
    let a = fx.cluster.create_wordlist(b"password\n").await.unwrap();
    let b = fx.cluster.create_wordlist(b"password\n").await.unwrap();
    assert_eq!(a, b);

    fx.cluster.delete_wordlist(&a).await.unwrap();
    let err = fx.cluster.delete_wordlist(&a).await.unwrap_err();
    assert!(matches!(err, ClusterError::UnknownWordlist(_)), "{err}");

    let rule = fx.cluster.create_rule(b"c\n").await.unwrap();
    fx.cluster.delete_rule(&rule).await.unwrap();
    let err = fx.cluster.delete_rule(&rule).await.unwrap_err();
    assert!(matches!(err, ClusterError::UnknownRule(_)), "{err}");
}

#[tokio::test]
async fn status_projects_the_tree() {
    let fx = Fixture::new().await;
    let id = fx.cluster.create_instance("cpu").await.unwrap();
    let job = fx.cluster.create_job(&id, fx.request().await).await.unwrap();

    let status = fx.cluster.status().await.unwrap();
    assert_eq!(status.instance_status(&id), InstanceStatus::Running);
    assert_eq!(status.job_status(&job), JobStatus::Pending);
    assert_eq!(status.instance_status(&InstanceId::new()), InstanceStatus::Unknown);
}

#[tokio::test]
async fn external_backend_has_no_lifecycle_control() {
    let dir = TempDir::new().unwrap();
    let registered = InstanceId::from_string("ins-worker1");
    let cluster = FsCluster::new(dir.path(), ExternalLauncher::new(vec![registered.clone()]));
    cluster.load().await.unwrap();

    let store = cluster.context().store();
    let meta = store.get_instance_metadata(&registered);
    assert_eq!(meta.status, InstanceStatus::Pending);
    assert_eq!(meta.instance_type, "external");

    let err = cluster.create_instance("cpu").await.unwrap_err();
    assert!(matches!(err, ClusterError::Unsupported { .. }), "{err}");
    let err = cluster.delete_instance(&registered).await.unwrap_err();
    assert!(matches!(err, ClusterError::Unsupported { .. }), "{err}");

    let wordlist = cluster.create_wordlist(b"password\n").await.unwrap();
    let request = JobRequest::new("md5", wordlist, vec![MD5_PASSWORD.to_string()]);
    let job = cluster.create_job(&registered, request).await.unwrap();
    assert_eq!(store.get_instance_metadata(&registered).status, InstanceStatus::Pending);
    assert_eq!(store.get_job_metadata(&registered, &job).status, JobStatus::Pending);
}

#[tokio::test]
async fn external_backend_rejects_unsafe_registered_ids() {
    let dir = TempDir::new().unwrap();
    let launcher = ExternalLauncher::new(vec![InstanceId::from_string("../escape")]);
    let cluster = FsCluster::new(dir.path(), launcher);
    let err = cluster.load().await.unwrap_err();
    assert!(matches!(err, ClusterError::Prerequisite(_)), "{err}");
}
