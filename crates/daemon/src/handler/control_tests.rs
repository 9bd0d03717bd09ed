// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::client::DaemonAddr;
use crate::listener::{ListenCtx, Listener};
use crate::records::FileRecordStore;
use hf_core::{InstanceId, InstanceStatus, JobId, JobStatus, WordlistId};
use parking_lot::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::UnixListener;
use tokio::sync::Notify;

/// Stands in for a cluster daemon.
#[derive(Default)]
struct FakeCluster {
    seen: Mutex<Vec<&'static str>>,
}

#[async_trait]
impl RequestHandler for FakeCluster {
    async fn handle(&self, request: Request) -> Response {
        self.seen.lock().push(request.name());
        match request {
            Request::CreateInstance { instance_type } if instance_type == "cpu" => {
                Response::InstanceCreated { instance: InstanceId::from_string("ins-1") }
            }
            Request::CreateInstance { .. } => Response::rejected("unsupported instance type"),
            Request::CreateJob { job, .. } => {
                Response::JobCreated { job: job.unwrap_or_else(|| JobId::from_string("job-1")) }
            }
            _ => Response::Ok,
        }
    }
}

struct Fixture {
    dir: TempDir,
    cluster: Arc<FakeCluster>,
    records: Arc<FileRecordStore>,
    handler: ControlHandler<FileRecordStore>,
}

impl Fixture {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("cluster.sock");
        let cluster = Arc::new(FakeCluster::default());
        let ctx = ListenCtx::new(cluster.clone(), Arc::new(Notify::new()))
            .with_timeout(Duration::from_secs(2));
        tokio::spawn(Listener::new(UnixListener::bind(&socket).unwrap(), Arc::new(ctx)).run());

        let client =
            DaemonClient::new(DaemonAddr::Unix(socket)).with_timeout(Duration::from_secs(2));
        let records = Arc::new(FileRecordStore::new(dir.path().join("records.json")));
        let handler = ControlHandler::new(client, Arc::clone(&records));
        Self { dir, cluster, records, handler }
    }
}

fn create_job(instance: &InstanceId) -> Request {
    Request::CreateJob {
        instance: instance.clone(),
        job: None,
        hash_type: "md5".to_string(),
        wordlist: WordlistId::from_string("wl-1"),
        rule: None,
        hashes: vec!["aaaa".to_string(), "bbbb".to_string()],
    }
}

#[tokio::test]
async fn created_instances_and_jobs_are_tracked() {
    let fx = Fixture::start().await;

    let instance = match fx
        .handler
        .handle(Request::CreateInstance { instance_type: "cpu".to_string() })
        .await
    {
        Response::InstanceCreated { instance } => instance,
        other => panic!("unexpected response: {other:?}"),
    };
    let response = fx.handler.handle(create_job(&instance)).await;
    assert_eq!(response, Response::JobCreated { job: JobId::from_string("job-1") });

    let records = fx.records.tracked().unwrap();
    assert_eq!(records.instances[&instance].status, InstanceStatus::Pending);
    let job = &records.jobs[&JobId::from_string("job-1")];
    assert_eq!(job.instance, instance);
    assert_eq!(job.status, JobStatus::Pending);
    let hashes: Vec<_> = job.hashes.iter().map(|h| h.hash.as_str()).collect();
    assert_eq!(hashes, vec!["aaaa", "bbbb"]);
}

#[tokio::test]
async fn rejections_pass_through_untracked() {
    let fx = Fixture::start().await;

    let response =
        fx.handler.handle(Request::CreateInstance { instance_type: "tpu".to_string() }).await;

    assert!(matches!(response, Response::Error { rejected: true, .. }));
    assert!(fx.records.tracked().unwrap().instances.is_empty());
}

#[tokio::test]
async fn shutdown_is_not_forwarded() {
    let fx = Fixture::start().await;

    assert_eq!(fx.handler.handle(Request::Shutdown).await, Response::ShuttingDown);
    assert!(fx.cluster.seen.lock().is_empty());
}

#[tokio::test]
async fn unreachable_cluster_is_a_daemon_error() {
    let fx = Fixture::start().await;
    let client = DaemonClient::new(DaemonAddr::Unix(fx.dir.path().join("missing.sock")));
    let handler = ControlHandler::new(client, Arc::clone(&fx.records));

    match handler.handle(Request::Status).await {
        Response::Error { message, rejected } => {
            assert!(!rejected);
            assert!(message.contains("cluster unavailable"));
        }
        other => panic!("unexpected response: {other:?}"),
    }
}

#[tokio::test]
async fn padded_hashes_are_tracked_as_the_cluster_stores_them() {
    use crate::reconcile::diff;
    use crate::records::RecordUpdate;
    use hf_core::{ClusterStatus, InstanceReport, JobReport};
    use std::collections::BTreeMap;

    const MD5_PASSWORD: &str = "5f4dcc3b5aa765d61d8327deb882cf99";
    let fx = Fixture::start().await;
    let instance = InstanceId::from_string("ins-1");
    let request = Request::CreateJob {
        instance: instance.clone(),
        job: None,
        hash_type: "md5".to_string(),
        wordlist: WordlistId::from_string("wl-1"),
        rule: None,
        hashes: vec![format!("  {MD5_PASSWORD}\r"), String::new(), "   ".to_string()],
    };
    fx.handler.handle(request).await;

    let records = fx.records.tracked().unwrap();
    let job = JobId::from_string("job-1");
    let hashes: Vec<_> = records.jobs[&job].hashes.iter().map(|h| h.hash.as_str()).collect();
    assert_eq!(hashes, vec![MD5_PASSWORD]);

    let results = BTreeMap::from([(MD5_PASSWORD.to_string(), "password".to_string())]);
    let jobs = BTreeMap::from([(job.clone(), JobReport { status: JobStatus::Complete, results })]);
    let mut status = ClusterStatus::default();
    status.instances.insert(instance, InstanceReport { status: InstanceStatus::Running, jobs });

    let found = RecordUpdate::HashFound {
        job,
        hash: MD5_PASSWORD.to_string(),
        plaintext: "password".to_string(),
    };
    assert!(diff(&records, &status).contains(&found));
}
