// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control API client.
//!
//! Every call opens a fresh connection. TCP connections open with a `Hello`
//! carrying the shared token.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use hf_core::{ClusterStatus, InstanceId, JobId, RuleId, WordlistId};
use hf_wire::{ItemResult, JobRef, ProtocolError, Request, Response, PROTOCOL_VERSION};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, UnixStream};

use crate::reconcile::StatusSource;

/// Where a daemon listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaemonAddr {
    Unix(PathBuf),
    Tcp(String),
}

impl std::fmt::Display for DaemonAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonAddr::Unix(path) => write!(f, "{}", path.display()),
            DaemonAddr::Tcp(addr) => f.write_str(addr),
        }
    }
}

impl FromStr for DaemonAddr {
    type Err = String;

    /// `host:port` is TCP; anything that looks like a path is a socket.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty daemon address".to_string());
        }
        if let Some(path) = s.strip_prefix("unix:") {
            return Ok(DaemonAddr::Unix(PathBuf::from(path)));
        }
        let looks_like_path = s.starts_with('/') || s.starts_with('.') || s.starts_with('~');
        match s.rsplit_once(':') {
            Some((host, port)) if !looks_like_path && !host.is_empty() => {
                port.parse::<u16>().map_err(|_| format!("invalid port in {s:?}"))?;
                Ok(DaemonAddr::Tcp(s.to_string()))
            }
            _ => Ok(DaemonAddr::Unix(PathBuf::from(s))),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot connect to daemon at {addr}: {source}")]
    Connect {
        addr: DaemonAddr,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// The daemon refused a request the caller got wrong
    #[error("{0}")]
    Rejected(String),
    #[error("daemon error: {0}")]
    Failed(String),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ClientError::Rejected(_))
    }
}

/// Parameters of a job submission.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub instance: InstanceId,
    pub job: Option<JobId>,
    pub hash_type: String,
    pub wordlist: WordlistId,
    pub rule: Option<RuleId>,
    pub hashes: Vec<String>,
}

impl From<NewJob> for Request {
    fn from(job: NewJob) -> Self {
        Request::CreateJob {
            instance: job.instance,
            job: job.job,
            hash_type: job.hash_type,
            wordlist: job.wordlist,
            rule: job.rule,
            hashes: job.hashes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DaemonClient {
    addr: DaemonAddr,
    token: Option<String>,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(addr: DaemonAddr) -> Self {
        Self { addr, token: None, timeout: crate::env::ipc_timeout() }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> &DaemonAddr {
        &self.addr
    }

    /// Send one request and return the raw response.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        match &self.addr {
            DaemonAddr::Unix(path) => {
                let stream = UnixStream::connect(path).await.map_err(|source| {
                    ClientError::Connect { addr: self.addr.clone(), source }
                })?;
                let (mut reader, mut writer) = stream.into_split();
                self.exchange(&mut reader, &mut writer, request).await
            }
            DaemonAddr::Tcp(addr) => {
                let stream = TcpStream::connect(addr.as_str()).await.map_err(|source| {
                    ClientError::Connect { addr: self.addr.clone(), source }
                })?;
                let (mut reader, mut writer) = stream.into_split();
                let hello = Request::Hello {
                    version: PROTOCOL_VERSION.to_string(),
                    token: self.token.clone(),
                };
                let greeting = self.exchange(&mut reader, &mut writer, &hello).await?;
                if !matches!(greeting, Response::Hello { .. }) {
                    return Self::reject(greeting);
                }
                if matches!(request, Request::Hello { .. }) {
                    return Ok(greeting);
                }
                self.exchange(&mut reader, &mut writer, request).await
            }
        }
    }

    async fn exchange<R, W>(
        &self,
        reader: &mut R,
        writer: &mut W,
        request: &Request,
    ) -> Result<Response, ClientError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        hf_wire::write_request(writer, request, self.timeout).await?;
        Ok(hf_wire::read_response(reader, self.timeout).await?)
    }

    /// Map a response that is not the expected variant to an error.
    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message, rejected: true } => Err(ClientError::Rejected(message)),
            Response::Error { message, rejected: false } => Err(ClientError::Failed(message)),
            other => Err(ClientError::Unexpected(format!("{other:?}"))),
        }
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    /// Exchange versions; returns the daemon's.
    pub async fn hello(&self) -> Result<String, ClientError> {
        let request =
            Request::Hello { version: PROTOCOL_VERSION.to_string(), token: self.token.clone() };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<ClusterStatus, ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { status } => Ok(status),
            other => Self::reject(other),
        }
    }

    pub async fn create_instance(&self, instance_type: &str) -> Result<InstanceId, ClientError> {
        let request = Request::CreateInstance { instance_type: instance_type.to_string() };
        match self.send(&request).await? {
            Response::InstanceCreated { instance } => Ok(instance),
            other => Self::reject(other),
        }
    }

    pub async fn delete_instance(&self, instance: &InstanceId) -> Result<(), ClientError> {
        self.expect_ok(&Request::DeleteInstance { instance: instance.clone() }).await
    }

    pub async fn delete_instances(
        &self,
        instances: &[InstanceId],
    ) -> Result<Vec<ItemResult>, ClientError> {
        self.expect_deleted(&Request::DeleteInstances { instances: instances.to_vec() }).await
    }

    pub async fn create_job(&self, job: NewJob) -> Result<JobId, ClientError> {
        match self.send(&job.into()).await? {
            Response::JobCreated { job } => Ok(job),
            other => Self::reject(other),
        }
    }

    pub async fn delete_job(&self, instance: &InstanceId, job: &JobId) -> Result<(), ClientError> {
        self.expect_ok(&Request::DeleteJob { instance: instance.clone(), job: job.clone() }).await
    }

    pub async fn delete_jobs(&self, jobs: Vec<JobRef>) -> Result<Vec<ItemResult>, ClientError> {
        self.expect_deleted(&Request::DeleteJobs { jobs }).await
    }

    pub async fn create_wordlist(&self, content: Vec<u8>) -> Result<WordlistId, ClientError> {
        match self.send(&Request::CreateWordlist { content }).await? {
            Response::WordlistCreated { wordlist } => Ok(wordlist),
            other => Self::reject(other),
        }
    }

    pub async fn delete_wordlist(&self, wordlist: &WordlistId) -> Result<(), ClientError> {
        self.expect_ok(&Request::DeleteWordlist { wordlist: wordlist.clone() }).await
    }

    pub async fn create_rule(&self, content: Vec<u8>) -> Result<RuleId, ClientError> {
        match self.send(&Request::CreateRule { content }).await? {
            Response::RuleCreated { rule } => Ok(rule),
            other => Self::reject(other),
        }
    }

    pub async fn delete_rule(&self, rule: &RuleId) -> Result<(), ClientError> {
        self.expect_ok(&Request::DeleteRule { rule: rule.clone() }).await
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::ShuttingDown | Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    async fn expect_ok(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    async fn expect_deleted(&self, request: &Request) -> Result<Vec<ItemResult>, ClientError> {
        match self.send(request).await? {
            Response::Deleted { results } => Ok(results),
            other => Self::reject(other),
        }
    }
}

#[async_trait]
impl StatusSource for DaemonClient {
    async fn fetch_status(&self) -> Result<ClusterStatus, ClientError> {
        self.status().await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
