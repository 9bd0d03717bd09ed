// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control API over a cluster backend.

use std::sync::Arc;

use async_trait::async_trait;
use hf_cluster::{ClusterBackend, ClusterError, JobRequest};
use hf_core::JobId;
use hf_wire::{ItemResult, Request, Response, PROTOCOL_VERSION};
use tracing::{info, warn};

use super::RequestHandler;

pub struct ClusterHandler {
    backend: Arc<dyn ClusterBackend>,
}

impl ClusterHandler {
    pub fn new(backend: Arc<dyn ClusterBackend>) -> Self {
        Self { backend }
    }
}

/// Caller mistakes are rejected; anything else is a daemon-side failure.
fn error_response(error: ClusterError) -> Response {
    if error.is_caller_error() {
        Response::rejected(error.to_string())
    } else {
        warn!(error = %error, "request failed");
        Response::error(error.to_string())
    }
}

fn ok_or_error(result: Result<(), ClusterError>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(e) => error_response(e),
    }
}

fn item_results<I: ToString>(results: Vec<(I, Result<(), ClusterError>)>) -> Response {
    let results = results
        .into_iter()
        .map(|(id, result)| match result {
            Ok(()) => ItemResult::ok(id.to_string()),
            Err(e) => ItemResult::failed(id.to_string(), e.to_string()),
        })
        .collect();
    Response::Deleted { results }
}

#[async_trait]
impl RequestHandler for ClusterHandler {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Ping => Response::Pong,

            Request::Hello { .. } => Response::Hello { version: PROTOCOL_VERSION.to_string() },

            Request::Status => match self.backend.status().await {
                Ok(status) => Response::Status { status },
                Err(e) => error_response(e),
            },

            Request::CreateInstance { instance_type } => {
                match self.backend.create_instance(&instance_type).await {
                    Ok(instance) => {
                        info!(instance_id = %instance, %instance_type, "instance created");
                        Response::InstanceCreated { instance }
                    }
                    Err(e) => error_response(e),
                }
            }

            Request::DeleteInstance { instance } => {
                ok_or_error(self.backend.delete_instance(&instance).await)
            }

            Request::DeleteInstances { instances } => {
                item_results(self.backend.delete_instances(&instances).await)
            }

            Request::CreateJob { instance, job, hash_type, wordlist, rule, hashes } => {
                let mut job_request = JobRequest::new(hash_type, wordlist, hashes);
                if let Some(rule) = rule {
                    job_request = job_request.with_rule(rule);
                }
                let job = job.unwrap_or_else(JobId::new);
                match self.backend.create_job_with_id(&instance, &job, job_request).await {
                    Ok(()) => {
                        info!(instance_id = %instance, job_id = %job, "job created");
                        Response::JobCreated { job }
                    }
                    Err(e) => error_response(e),
                }
            }

            Request::DeleteJob { instance, job } => {
                ok_or_error(self.backend.delete_job(&instance, &job).await)
            }

            Request::DeleteJobs { jobs } => {
                let jobs: Vec<_> = jobs.into_iter().map(|r| (r.instance, r.job)).collect();
                item_results(self.backend.delete_jobs(&jobs).await)
            }

            Request::CreateWordlist { content } => {
                match self.backend.create_wordlist(&content).await {
                    Ok(wordlist) => Response::WordlistCreated { wordlist },
                    Err(e) => error_response(e),
                }
            }

            Request::DeleteWordlist { wordlist } => {
                ok_or_error(self.backend.delete_wordlist(&wordlist).await)
            }

            Request::CreateRule { content } => match self.backend.create_rule(&content).await {
                Ok(rule) => Response::RuleCreated { rule },
                Err(e) => error_response(e),
            },

            Request::DeleteRule { rule } => ok_or_error(self.backend.delete_rule(&rule).await),

            Request::Shutdown => Response::ShuttingDown,
        }
    }

    async fn shutdown(&self) {
        self.backend.shutdown().await;
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
