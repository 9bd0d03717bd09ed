// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control plane: forwards the control API to a cluster daemon and tracks
//! what it creates in the system of record.

use std::sync::Arc;

use async_trait::async_trait;
use hf_wire::{Request, Response, PROTOCOL_VERSION};
use tracing::warn;

use super::RequestHandler;
use crate::client::DaemonClient;
use crate::records::RecordStore;

pub struct ControlHandler<S: RecordStore> {
    client: DaemonClient,
    records: Arc<S>,
}

impl<S: RecordStore> ControlHandler<S> {
    pub fn new(client: DaemonClient, records: Arc<S>) -> Self {
        Self { client, records }
    }

    /// Start tracking whatever `response` says was created.
    fn track(&self, request: &Request, response: &Response) {
        let result = match (request, response) {
            (_, Response::InstanceCreated { instance }) => self.records.track_instance(instance),
            (Request::CreateJob { instance, hashes, .. }, Response::JobCreated { job }) => {
                self.records.track_job(instance, job, hashes)
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to record created entity");
        }
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler for ControlHandler<S> {
    async fn handle(&self, request: Request) -> Response {
        if let Request::Hello { .. } = request {
            return Response::Hello { version: PROTOCOL_VERSION.to_string() };
        }
        // Stopping the control plane never stops the cluster
        if let Request::Shutdown = request {
            return Response::ShuttingDown;
        }

        match self.client.send(&request).await {
            Ok(response) => {
                self.track(&request, &response);
                response
            }
            Err(e) => {
                warn!(error = %e, addr = %self.client.addr(), "cluster request failed");
                Response::error(format!("cluster unavailable: {e}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
