// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request handlers behind the listener.
//!
//! The listener answers `Ping`, `Hello` and `Shutdown` itself; everything
//! else is dispatched to the handler for the daemon's mode.

mod cluster;
mod control;

pub use cluster::ClusterHandler;
pub use control::ControlHandler;

use async_trait::async_trait;
use hf_wire::Response;

#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(&self, request: hf_wire::Request) -> Response;

    /// Called once when the daemon is asked to stop.
    async fn shutdown(&self) {}
}
