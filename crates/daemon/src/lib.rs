// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! hf-daemon: control API server for a hashfleet cluster
//!
//! A daemon runs in one of two modes. In cluster mode it owns a cluster
//! backend and serves the control API for it. In control mode it forwards
//! the control API to a cluster daemon, tracks what it creates, and
//! reconciles cluster status into its records. The client is exported for
//! the `hf` CLI.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod client;
pub mod env;
pub mod handler;
pub mod lifecycle;
pub mod listener;
pub mod reconcile;
pub mod records;

pub use client::{ClientError, DaemonAddr, DaemonClient, NewJob};
pub use handler::{ClusterHandler, ControlHandler, RequestHandler};
pub use lifecycle::{startup, Config, DaemonState, LifecycleError, Mode, StartupResult};
pub use listener::{ListenCtx, Listener};
pub use reconcile::{diff, reconcile_once, StatusSource};
pub use records::{FileRecordStore, RecordError, RecordStore, RecordUpdate, Records};
