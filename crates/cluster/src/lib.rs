// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf-cluster: pluggable instance, job and blob lifecycle
//!
//! Every deployment mode shares one filesystem-backed implementation,
//! [`FsCluster`], parameterised by a [`Launcher`] that decides how workers
//! come to life:
//!
//! | Backend  | Launcher                 | Workers                        |
//! |----------|--------------------------|--------------------------------|
//! | debug    | [`InProcessLauncher`]    | agent tasks in this process    |
//! | shared   | [`ProcessLauncher`]      | local `hf-agent` processes     |
//! | cloud    | [`CloudLauncher`]        | provisioned remote machines    |
//! | external | [`ExternalLauncher`]     | pre-registered, pull only      |

mod backend;
mod base;
mod error;
mod factory;
pub mod launcher;
mod status;

pub use backend::{ClusterBackend, JobRequest};
pub use base::{ClusterContext, FsCluster};
pub use error::ClusterError;
pub use factory::{build, AgentSettings, CloudSettings, ClusterSettings};
pub use launcher::{
    BackendKind, CloudLauncher, ExternalLauncher, InProcessLauncher, Launcher, ProcessLauncher,
};
pub use status::project_status;

/// Debug backend: agents run as tasks inside the control process.
pub type DebugCluster = FsCluster<InProcessLauncher>;
/// Shared-storage backend: agents run as local subprocesses.
pub type SharedCluster = FsCluster<ProcessLauncher>;
/// Cloud backend: agents run on provisioned machines.
pub type CloudCluster<P> = FsCluster<CloudLauncher<P>>;
/// External backend: statically registered workers that pull jobs.
pub type ExternalCluster = FsCluster<ExternalLauncher>;
