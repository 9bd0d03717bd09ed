// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf-agent: the worker agent that runs on each instance
//!
//! The agent owns a local job queue for one instance, watches the instance's
//! records for changes, runs at most one cracking job at a time, and exits
//! after an idle cooldown.

mod agent;
mod config;
pub mod env;
mod queue;

pub use agent::{Agent, AgentError, AgentExit};
pub use config::{AgentConfig, DEFAULT_IDLE_COOLDOWN, DEFAULT_TICK};
