// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf-agent: worker agent binary
//!
//! Configured entirely from `HF_*` environment variables.

use hf_agent::{env, Agent, AgentError, AgentExit};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let Some(config) = env::config() else {
        tracing::error!("HF_INSTANCE_ID and HF_STORAGE_ROOT must be set");
        return ExitCode::FAILURE;
    };
    if let Err(e) = hf_adapters::resolve_binary(&config.hashcat_path) {
        tracing::error!(error = %e, "cracking binary unavailable");
        return ExitCode::FAILURE;
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("signal received, shutting down");
        signal_cancel.cancel();
    });

    ExitCode::from(exit_status(&Agent::new(config).run(cancel).await))
}

/// Process exit status for how the agent loop ended.
fn exit_status(result: &Result<AgentExit, AgentError>) -> u8 {
    match result {
        Ok(AgentExit::Failed(reason)) => {
            tracing::error!(%reason, "agent failed");
            1
        }
        Ok(exit) => {
            tracing::info!(?exit, "agent exited");
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "agent error");
            1
        }
    }
}

/// Resolve on Ctrl-C or SIGTERM.
async fn wait_for_signal() {
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
