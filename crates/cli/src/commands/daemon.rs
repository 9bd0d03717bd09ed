// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon health and shutdown

use anyhow::Result;
use hf_daemon::DaemonClient;

use crate::output::{print_json, OutputFormat};

pub async fn ping(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let version = client.hello().await?;
    client.ping().await?;
    match format {
        OutputFormat::Text => println!("daemon at {} is up (version {version})", client.addr()),
        OutputFormat::Json => print_json(&serde_json::json!({
            "addr": client.addr().to_string(),
            "version": version,
        }))?,
    }
    Ok(())
}

pub async fn shutdown(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    client.shutdown().await?;
    if format == OutputFormat::Text {
        println!("daemon at {} is shutting down", client.addr());
    }
    Ok(())
}
