// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hf status`

use anyhow::Result;
use hf_daemon::DaemonClient;

use crate::output::{print_json, render_status, OutputFormat};

pub async fn handle(client: &DaemonClient, results: bool, format: OutputFormat) -> Result<()> {
    let status = client.status().await?;
    match format {
        OutputFormat::Text => print!("{}", render_status(&status, results)),
        OutputFormat::Json => print_json(&status)?,
    }
    Ok(())
}
