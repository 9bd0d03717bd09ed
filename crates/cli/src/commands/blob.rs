// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wordlist and rule command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use hf_core::{RuleId, WordlistId};
use hf_daemon::DaemonClient;

use crate::output::{print_created, OutputFormat};

#[derive(Args)]
pub struct BlobArgs {
    #[command(subcommand)]
    pub command: BlobCommand,
}

#[derive(Subcommand)]
pub enum BlobCommand {
    /// Upload a file and print its content-derived ID
    Upload {
        /// File to upload (`-` for stdin)
        path: PathBuf,
    },
    /// Delete an uploaded file by ID
    Delete { id: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobKind {
    Wordlist,
    Rule,
}

impl BlobKind {
    fn name(self) -> &'static str {
        match self {
            BlobKind::Wordlist => "wordlist",
            BlobKind::Rule => "rule",
        }
    }
}

pub async fn handle(
    kind: BlobKind,
    command: BlobCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        BlobCommand::Upload { path } => {
            let content = read_input(&path)?;
            let id = match kind {
                BlobKind::Wordlist => client.create_wordlist(content).await?.to_string(),
                BlobKind::Rule => client.create_rule(content).await?.to_string(),
            };
            print_created(kind.name(), &id, format)?;
        }
        BlobCommand::Delete { id } => {
            match kind {
                BlobKind::Wordlist => {
                    client.delete_wordlist(&WordlistId::from_string(id.as_str())).await?
                }
                BlobKind::Rule => client.delete_rule(&RuleId::from_string(id.as_str())).await?,
            }
            if format == OutputFormat::Text {
                println!("Deleted {} {id}", kind.name());
            }
        }
    }
    Ok(())
}

/// Contents of `path`, or stdin for `-`.
pub(crate) fn read_input(path: &std::path::Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(&mut std::io::stdin(), &mut buf).context("reading stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}
