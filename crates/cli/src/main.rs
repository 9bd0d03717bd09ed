// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hf: command-line client for the hashfleet control API

mod color;
mod commands;
mod env;
mod exit_error;
mod output;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hf_daemon::{ClientError, DaemonAddr, DaemonClient};

use commands::blob::{BlobArgs, BlobKind};
use commands::instance::InstanceArgs;
use commands::job::JobArgs;
use exit_error::{ExitError, EXIT_REJECTED};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "hf",
    version,
    about = "Control a hashfleet cracking cluster",
    styles = color::styles()
)]
struct Cli {
    /// Daemon address: socket path or host:port (default: local cluster daemon)
    #[arg(long, global = true)]
    addr: Option<String>,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the daemon is reachable
    Ping,
    /// Show instances, jobs and cracked hashes
    Status {
        /// List every cracked hash with its plaintext
        #[arg(long, short)]
        results: bool,
    },
    /// Create and delete instances
    Instance(InstanceArgs),
    /// Submit and cancel cracking jobs
    Job(JobArgs),
    /// Upload and delete wordlists
    Wordlist(BlobArgs),
    /// Upload and delete rule files
    Rule(BlobArgs),
    /// Stop the daemon
    Shutdown,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn exit_code(e: &anyhow::Error) -> u8 {
    if let Some(exit) = e.downcast_ref::<ExitError>() {
        return u8::try_from(exit.code).unwrap_or(1);
    }
    match e.downcast_ref::<ClientError>() {
        Some(client) if client.is_rejected() => EXIT_REJECTED as u8,
        _ => 1,
    }
}

async fn run(cli: Cli) -> Result<()> {
    let addr = match cli.addr {
        Some(addr) => addr.parse::<DaemonAddr>().map_err(anyhow::Error::msg)?,
        None => env::daemon_addr()?,
    };
    let client = DaemonClient::new(addr).with_token(env::auth_token());
    let format = cli.output;

    match cli.command {
        Command::Ping => commands::daemon::ping(&client, format).await,
        Command::Status { results } => commands::status::handle(&client, results, format).await,
        Command::Instance(args) => commands::instance::handle(args.command, &client, format).await,
        Command::Job(args) => commands::job::handle(args.command, &client, format).await,
        Command::Wordlist(args) => {
            commands::blob::handle(BlobKind::Wordlist, args.command, &client, format).await
        }
        Command::Rule(args) => {
            commands::blob::handle(BlobKind::Rule, args.command, &client, format).await
        }
        Command::Shutdown => commands::daemon::shutdown(&client, format).await,
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
