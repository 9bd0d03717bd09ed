// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job command handlers

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use hf_core::{InstanceId, JobId, RuleId, WordlistId};
use hf_daemon::{DaemonClient, NewJob};
use hf_wire::JobRef;

use super::blob::read_input;
use crate::output::{print_created, print_item_results, OutputFormat};

#[derive(Args)]
pub struct JobArgs {
    #[command(subcommand)]
    pub command: JobCommand,
}

#[derive(Subcommand)]
pub enum JobCommand {
    /// Submit a dictionary attack to an instance and print the job ID
    Create {
        /// Instance to run on
        instance: String,
        /// Hash type name (md5, sha1, ntlm, ...) or numeric hashcat mode
        #[arg(long = "type", short = 't')]
        hash_type: String,
        /// Wordlist ID from `hf wordlist upload`
        #[arg(long, short)]
        wordlist: String,
        /// Rule ID from `hf rule upload`
        #[arg(long, short)]
        rule: Option<String>,
        /// Job ID to use instead of a generated one
        #[arg(long)]
        id: Option<String>,
        /// Read target hashes from a file, one per line (`-` for stdin)
        #[arg(long, short = 'f')]
        file: Option<PathBuf>,
        /// Target hashes
        hashes: Vec<String>,
    },
    /// Stop one or more jobs on an instance (finished jobs succeed)
    Delete {
        instance: String,
        #[arg(required = true)]
        jobs: Vec<String>,
    },
}

pub async fn handle(
    command: JobCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        JobCommand::Create { instance, hash_type, wordlist, rule, id, file, hashes } => {
            let file_hashes = match file {
                Some(path) => String::from_utf8(read_input(&path)?)?,
                None => String::new(),
            };
            let hashes = collect_hashes(hashes, &file_hashes);
            if hashes.is_empty() {
                anyhow::bail!("no target hashes given");
            }
            let job = client
                .create_job(NewJob {
                    instance: InstanceId::from_string(instance),
                    job: id.map(JobId::from_string),
                    hash_type,
                    wordlist: WordlistId::from_string(wordlist),
                    rule: rule.map(RuleId::from_string),
                    hashes,
                })
                .await?;
            print_created("job", job.as_str(), format)?;
        }
        JobCommand::Delete { instance, jobs } => {
            let instance = InstanceId::from_string(instance);
            let jobs: Vec<JobId> = jobs.into_iter().map(JobId::from_string).collect();
            if let [job] = jobs.as_slice() {
                client.delete_job(&instance, job).await?;
                if format == OutputFormat::Text {
                    println!("Deleted {job}");
                }
            } else {
                let refs = jobs
                    .into_iter()
                    .map(|job| JobRef { instance: instance.clone(), job })
                    .collect();
                let results = client.delete_jobs(refs).await?;
                print_item_results(&results, format)?;
            }
        }
    }
    Ok(())
}

/// Hashes from arguments followed by those in `file_body`, trimmed, blank
/// lines skipped.
pub(crate) fn collect_hashes(args: Vec<String>, file_body: &str) -> Vec<String> {
    args.into_iter()
        .chain(file_body.lines().map(String::from))
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
