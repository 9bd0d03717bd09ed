// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::fmt::Write as _;

use clap::ValueEnum;
use hf_core::ClusterStatus;
use hf_wire::ItemResult;
use serde::Serialize;

use crate::color;
use crate::exit_error::ExitError;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const ID_WIDTH: usize = 28;
const STATUS_WIDTH: usize = 10;

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a created ID: bare in text mode so it can be captured by scripts.
pub fn print_created(kind: &str, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => println!("{id}"),
        OutputFormat::Json => print_json(&BTreeMap::from([(kind, id)]))?,
    }
    Ok(())
}

/// Left-align a colored `label` whose visible width is `label.len()`.
fn padded(colored: String, label: &str, width: usize) -> String {
    let pad = width.saturating_sub(label.len());
    format!("{colored}{}", " ".repeat(pad))
}

/// Instances with their jobs nested beneath. With `results`, every cracked
/// hash is listed as `hash:plaintext` under its job.
pub fn render_status(status: &ClusterStatus, results: bool) -> String {
    let mut out = String::new();
    if status.instances.is_empty() {
        out.push_str("No instances\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{}",
        color::header(&format!("{:<ID_WIDTH$}{:<STATUS_WIDTH$}{}", "ID", "STATUS", "CRACKED"))
    );
    for (id, instance) in &status.instances {
        let label = instance.status.to_string();
        let cracked: usize = instance.jobs.values().map(|j| j.results.len()).sum();
        let _ = writeln!(
            out,
            "{:<ID_WIDTH$}{}{}",
            id.as_str(),
            padded(color::status(&label), &label, STATUS_WIDTH),
            cracked
        );
        for (job_id, job) in &instance.jobs {
            let label = job.status.to_string();
            let _ = writeln!(
                out,
                "  {:<width$}{}{}",
                job_id.as_str(),
                padded(color::status(&label), &label, STATUS_WIDTH),
                job.results.len(),
                width = ID_WIDTH - 2
            );
            if results {
                for (hash, plaintext) in &job.results {
                    let _ = writeln!(out, "    {}:{}", color::muted(hash), plaintext);
                }
            }
        }
    }
    out
}

/// Print per-item results of a batch delete. Any failed item makes the
/// command fail after everything is printed.
pub fn print_item_results(results: &[ItemResult], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for item in results {
                match &item.error {
                    None => println!("Deleted {}", item.id),
                    Some(error) => println!("Failed {}: {}", item.id, error),
                }
            }
        }
        OutputFormat::Json => print_json(results)?,
    }
    batch_outcome(results)
}

fn batch_outcome(results: &[ItemResult]) -> anyhow::Result<()> {
    let failed = results.iter().filter(|r| !r.is_ok()).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(ExitError::new(1, format!("{failed} of {} deletes failed", results.len())).into())
    }
}
