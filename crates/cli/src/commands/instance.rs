// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance command handlers

use anyhow::Result;
use clap::{Args, Subcommand};
use hf_core::InstanceId;
use hf_daemon::DaemonClient;

use crate::output::{print_created, print_item_results, OutputFormat};

#[derive(Args)]
pub struct InstanceArgs {
    #[command(subcommand)]
    pub command: InstanceCommand,
}

#[derive(Subcommand)]
pub enum InstanceCommand {
    /// Create an instance and print its ID
    Create {
        /// Compute flavor (e.g. cpu, gpu)
        #[arg(default_value = "cpu")]
        instance_type: String,
    },
    /// Stop one or more instances (already-stopped instances succeed)
    Delete {
        #[arg(required = true)]
        instances: Vec<String>,
    },
}

pub async fn handle(
    command: InstanceCommand,
    client: &DaemonClient,
    format: OutputFormat,
) -> Result<()> {
    match command {
        InstanceCommand::Create { instance_type } => {
            let instance = client.create_instance(&instance_type).await?;
            print_created("instance", instance.as_str(), format)?;
        }
        InstanceCommand::Delete { instances } => {
            let ids: Vec<InstanceId> = instances.into_iter().map(InstanceId::from_string).collect();
            if let [id] = ids.as_slice() {
                client.delete_instance(id).await?;
                if format == OutputFormat::Text {
                    println!("Deleted {id}");
                }
            } else {
                let results = client.delete_instances(&ids).await?;
                print_item_results(&results, format)?;
            }
        }
    }
    Ok(())
}
