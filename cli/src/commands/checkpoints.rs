//! CHECKPOINTS command - List the checkpoints of an item.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use notebook_core::Checkpoint;
use serde::Serialize;

use super::{Backend, HumanReadable, finish, format_timestamp, output};

/// Arguments for the checkpoints command.
#[derive(Args)]
pub struct CheckpointsArgs {
    /// Path of the item
    pub path: String,
}

/// Checkpoints of one item.
#[derive(Debug, Serialize)]
pub struct CheckpointList {
    pub path: String,
    pub checkpoints: Vec<Checkpoint>,
}

impl HumanReadable for CheckpointList {
    fn print_human(&self) {
        if self.checkpoints.is_empty() {
            println!("{} {}", "No checkpoints for".yellow(), self.path);
            return;
        }

        println!("{} {}", "Checkpoints for".green().bold(), self.path);
        println!("{}", "-".repeat(60));
        for checkpoint in &self.checkpoints {
            println!(
                "  {:<24} {}",
                checkpoint.id.cyan(),
                format_timestamp(&checkpoint.last_modified)
            );
        }
    }
}

/// Execute the checkpoints command.
pub async fn execute(backend: &Backend, human: bool, args: CheckpointsArgs) -> Result<()> {
    let envelope = backend
        .provider()
        .list_checkpoints(backend.config(), &args.path)
        .await;
    let checkpoints = finish(envelope)?;

    output(
        &CheckpointList {
            path: args.path,
            checkpoints,
        },
        human,
    )
}
