//! REMOVE command - Remove an item.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{Backend, HumanReadable, finish, output};

/// Arguments for the remove command.
#[derive(Args)]
pub struct RemoveArgs {
    /// Path of the item to remove
    pub path: String,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Result of a removal.
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub path: String,
    pub removed: bool,
}

impl HumanReadable for RemoveResponse {
    fn print_human(&self) {
        if self.removed {
            println!("{}", "Item removed.".green().bold());
        } else {
            println!("Aborted.");
        }
        println!();
        println!("  {} {}", "Path:".cyan(), self.path);
    }
}

/// Execute the remove command.
pub async fn execute(backend: &Backend, human: bool, args: RemoveArgs) -> Result<()> {
    // Confirmation prompt for interactive use
    if human && !args.yes {
        eprint!(
            "{} Are you sure you want to remove {}? [y/N] ",
            "Warning:".yellow().bold(),
            args.path
        );

        use std::io::Write;
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            let response = RemoveResponse {
                path: args.path,
                removed: false,
            };
            return output(&response, human);
        }
    }

    let envelope = backend.provider().remove(backend.config(), &args.path).await;
    finish(envelope)?;

    let response = RemoveResponse {
        path: args.path,
        removed: true,
    };
    output(&response, human)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_remove_is_unsupported() {
        let args = RemoveArgs {
            path: "x.ipynb".into(),
            yes: true,
        };
        let err = execute(&Backend::local(), false, args).await.unwrap_err();
        assert!(err.to_string().starts_with("501"));
    }
}
