//! Command-line interface for notebook content providers.
//!
//! This CLI tool drives either backend through the same provider trait:
//! - get: Fetch an item with or without its content
//! - save: Save a notebook file
//! - remove: Remove an item
//! - checkpoints: List the checkpoints of an item
//!
//! Configuration via environment:
//! - NOTEBOOK_URL: Base URL of the contents server (default: http://localhost:8888)
//! - NOTEBOOK_TOKEN: Token sent as `Authorization: token <t>`
//! - RUST_LOG: Log filter for stderr diagnostics (default: warn)

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    Backend, checkpoints::CheckpointsArgs, get::GetArgs, remove::RemoveArgs, save::SaveArgs,
};

/// Notebook contents CLI
///
/// Read and write notebooks on a Jupyter-style contents server, or on the
/// local filesystem with --local. Prints JSON by default and formatted text
/// with --human.
#[derive(Parser)]
#[command(name = "notebook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Contents server URL
    #[arg(
        long,
        env = "NOTEBOOK_URL",
        default_value = "http://localhost:8888",
        global = true
    )]
    url: String,

    /// Token for `Authorization: token <t>`
    #[arg(long, env = "NOTEBOOK_TOKEN", global = true)]
    token: Option<String>,

    /// Use the local filesystem instead of a server
    #[arg(long, global = true)]
    local: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch an item
    Get(GetArgs),

    /// Save a notebook from a file
    Save(SaveArgs),

    /// Remove an item
    Remove(RemoveArgs),

    /// List checkpoints of an item
    Checkpoints(CheckpointsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = if cli.local {
        Backend::local()
    } else {
        Backend::remote(&cli.url, cli.token.as_deref())
    };

    let result = match cli.command {
        Commands::Get(args) => commands::get::execute(&backend, cli.human, args).await,
        Commands::Save(args) => commands::save::execute(&backend, cli.human, args).await,
        Commands::Remove(args) => commands::remove::execute(&backend, cli.human, args).await,
        Commands::Checkpoints(args) => {
            commands::checkpoints::execute(&backend, cli.human, args).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
