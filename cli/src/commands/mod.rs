//! Command implementations for the notebook CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod checkpoints;
pub mod get;
pub mod remove;
pub mod save;

use anyhow::Result;
use http::StatusCode;
use notebook_contents::{
    ContentError, ContentProvider, Envelope, LocalContentProvider, RemoteContentProvider,
};
use notebook_core::ServerConfig;
use serde::Serialize;

/// Failure envelope turned into a command error.
#[derive(Debug, thiserror::Error)]
#[error("{status}: {source}")]
pub struct CliError {
    pub status: StatusCode,
    #[source]
    pub source: ContentError,
}

/// The provider a command runs against, with its backend descriptor.
pub struct Backend {
    provider: Box<dyn ContentProvider>,
    config: ServerConfig,
}

impl Backend {
    /// The local filesystem, paths relative to the working directory.
    pub fn local() -> Self {
        Self {
            provider: Box::new(LocalContentProvider::new()),
            config: ServerConfig::local(),
        }
    }

    /// A contents server at `url`.
    pub fn remote(url: &str, token: Option<&str>) -> Self {
        let mut config = ServerConfig::with_url(url);
        if let Some(token) = token {
            config = config.with_token(token);
        }
        Self {
            provider: Box::new(RemoteContentProvider::new()),
            config,
        }
    }

    pub fn provider(&self) -> &dyn ContentProvider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Unwrap a success envelope, or turn the failure into a `CliError`.
pub fn finish<T>(envelope: Envelope<T>) -> Result<T, CliError> {
    let status = envelope.status();
    envelope
        .into_result()
        .map_err(|source| CliError { status, source })
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Format a backend timestamp for human display, falling back to the raw text.
pub fn format_timestamp(raw: &str) -> String {
    match notebook_core::parse_timestamp(raw) {
        Some(ts) => display_time(&ts),
        None => raw.to_string(),
    }
}

fn display_time(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate a string for display, adding ellipsis if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
