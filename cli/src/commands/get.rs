//! GET command - Fetch an item with or without its content.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use notebook_core::{ContentItem, ContentKind, GetParams};

use super::{Backend, HumanReadable, finish, format_timestamp, output, truncate};

/// Arguments for the get command.
#[derive(Args)]
pub struct GetArgs {
    /// Path of the item
    pub path: String,

    /// Fetch metadata only, skipping the payload
    #[arg(long)]
    pub metadata_only: bool,
}

impl GetArgs {
    fn params(&self) -> GetParams {
        if self.metadata_only {
            GetParams::metadata_only()
        } else {
            GetParams::full()
        }
    }
}

impl HumanReadable for ContentItem {
    fn print_human(&self) {
        println!("{}", self.name.green().bold());
        println!("{}", "=".repeat(60));
        println!();

        println!("  {} {}", "Path:".cyan(), self.path);
        println!("  {} {}", "Type:".cyan(), self.kind);
        println!("  {} {}", "Writable:".cyan(), self.writable);
        println!("  {} {}", "Created:".cyan(), format_timestamp(&self.created));
        println!(
            "  {} {}",
            "Modified:".cyan(),
            format_timestamp(&self.last_modified)
        );
        if let Some(mimetype) = &self.mimetype {
            println!("  {} {}", "Mimetype:".cyan(), mimetype);
        }

        let Some(content) = &self.content else {
            return;
        };

        println!();
        if self.kind == ContentKind::Notebook {
            print_cells(content);
        } else {
            println!("{}", "Content:".yellow());
            println!("{}", "-".repeat(60));
            match content {
                serde_json::Value::String(s) => println!("{}", s),
                other => println!("{}", other),
            }
        }
    }
}

/// One line per cell: its type and the first line of its source.
fn print_cells(notebook: &serde_json::Value) {
    let cells = notebook
        .get("cells")
        .and_then(|c| c.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    println!("{} ({})", "Cells:".yellow(), cells.len());
    println!("{}", "-".repeat(60));
    for (i, cell) in cells.iter().enumerate() {
        let cell_type = cell
            .get("cell_type")
            .and_then(|t| t.as_str())
            .unwrap_or("?");
        println!(
            "  {:>3} {:<9} {}",
            i + 1,
            cell_type.dimmed(),
            truncate(first_source_line(cell).unwrap_or(""), 48)
        );
    }
}

/// Cell source is either a string or a list of lines.
fn first_source_line(cell: &serde_json::Value) -> Option<&str> {
    match cell.get("source")? {
        serde_json::Value::String(s) => s.lines().next(),
        serde_json::Value::Array(lines) => lines.first()?.as_str().map(str::trim_end),
        _ => None,
    }
}

/// Execute the get command.
pub async fn execute(backend: &Backend, human: bool, args: GetArgs) -> Result<()> {
    let envelope = backend
        .provider()
        .get(backend.config(), &args.path, &args.params())
        .await;
    let item = finish(envelope)?;

    output(&item, human)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_source_line() {
        assert_eq!(
            first_source_line(&json!({"source": "a = 1\nb = 2"})),
            Some("a = 1")
        );
        assert_eq!(
            first_source_line(&json!({"source": ["import os\n", "os.getcwd()"]})),
            Some("import os")
        );
        assert_eq!(first_source_line(&json!({"source": []})), None);
        assert_eq!(first_source_line(&json!({})), None);
    }

    #[test]
    fn test_params() {
        let args = GetArgs {
            path: "x.ipynb".into(),
            metadata_only: true,
        };
        assert!(args.params().is_metadata_only());

        let args = GetArgs {
            path: "x.ipynb".into(),
            metadata_only: false,
        };
        assert_eq!(args.params(), GetParams::full());
    }
}
