//! SAVE command - Save a notebook file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use notebook_core::{ContentModel, notebook};

use super::{Backend, finish, output};

/// Arguments for the save command.
#[derive(Args)]
pub struct SaveArgs {
    /// Destination path of the notebook
    pub path: String,

    /// Notebook file to read
    #[arg(long)]
    pub from: PathBuf,
}

/// Read and parse the notebook at `source`.
async fn load_model(source: &Path) -> Result<ContentModel> {
    let text = tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("failed to read {}", source.display()))?;
    let content = notebook::parse(&text)
        .with_context(|| format!("{} is not a JSON notebook", source.display()))?;

    Ok(ContentModel::notebook(content))
}

/// Execute the save command.
pub async fn execute(backend: &Backend, human: bool, args: SaveArgs) -> Result<()> {
    let model = load_model(&args.from).await?;
    tracing::debug!(from = %args.from.display(), path = %args.path, "saving notebook");

    let envelope = backend
        .provider()
        .save(backend.config(), &args.path, &model)
        .await;
    let item = finish(envelope)?;

    output(&item, human)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notebook_core::ContentKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_model() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.ipynb");
        std::fs::write(&source, notebook::stringify(&notebook::empty())).unwrap();

        let model = load_model(&source).await.unwrap();
        assert_eq!(model.kind, Some(ContentKind::Notebook));
        assert_eq!(model.content, Some(notebook::empty()));
    }

    #[tokio::test]
    async fn test_load_model_rejects_non_json() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.txt");
        std::fs::write(&source, "not a notebook").unwrap();

        let err = load_model(&source).await.unwrap_err();
        assert!(err.to_string().contains("is not a JSON notebook"));
    }

    #[tokio::test]
    async fn test_save_locally() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("in.ipynb");
        let dest = dir.path().join("out.ipynb");
        std::fs::write(&source, notebook::stringify(&notebook::empty())).unwrap();

        let args = SaveArgs {
            path: dest.to_string_lossy().into_owned(),
            from: source,
        };
        execute(&Backend::local(), false, args).await.unwrap();

        let written = std::fs::read_to_string(&dest).unwrap();
        assert_eq!(written, notebook::stringify(&notebook::empty()));
    }
}
