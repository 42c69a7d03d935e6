//! Local filesystem content provider.
//!
//! Reads and writes notebook files with `tokio::fs` and reports outcomes in
//! the same envelope shape a remote server would. Only `get` and `save` are
//! supported; every other operation declines with `NotImplemented`.

use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::{HeaderName, HeaderValue};
use notebook_core::{ContentItem, ContentModel, GetParams, ServerConfig, notebook};
use tokio::fs;

use crate::envelope::{CONTENT_PROVIDER_HEADER, Envelope};
use crate::error::{ContentError, ContentResult};
use crate::provider::ContentProvider;

/// Content provider backed by the local filesystem.
///
/// Without a root, paths are used as given. With a root, paths are resolved
/// inside it and may not climb out with `..`.
#[derive(Debug, Clone, Default)]
pub struct LocalContentProvider {
    root: Option<PathBuf>,
}

impl LocalContentProvider {
    /// A provider that uses paths as given.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that resolves paths inside `root`.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// The root directory, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn resolve(&self, path: &str) -> ContentResult<PathBuf> {
        let Some(root) = &self.root else {
            return Ok(PathBuf::from(path));
        };

        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(ContentError::NotFound {
                path: path.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path escapes the contents root",
                ),
            });
        }
        Ok(root.join(relative))
    }

    async fn fetch(&self, path: &str, params: &GetParams) -> ContentResult<ContentItem> {
        let fs_path = self.resolve(path)?;

        let stat = fs::metadata(&fs_path)
            .await
            .map_err(|source| ContentError::NotFound {
                path: path.to_string(),
                source,
            })?;

        if !stat.is_file() {
            return Err(ContentError::NotAFile {
                path: path.to_string(),
            });
        }

        if params.is_metadata_only() {
            return Ok(notebook_item(path, &stat, None));
        }

        let bytes = fs::read(&fs_path)
            .await
            .map_err(|source| ContentError::NotFound {
                path: path.to_string(),
                source,
            })?;
        let content = parse_payload(path, &bytes)?;

        Ok(notebook_item(path, &stat, content))
    }

    async fn store(&self, path: &str, model: &ContentModel) -> ContentResult<ContentItem> {
        let document = match &model.content {
            Some(document) if model.is_saveable_notebook() => document,
            _ => {
                return Err(ContentError::InvalidModel(
                    "no notebook found to save".to_string(),
                ));
            }
        };
        let fs_path = self.resolve(path)?;

        let text = notebook::stringify(document);
        fs::write(&fs_path, &text)
            .await
            .map_err(|source| ContentError::WriteFailed {
                path: path.to_string(),
                source,
            })?;

        // Metadata comes from a fresh stat taken after the write.
        let stat = fs::metadata(&fs_path)
            .await
            .map_err(|source| ContentError::NotFound {
                path: path.to_string(),
                source,
            })?;
        let content = parse_payload(path, text.as_bytes())?;

        Ok(notebook_item(path, &stat, content))
    }
}

#[async_trait]
impl ContentProvider for LocalContentProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn get(
        &self,
        _config: &ServerConfig,
        path: &str,
        params: &GetParams,
    ) -> Envelope<ContentItem> {
        tracing::debug!(path, metadata_only = params.is_metadata_only(), "local get");
        let result = self.fetch(path, params).await;
        if let Err(e) = &result {
            tracing::warn!(path, status = %e.status(), "local get failed: {}", e);
        }
        local_envelope(result)
    }

    async fn save(
        &self,
        _config: &ServerConfig,
        path: &str,
        model: &ContentModel,
    ) -> Envelope<ContentItem> {
        tracing::debug!(path, kind = ?model.kind, "local save");
        let result = self.store(path, model).await;
        if let Err(e) = &result {
            tracing::warn!(path, status = %e.status(), "local save failed: {}", e);
        }
        local_envelope(result)
    }
}

fn local_envelope<T>(result: ContentResult<T>) -> Envelope<T> {
    Envelope::from_result(result).with_header(
        HeaderName::from_static(CONTENT_PROVIDER_HEADER),
        HeaderValue::from_static("local"),
    )
}

/// Parse file bytes as a notebook. An empty file has no payload.
fn parse_payload(path: &str, bytes: &[u8]) -> ContentResult<Option<serde_json::Value>> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let text = String::from_utf8_lossy(bytes);
    notebook::parse(&text)
        .map(Some)
        .map_err(|source| ContentError::Malformed {
            path: path.to_string(),
            source,
        })
}

fn notebook_item(path: &str, stat: &Metadata, content: Option<serde_json::Value>) -> ContentItem {
    let modified = stat.modified().ok();
    // Birth time is not available on every platform; fall back to mtime.
    let created = stat.created().ok().or(modified);

    ContentItem::notebook(
        path,
        owner_writable(stat),
        to_utc(created),
        to_utc(modified),
        content,
    )
}

fn to_utc(time: Option<SystemTime>) -> DateTime<Utc> {
    DateTime::<Utc>::from(time.unwrap_or(SystemTime::UNIX_EPOCH))
}

/// Owner write bit only. Group, other, and ACLs are ignored.
#[cfg(unix)]
fn owner_writable(stat: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    stat.permissions().mode() & 0o200 != 0
}

#[cfg(not(unix))]
fn owner_writable(stat: &Metadata) -> bool {
    !stat.permissions().readonly()
}
