//! Content data types shared by every backend.
//!
//! These types describe a stored item the same way regardless of whether it
//! lives on a remote server or the local filesystem:
//!
//! - `ContentItem` is the full item (metadata plus optional payload)
//! - `ContentModel` is the partial model callers hand to save/create/update
//! - `GetParams` selects what a fetch returns
//! - `Checkpoint` names a backend-managed snapshot
//!
//! The JSON shapes match the Jupyter contents API, which is both the wire
//! shape for remote backends and the shape exchanged with the application.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Mimetype reported for notebook documents.
pub const NOTEBOOK_MIMETYPE: &str = "application/x-ipynb+json";

// ============================================================================
// Enumerations
// ============================================================================

/// What kind of item a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Notebook,
    File,
    Directory,
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notebook => write!(f, "notebook"),
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

/// Encoding of the `content` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    Json,
    Text,
    Base64,
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

// ============================================================================
// Content Item
// ============================================================================

/// One stored item: metadata plus an optional payload.
///
/// `path` is the identity key. Two items with the same path refer to the same
/// backend object, possibly observed at different times. `content` is `None`
/// when only metadata was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Base filename.
    pub name: String,

    /// Backend-relative or absolute path.
    pub path: String,

    /// Item kind.
    #[serde(rename = "type")]
    pub kind: ContentKind,

    /// Whether the backend reports the item as writable.
    pub writable: bool,

    /// Creation timestamp. Only ordering and parseability are meaningful.
    pub created: String,

    /// Last modification timestamp.
    pub last_modified: String,

    /// Mimetype. Remote servers send `null` for directories and notebooks.
    #[serde(default)]
    pub mimetype: Option<String>,

    /// Parsed payload, `None` for metadata-only responses.
    #[serde(default)]
    pub content: Option<serde_json::Value>,

    /// Payload encoding, `None` when no payload was fetched.
    #[serde(default)]
    pub format: Option<ContentFormat>,
}

impl ContentItem {
    /// Build a notebook item. The name is the base filename of `path`.
    #[must_use]
    pub fn notebook(
        path: impl Into<String>,
        writable: bool,
        created: DateTime<Utc>,
        last_modified: DateTime<Utc>,
        content: Option<serde_json::Value>,
    ) -> Self {
        let path = path.into();
        Self {
            name: base_name(&path),
            path,
            kind: ContentKind::Notebook,
            writable,
            created: format_timestamp(&created),
            last_modified: format_timestamp(&last_modified),
            mimetype: Some(NOTEBOOK_MIMETYPE.to_string()),
            content,
            format: Some(ContentFormat::Json),
        }
    }

    /// Whether the payload was fetched.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Parsed creation time, if the backend sent a parseable timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created)
    }

    /// Parsed modification time, if the backend sent a parseable timestamp.
    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.last_modified)
    }
}

/// Format a timestamp the way content items carry them (RFC 3339, UTC).
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

/// Parse a content item timestamp.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// Partial Model
// ============================================================================

/// The partial model passed to save, create, and update.
///
/// Each backend decides which fields it needs. Missing required fields are
/// reported as an invalid model rather than filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ContentFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

impl ContentModel {
    /// A notebook model carrying a document.
    #[must_use]
    pub fn notebook(content: serde_json::Value) -> Self {
        Self {
            kind: Some(ContentKind::Notebook),
            format: Some(ContentFormat::Json),
            content: Some(content),
            ..Self::default()
        }
    }

    /// An empty model of the given kind, as used by create.
    #[must_use]
    pub fn of_kind(kind: ContentKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// A rename model, as used by update.
    #[must_use]
    pub fn renamed(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Whether the model is a notebook with a document attached.
    pub fn is_saveable_notebook(&self) -> bool {
        self.kind == Some(ContentKind::Notebook) && self.content.is_some()
    }
}

impl From<ContentItem> for ContentModel {
    fn from(item: ContentItem) -> Self {
        Self {
            name: Some(item.name),
            path: Some(item.path),
            kind: Some(item.kind),
            format: item.format,
            mimetype: item.mimetype,
            content: item.content,
        }
    }
}

// ============================================================================
// Fetch Parameters
// ============================================================================

/// Parameters for a fetch.
///
/// `content` is `Some(false)` for metadata only (`content=0` on the wire) and
/// `Some(true)` for the full payload (`content=1`). Leaving it unset lets the
/// backend choose, which for every provider here means the full payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetParams {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ContentKind>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<ContentFormat>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub content: Option<bool>,
}

impl GetParams {
    /// Metadata only (`content=0`).
    #[must_use]
    pub const fn metadata_only() -> Self {
        Self {
            kind: None,
            format: None,
            content: Some(false),
        }
    }

    /// Full payload (`content=1`).
    #[must_use]
    pub const fn full() -> Self {
        Self {
            kind: None,
            format: None,
            content: Some(true),
        }
    }

    /// Restrict the fetch to a kind.
    #[must_use]
    pub const fn of_kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Only an explicit `content=0` skips the payload.
    pub fn is_metadata_only(&self) -> bool {
        self.content == Some(false)
    }
}

fn serialize_flag<S: Serializer>(flag: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
    match flag {
        Some(flag) => serializer.serialize_u8(u8::from(*flag)),
        None => serializer.serialize_none(),
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let flag = Option::<u8>::deserialize(deserializer)?;
    Ok(flag.map(|flag| flag != 0))
}

// ============================================================================
// Checkpoints
// ============================================================================

/// A backend-managed snapshot of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint identifier, unique per item.
    pub id: String,

    /// When the snapshot was taken.
    pub last_modified: String,
}

// ============================================================================
// Tests
// ============================================================================
