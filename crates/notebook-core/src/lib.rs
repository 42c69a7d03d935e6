//! notebook-core: Core value types shared by every notebook content provider
//!
//! This crate provides:
//! - `ServerConfig`, the immutable descriptor of a storage backend endpoint
//! - `RequestOptions`, the transport options layered into outgoing requests
//! - Content models (`ContentItem`, `ContentModel`, `GetParams`, `Checkpoint`)
//! - The canonical notebook text form (`notebook::stringify` / `notebook::parse`)
//!
//! Nothing here performs I/O. The providers in `notebook-contents` consume
//! these types regardless of whether the backend is a remote server or the
//! local filesystem.

pub mod config;
pub mod notebook;
pub mod types;

pub use config::{ConfigError, RequestOptions, ResponseType, ServerConfig, normalize_base_url};
pub use types::{
    Checkpoint, ContentFormat, ContentItem, ContentKind, ContentModel, GetParams,
    NOTEBOOK_MIMETYPE, format_timestamp, parse_timestamp,
};
