//! notebook-contents: Content providers for notebook documents
//!
//! This crate provides:
//! - The `ContentProvider` contract (fetch, save, create, update, remove,
//!   checkpoint management)
//! - `Envelope`, the status-coded wrapper every operation resolves to
//! - `LocalContentProvider`, backed by the local filesystem
//! - `RemoteContentProvider`, backed by a Jupyter-style contents REST API
//! - The request builder that turns a `ServerConfig` into request descriptors
//!
//! # Architecture
//!
//! Applications hold an `Arc<dyn ContentProvider>` and never learn which
//! backend is behind it. Failures (filesystem errors, HTTP errors, malformed
//! JSON) are converted at the provider boundary into an `Envelope` carrying
//! a status code, so callers only ever branch on `status`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use notebook_contents::{ContentProvider, LocalContentProvider};
//! use notebook_core::{GetParams, ServerConfig};
//!
//! let provider = LocalContentProvider::new();
//! let envelope = provider
//!     .get(&ServerConfig::local(), "/tmp/x.ipynb", &GetParams::metadata_only())
//!     .await;
//!
//! if envelope.is_success() {
//!     println!("{:?}", envelope.response());
//! }
//! ```

pub mod envelope;
pub mod error;
pub mod local;
pub mod provider;
pub mod remote;
pub mod request;

pub use envelope::{CONTENT_PROVIDER_HEADER, Envelope};
pub use error::{BackendError, BackendFault, ContentError, ContentResult};
pub use local::LocalContentProvider;
pub use provider::ContentProvider;
pub use remote::RemoteContentProvider;
pub use request::{CookieSource, RequestBuilder, RequestDescriptor, build_request};

// Re-export notebook-core for downstream crates
pub use notebook_core;
