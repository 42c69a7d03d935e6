//! The content provider contract.

use async_trait::async_trait;
use notebook_core::{Checkpoint, ContentItem, ContentModel, GetParams, ServerConfig};

use crate::envelope::Envelope;
use crate::error::ContentError;

/// Reads, writes, and inspects content on one kind of backend.
///
/// Every operation resolves to an `Envelope`. Implementations catch all
/// failures at this boundary; nothing panics and no bare error escapes.
///
/// `get` and `save` are required. The remaining operations default to a 501
/// `NotImplemented` envelope for backends that do not support them, such
/// as the plain local filesystem adapter.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Short backend name, used in logs and `NotImplemented` errors.
    fn name(&self) -> &'static str;

    /// Fetch an item. `params.content = Some(false)` returns metadata only.
    async fn get(
        &self,
        config: &ServerConfig,
        path: &str,
        params: &GetParams,
    ) -> Envelope<ContentItem>;

    /// Persist `model.content` and return the item as re-read after the write.
    async fn save(
        &self,
        config: &ServerConfig,
        path: &str,
        model: &ContentModel,
    ) -> Envelope<ContentItem>;

    /// Create a new item at `path`.
    async fn create(
        &self,
        _config: &ServerConfig,
        _path: &str,
        _model: &ContentModel,
    ) -> Envelope<ContentItem> {
        unsupported(self.name(), "create")
    }

    /// Update an item's metadata (for example, rename it).
    async fn update(
        &self,
        _config: &ServerConfig,
        _path: &str,
        _model: &ContentModel,
    ) -> Envelope<ContentItem> {
        unsupported(self.name(), "update")
    }

    /// Delete an item.
    async fn remove(&self, _config: &ServerConfig, _path: &str) -> Envelope<()> {
        unsupported(self.name(), "remove")
    }

    /// List the checkpoints of an item.
    async fn list_checkpoints(
        &self,
        _config: &ServerConfig,
        _path: &str,
    ) -> Envelope<Vec<Checkpoint>> {
        unsupported(self.name(), "list_checkpoints")
    }

    /// Snapshot an item.
    async fn create_checkpoint(&self, _config: &ServerConfig, _path: &str) -> Envelope<Checkpoint> {
        unsupported(self.name(), "create_checkpoint")
    }

    /// Delete a checkpoint.
    async fn delete_checkpoint(
        &self,
        _config: &ServerConfig,
        _path: &str,
        _checkpoint_id: &str,
    ) -> Envelope<()> {
        unsupported(self.name(), "delete_checkpoint")
    }

    /// Restore an item to a checkpoint.
    async fn restore_from_checkpoint(
        &self,
        _config: &ServerConfig,
        _path: &str,
        _checkpoint_id: &str,
    ) -> Envelope<()> {
        unsupported(self.name(), "restore_from_checkpoint")
    }
}

fn unsupported<T>(backend: &'static str, operation: &'static str) -> Envelope<T> {
    tracing::debug!(backend, operation, "content operation not supported");
    Envelope::error(ContentError::not_implemented(backend, operation))
}
