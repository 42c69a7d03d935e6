//! Application state shared across handlers.

use std::sync::Arc;

use notebook_contents::{ContentProvider, LocalContentProvider};
use notebook_core::ServerConfig;

use crate::config::ServiceConfig;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Backend behind `/api/contents`.
    provider: Arc<dyn ContentProvider>,
    /// Backend descriptor handed to every provider call.
    backend: Arc<ServerConfig>,
    /// Service configuration.
    config: Arc<ServiceConfig>,
}

impl AppState {
    /// State serving `config.contents_root` from the local filesystem.
    pub fn new(config: ServiceConfig) -> Self {
        let provider = LocalContentProvider::rooted(&config.contents_root);
        Self::with_provider(Arc::new(provider), config)
    }

    /// State serving an arbitrary provider.
    pub fn with_provider(provider: Arc<dyn ContentProvider>, config: ServiceConfig) -> Self {
        Self {
            provider,
            backend: Arc::new(ServerConfig::local()),
            config: Arc::new(config),
        }
    }

    /// Get the content provider.
    pub fn provider(&self) -> &dyn ContentProvider {
        self.provider.as_ref()
    }

    /// Get the backend descriptor.
    pub fn backend(&self) -> &ServerConfig {
        &self.backend
    }

    /// Get a reference to the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
