//! Service configuration from environment variables.

use std::env;
use std::path::PathBuf;

pub use notebook_core::ConfigError;

/// Contents server configuration.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Directory served under `/api/contents`.
    pub contents_root: PathBuf,
    /// Server port to listen on.
    pub port: u16,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// CORS allowed origins (comma-separated or "*" for all).
    pub cors_allowed_origins: String,
    /// Token clients must send as `Authorization: token <token>`. No auth when unset.
    pub token: Option<String>,
}

impl ServiceConfig {
    /// Configuration serving `contents_root` with every other setting at its default.
    pub fn new(contents_root: impl Into<PathBuf>) -> Self {
        Self {
            contents_root: contents_root.into(),
            port: 8888,
            log_level: "info".to_string(),
            cors_allowed_origins: "*".to_string(),
            token: None,
        }
    }

    /// Require `token` on every contents request.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `CONTENTS_ROOT`: Directory to serve
    ///
    /// Optional:
    /// - `PORT`: Server port (default: 8888)
    /// - `LOG_LEVEL`: Logging level (default: "info")
    /// - `CORS_ALLOWED_ORIGINS`: Allowed CORS origins (default: "*")
    /// - `NOTEBOOK_TOKEN`: Required API token (default: none)
    pub fn from_env() -> Result<Self, ConfigError> {
        let contents_root = env::var("CONTENTS_ROOT")
            .map_err(|_| ConfigError::MissingEnvVar("CONTENTS_ROOT".to_string()))?;

        let port = match env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                reason: format!("{s:?} is not a port number"),
            })?,
            Err(_) => 8888,
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let cors_allowed_origins =
            env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string());

        let token = env::var("NOTEBOOK_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(Self {
            contents_root: PathBuf::from(contents_root),
            port,
            log_level,
            cors_allowed_origins,
            token,
        })
    }

    /// Get the socket address for the server.
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("contents_root", &self.contents_root)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
