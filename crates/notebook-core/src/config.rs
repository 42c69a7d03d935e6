//! Backend connection descriptors.
//!
//! A `ServerConfig` is built once per backend connection and shared by
//! reference across every provider call. It is never mutated after
//! construction; the builder methods consume and return `self`.

use std::env;
use std::fmt;
use std::time::Duration;

use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};

/// Trim every trailing `/` from a base URL.
///
/// Absent URLs normalize to the empty string, which yields a request URL
/// with an empty base. That is not rejected here; it surfaces as a
/// connection failure when the request is sent.
pub fn normalize_base_url(url: Option<&str>) -> String {
    url.unwrap_or_default().trim_end_matches('/').to_string()
}

/// How the body of a response should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Decode the body as JSON (the default for every contents call).
    #[default]
    Json,
    /// Keep the body as UTF-8 text.
    Text,
    /// Keep the body as raw bytes.
    Blob,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Text => write!(f, "text"),
            Self::Blob => write!(f, "blob"),
        }
    }
}

/// Transport-level options for one request, or for every request to a server.
///
/// Every field is optional so that several layers can be merged; a `Some`
/// in a later layer replaces the earlier value. Headers merge key by key.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method (GET when no layer sets one).
    pub method: Option<Method>,
    /// Extra headers.
    pub headers: HeaderMap,
    /// JSON request body.
    pub body: Option<serde_json::Value>,
    /// Expected response type (JSON when no layer sets one).
    pub response_type: Option<ResponseType>,
    /// Transport timeout. Nothing in the providers enforces a timeout on its own.
    pub timeout: Option<Duration>,
    /// `Some(false)` appends a cache-busting query parameter.
    pub cache: Option<bool>,
}

impl RequestOptions {
    /// Options with only the method set.
    #[must_use]
    pub fn method(method: Method) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    /// Options for an uncached GET.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            cache: Some(false),
            ..Self::default()
        }
    }

    /// Set the JSON body.
    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header, replacing any previous value for the same name.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Immutable descriptor of a storage backend endpoint.
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Preferred base URL. Takes precedence over `url`.
    pub endpoint: Option<String>,
    /// Fallback base URL.
    pub url: Option<String>,
    /// API token, sent as `Authorization: token <token>`.
    pub token: Option<String>,
    /// Anti-forgery token, sent as `X-XSRFToken`.
    pub xsrf_token: Option<String>,
    /// Options applied to every request for this server.
    pub extra_request_options: Option<RequestOptions>,
}

impl ServerConfig {
    /// Configuration for a backend that has no URL (the local filesystem).
    #[must_use]
    pub fn local() -> Self {
        Self::default()
    }

    /// Configuration for a server at `url`.
    #[must_use]
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Set the preferred endpoint.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the XSRF token.
    #[must_use]
    pub fn with_xsrf_token(mut self, token: impl Into<String>) -> Self {
        self.xsrf_token = Some(token.into());
        self
    }

    /// Set the server-wide request options.
    #[must_use]
    pub fn with_extra_request_options(mut self, options: RequestOptions) -> Self {
        self.extra_request_options = Some(options);
        self
    }

    /// The base URL with trailing slashes removed: a non-empty `endpoint`,
    /// else `url`, else empty.
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.as_deref().filter(|e| !e.is_empty());
        normalize_base_url(endpoint.or(self.url.as_deref()))
    }

    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `NOTEBOOK_ENDPOINT`: Preferred base URL
    /// - `NOTEBOOK_URL`: Fallback base URL
    /// - `NOTEBOOK_TOKEN`: API token
    /// - `NOTEBOOK_XSRF_TOKEN`: Anti-forgery token
    ///
    /// Variables that are set but empty are rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: optional_var("NOTEBOOK_ENDPOINT")?,
            url: optional_var("NOTEBOOK_URL")?,
            token: optional_var("NOTEBOOK_TOKEN")?,
            xsrf_token: optional_var("NOTEBOOK_XSRF_TOKEN")?,
            extra_request_options: None,
        })
    }
}

fn optional_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "value is empty".to_string(),
        }),
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "value is not valid unicode".to_string(),
        }),
    }
}

// Tokens stay out of logs.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("endpoint", &self.endpoint)
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("xsrf_token", &self.xsrf_token.as_ref().map(|_| "<redacted>"))
            .field("extra_request_options", &self.extra_request_options)
            .finish()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid environment variable value.
    #[error("invalid value for environment variable {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_all_trailing_slashes() {
        assert_eq!(normalize_base_url(Some("http://h///")), "http://h");
        assert_eq!(normalize_base_url(Some("http://h/base/")), "http://h/base");
        assert_eq!(normalize_base_url(None), "");
    }

    #[test]
    fn endpoint_wins_over_url() {
        let config = ServerConfig::with_url("http://fallback/").endpoint("http://preferred/");
        assert_eq!(config.base_url(), "http://preferred");

        let config = ServerConfig::with_url("http://fallback/");
        assert_eq!(config.base_url(), "http://fallback");

        let config = ServerConfig::with_url("http://fallback/").endpoint("");
        assert_eq!(config.base_url(), "http://fallback");

        assert_eq!(ServerConfig::local().base_url(), "");
    }

    #[test]
    fn debug_redacts_tokens() {
        let config = ServerConfig::with_url("http://h")
            .with_token("secret-token")
            .with_xsrf_token("secret-xsrf");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token"));
        assert!(!debug.contains("secret-xsrf"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn from_env_reads_token() {
        // SAFETY: This test is the only one that touches the NOTEBOOK_* variables.
        unsafe {
            env::set_var("NOTEBOOK_URL", "http://localhost:8888/");
            env::set_var("NOTEBOOK_TOKEN", "abc");
            env::remove_var("NOTEBOOK_ENDPOINT");
            env::remove_var("NOTEBOOK_XSRF_TOKEN");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.base_url(), "http://localhost:8888");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert!(config.xsrf_token.is_none());

        // SAFETY: See above.
        unsafe {
            env::set_var("NOTEBOOK_TOKEN", "");
        }
        assert!(matches!(
            ServerConfig::from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));

        // SAFETY: See above.
        unsafe {
            env::remove_var("NOTEBOOK_URL");
            env::remove_var("NOTEBOOK_TOKEN");
        }
    }

    #[test]
    fn response_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ResponseType::Json).unwrap(), "\"json\"");
        assert_eq!(ResponseType::Blob.to_string(), "blob");
        assert_eq!(ResponseType::default(), ResponseType::Json);
    }
}
