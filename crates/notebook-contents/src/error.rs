//! Error taxonomy for content providers.
//!
//! Providers never return these directly. Each operation converts its
//! failure into an `Envelope` whose status comes from `ContentError::status`.

use http::{HeaderMap, StatusCode};
use notebook_core::ResponseType;
use thiserror::Error;

/// Result type alias for provider internals.
pub type ContentResult<T> = Result<T, ContentError>;

/// Header the GitHub API uses to list the scopes granted to a token.
pub const OAUTH_SCOPES_HEADER: &str = "x-oauth-scopes";

/// Errors that can occur during content operations.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The path exists but is not a regular file.
    #[error("attempted to open something which is not a file: {path}")]
    NotAFile { path: String },

    /// Stat or read failed (missing path, permission denied).
    #[error("not found: {path}: {source}")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not a valid notebook document.
    #[error("malformed notebook at {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The caller's model is missing required fields.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// The underlying write failed.
    #[error("write failed for {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The backend does not support this operation.
    #[error("not implemented: {operation} is not supported by the {backend} content provider")]
    NotImplemented {
        backend: &'static str,
        operation: &'static str,
    },

    /// A remote backend answered with a non-2xx status.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The request could not be sent or its response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Contents calls exchange JSON only.
    #[error("unsupported response type {0}: contents responses are decoded as json")]
    UnsupportedResponseType(ResponseType),

    /// A 2xx response body did not decode into the expected type.
    #[error("could not decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ContentError {
    /// The envelope status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotAFile { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Malformed { .. } => StatusCode::NOT_FOUND,
            Self::InvalidModel(_) => StatusCode::BAD_REQUEST,
            Self::WriteFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            Self::Backend(e) => e.status,
            Self::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UnsupportedResponseType(_) => StatusCode::BAD_REQUEST,
            Self::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable error code string for this error.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotAFile { .. } => "NOT_A_FILE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Malformed { .. } => "MALFORMED",
            Self::InvalidModel(_) => "INVALID_MODEL",
            Self::WriteFailed { .. } => "WRITE_FAILED",
            Self::NotImplemented { .. } => "NOT_IMPLEMENTED",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::UnsupportedResponseType(_) => "UNSUPPORTED_RESPONSE_TYPE",
            Self::Decode(_) => "DECODE_ERROR",
        }
    }

    pub(crate) fn not_implemented(backend: &'static str, operation: &'static str) -> Self {
        Self::NotImplemented { backend, operation }
    }
}

/// Coarse classification of a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFault {
    /// 5xx: the backend itself failed.
    Server,
    /// 4xx: the request was rejected.
    Client,
    /// Anything else outside 2xx (1xx, 3xx).
    Other,
}

/// A non-2xx response from a remote backend.
#[derive(Debug, Clone, Error)]
#[error("backend returned {status}: {message}")]
pub struct BackendError {
    /// Upstream status code.
    pub status: StatusCode,
    /// Human-readable message (the body's `message` field when present).
    pub message: String,
    /// Machine-readable reason (the body's `reason` field when present).
    pub reason: Option<String>,
    /// Parsed JSON body, if the body was JSON.
    pub body: Option<serde_json::Value>,
    /// Upstream response headers.
    pub headers: HeaderMap,
}

impl BackendError {
    /// Build from a raw response.
    pub fn from_response(status: StatusCode, headers: HeaderMap, body: &[u8]) -> Self {
        let json = serde_json::from_slice::<serde_json::Value>(body).ok();

        let message = json
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty()).then_some(text)
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });

        let reason = json
            .as_ref()
            .and_then(|v| v.get("reason"))
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Self {
            status,
            message,
            reason,
            body: json,
            headers,
        }
    }

    /// Classify by status range.
    pub fn fault(&self) -> BackendFault {
        if self.status.is_server_error() {
            BackendFault::Server
        } else if self.status.is_client_error() {
            BackendFault::Client
        } else {
            BackendFault::Other
        }
    }

    /// Whether the backend reported token scopes that do not include `scope`.
    ///
    /// Returns false when the backend sent no scope header at all.
    pub fn lacks_scope(&self, scope: &str) -> bool {
        self.headers
            .get(OAUTH_SCOPES_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|scopes| !scopes.split(',').any(|s| s.trim() == scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn statuses_follow_taxonomy() {
        let io = || std::io::Error::from(std::io::ErrorKind::NotFound);

        assert_eq!(
            ContentError::NotAFile { path: "d".into() }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ContentError::NotFound {
                path: "x".into(),
                source: io()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ContentError::InvalidModel("no notebook".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ContentError::WriteFailed {
                path: "x".into(),
                source: io()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ContentError::not_implemented("local", "remove").status(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            ContentError::UnsupportedResponseType(ResponseType::Text).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn backend_error_reads_jupyter_body() {
        let body = br#"{"message": "No such file or directory: x.ipynb", "reason": null}"#;
        let err = BackendError::from_response(StatusCode::NOT_FOUND, HeaderMap::new(), body);

        assert_eq!(err.message, "No such file or directory: x.ipynb");
        assert_eq!(err.reason, None);
        assert_eq!(err.fault(), BackendFault::Client);
        assert_eq!(ContentError::from(err).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn backend_error_falls_back_to_text_then_reason_phrase() {
        let err = BackendError::from_response(StatusCode::BAD_GATEWAY, HeaderMap::new(), b"upstream down");
        assert_eq!(err.message, "upstream down");
        assert_eq!(err.fault(), BackendFault::Server);
        assert!(err.body.is_none());

        let err = BackendError::from_response(StatusCode::SERVICE_UNAVAILABLE, HeaderMap::new(), b"");
        assert_eq!(err.message, "Service Unavailable");
    }

    #[test]
    fn scope_check_reads_oauth_header() {
        let mut headers = HeaderMap::new();
        headers.insert(OAUTH_SCOPES_HEADER, HeaderValue::from_static("repo, user"));
        let err = BackendError::from_response(StatusCode::NOT_FOUND, headers, b"{}");
        assert!(err.lacks_scope("gist"));
        assert!(!err.lacks_scope("repo"));

        let err = BackendError::from_response(StatusCode::NOT_FOUND, HeaderMap::new(), b"{}");
        assert!(!err.lacks_scope("gist"));
    }

    #[test]
    fn reasons_are_stable() {
        assert_eq!(
            ContentError::InvalidModel(String::new()).reason(),
            "INVALID_MODEL"
        );
        assert_eq!(
            ContentError::not_implemented("local", "create").reason(),
            "NOT_IMPLEMENTED"
        );
    }
}
