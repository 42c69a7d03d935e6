//! notebook-server: HTTP contents server for notebook providers
//!
//! This crate provides:
//! - The Jupyter contents REST API (`/api/contents/...`) backed by any
//!   `ContentProvider`, by default the local filesystem
//! - Token authentication with `Authorization: token <t>`
//! - JSON error responses in the Jupyter `{message, reason}` shape
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//!
//! # Usage
//!
//! ```rust,ignore
//! use notebook_server::{ServiceConfig, AppState, app};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::from_env()?;
//!     let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//!     axum::serve(listener, app(AppState::new(config))).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{propagate_request_id_layer, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, ServiceConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use notebook_contents;
pub use notebook_core;

/// Build the router with the full middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config().cors_allowed_origins);

    routes::build_router(state)
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build CORS layer from a comma-separated origin list or `*`.
///
/// Unparseable origins are skipped with a warning.
pub fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<http::HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn responses_carry_request_id() {
        let state = AppState::new(ServiceConfig::new("."));
        let response = app(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let state = AppState::new(ServiceConfig::new("."));
        let response = app(state)
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn contents_require_configured_token() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::new(ServiceConfig::new(dir.path()).with_token("secret"));

        let denied = app(state.clone())
            .oneshot(
                Request::get("/api/contents/x.ipynb")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

        let allowed = app(state.clone())
            .oneshot(
                Request::get("/api/contents/x.ipynb")
                    .header("authorization", "token secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::NOT_FOUND);

        let health = app(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);
    }

    #[test]
    fn cors_accepts_lists() {
        // Invalid entries are dropped, not fatal.
        let _ = build_cors_layer("http://localhost:3000, http://a.test");
        let _ = build_cors_layer("bad\norigin");
        let _ = build_cors_layer("*");
    }
}
