//! Token authentication for the contents API.
//!
//! Clients send `Authorization: token <token>`, the header the request
//! builder computes from `ServerConfig::token`. When the service has no token
//! configured, every request passes.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Extract the token from an `Authorization: token <t>` header value.
pub fn parse_token_header(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("token") && !token.is_empty()).then_some(token)
}

/// Compare tokens without exiting early on the first differing byte.
///
/// Only the length can be observed through timing.
pub fn tokens_match(provided: &str, expected: &str) -> bool {
    let (provided, expected) = (provided.as_bytes(), expected.as_bytes());
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Middleware rejecting requests without the configured token.
pub async fn require_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config().token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_token_header)
        .map(str::to_string);

    match provided.as_deref() {
        Some(token) if tokens_match(token, expected) => Ok(next.run(request).await),
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "rejected request with wrong token");
            Err(ApiError::Unauthorized("invalid token".to_string()))
        }
        None => Err(ApiError::Unauthorized(
            "missing Authorization: token header".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_scheme() {
        assert_eq!(parse_token_header("token abc"), Some("abc"));
        assert_eq!(parse_token_header("Token abc "), Some("abc"));
        assert_eq!(parse_token_header("Bearer abc"), None);
        assert_eq!(parse_token_header("token "), None);
        assert_eq!(parse_token_header("token"), None);
    }

    #[test]
    fn tokens_match_exactly() {
        assert!(tokens_match("s3cret", "s3cret"));
        assert!(!tokens_match("s3creT", "s3cret"));
        assert!(!tokens_match("s3cre", "s3cret"));
        assert!(!tokens_match("", "s3cret"));
    }
}
