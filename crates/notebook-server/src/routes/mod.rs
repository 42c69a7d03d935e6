//! Route definitions for the HTTP API.

pub mod contents;
pub mod health;

use axum::{Router, middleware};

use crate::auth;
use crate::state::AppState;

/// Build the complete router with all routes.
///
/// `/health` stays open; the contents routes require the configured token.
pub fn build_router(state: AppState) -> Router {
    let contents = contents::routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_token,
    ));

    Router::new()
        .merge(health::routes())
        .merge(contents)
        .with_state(state)
}
