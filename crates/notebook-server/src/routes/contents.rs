//! Contents API routes.
//!
//! This module exposes the configured content provider over the Jupyter
//! contents REST surface:
//! - GET /api/contents/{path} - Fetch an item (`type`, `format`, `content` query)
//! - PUT /api/contents/{path} - Save an item
//! - POST /api/contents/{path} - Create an item
//! - PATCH /api/contents/{path} - Update (rename) an item
//! - DELETE /api/contents/{path} - Remove an item
//! - GET /api/contents/{path}/checkpoints - List checkpoints
//! - POST /api/contents/{path}/checkpoints - Create a checkpoint
//! - POST /api/contents/{path}/checkpoints/{id} - Restore a checkpoint
//! - DELETE /api/contents/{path}/checkpoints/{id} - Delete a checkpoint
//!
//! Each handler forwards to the provider and turns the envelope back into
//! an HTTP response with the same status.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use notebook_contents::Envelope;
use notebook_core::{ContentModel, GetParams};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Path Dispatch
// ============================================================================

/// What a wildcard contents path addresses.
#[derive(Debug, PartialEq, Eq)]
enum Target<'a> {
    /// The item itself.
    Item(&'a str),
    /// The checkpoint collection of an item.
    Checkpoints(&'a str),
    /// One checkpoint of an item.
    Checkpoint { path: &'a str, id: &'a str },
}

fn parse_target(path: &str) -> Target<'_> {
    let path = path.trim_end_matches('/');

    if let Some(item) = path.strip_suffix("/checkpoints") {
        return Target::Checkpoints(item);
    }
    if let Some((head, id)) = path.rsplit_once('/') {
        if let Some(item) = head.strip_suffix("/checkpoints") {
            return Target::Checkpoint { path: item, id };
        }
    }
    Target::Item(path)
}

// ============================================================================
// Envelope Conversion
// ============================================================================

/// Success keeps the envelope status (204 for empty bodies); errors use the
/// Jupyter error body.
fn respond<T: Serialize>(envelope: Envelope<T>) -> Response {
    let status = envelope.status();
    match envelope.into_result() {
        Ok(value) => match serde_json::to_value(&value) {
            Ok(serde_json::Value::Null) => StatusCode::NO_CONTENT.into_response(),
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => ApiError::Internal(format!("failed to encode response: {}", e)).into_response(),
        },
        Err(e) => ApiError::Content(e).into_response(),
    }
}

fn parse_model(body: &Bytes) -> ApiResult<ContentModel> {
    if body.is_empty() {
        return Ok(ContentModel::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid model: {}", e)))
}

fn method_not_allowed() -> Response {
    StatusCode::METHOD_NOT_ALLOWED.into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn fetch(state: &AppState, path: &str, params: &GetParams) -> Response {
    match parse_target(path) {
        Target::Item(item) => respond(state.provider().get(state.backend(), item, params).await),
        Target::Checkpoints(item) => {
            respond(state.provider().list_checkpoints(state.backend(), item).await)
        }
        Target::Checkpoint { .. } => method_not_allowed(),
    }
}

/// GET /api/contents
async fn get_root(State(state): State<AppState>, Query(params): Query<GetParams>) -> Response {
    fetch(&state, "", &params).await
}

/// GET /api/contents/{path}
async fn get_contents(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(params): Query<GetParams>,
) -> Response {
    tracing::debug!(path = %path, ?params, "get contents");
    fetch(&state, &path, &params).await
}

/// PUT /api/contents/{path}
async fn save_contents(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    let Target::Item(item) = parse_target(&path) else {
        return method_not_allowed();
    };
    let model = match parse_model(&body) {
        Ok(model) => model,
        Err(e) => return e.into_response(),
    };
    tracing::debug!(path = item, kind = ?model.kind, "save contents");
    respond(state.provider().save(state.backend(), item, &model).await)
}

/// POST /api/contents/{path}
async fn post_contents(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    let provider = state.provider();
    let backend = state.backend();
    match parse_target(&path) {
        Target::Item(item) => match parse_model(&body) {
            Ok(model) => respond(provider.create(backend, item, &model).await),
            Err(e) => e.into_response(),
        },
        Target::Checkpoints(item) => {
            let envelope = provider.create_checkpoint(backend, item).await;
            if envelope.is_success() {
                // A new checkpoint is a created resource.
                (StatusCode::CREATED, respond(envelope)).into_response()
            } else {
                respond(envelope)
            }
        }
        Target::Checkpoint { path, id } => {
            respond(provider.restore_from_checkpoint(backend, path, id).await)
        }
    }
}

/// PATCH /api/contents/{path}
async fn update_contents(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    let Target::Item(item) = parse_target(&path) else {
        return method_not_allowed();
    };
    match parse_model(&body) {
        Ok(model) => respond(state.provider().update(state.backend(), item, &model).await),
        Err(e) => e.into_response(),
    }
}

/// DELETE /api/contents/{path}
async fn delete_contents(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let provider = state.provider();
    let backend = state.backend();
    match parse_target(&path) {
        Target::Item(item) => respond(provider.remove(backend, item).await),
        Target::Checkpoints(_) => method_not_allowed(),
        Target::Checkpoint { path, id } => {
            respond(provider.delete_checkpoint(backend, path, id).await)
        }
    }
}

/// Build contents routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/contents", get(get_root)).route(
        "/api/contents/{*path}",
        get(get_contents)
            .put(save_contents)
            .post(post_contents)
            .patch(update_contents)
            .delete(delete_contents),
    )
}

// ============================================================================
// Tests
// ============================================================================
