//! Route definitions for the cache backend stub.
//!
//! Implements the endpoints that `acp-cache-client` calls, with responses that
//! deserialize cleanly into the client's types (camelCase JSON, 204 on a miss,
//! 204 on accepted chunks and commits). Archive downloads are served from
//! `/_artifacts/{id}` without authentication, like a pre-signed URL.

use axum::{
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use crate::store::{AppState, StoreError};

/// Build the complete router with all backend stub routes.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/_apis/artifactcache/cache", get(lookup))
        .route("/_apis/artifactcache/caches", post(reserve))
        .route(
            "/_apis/artifactcache/caches/:id",
            patch(upload_chunk).post(commit),
        )
        .route_layer(from_fn(require_bearer));

    Router::new()
        .merge(api)
        .route("/_artifacts/:id", get(download))
        .fallback(not_implemented)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty());

    if authorized {
        next.run(request).await
    } else {
        tracing::warn!(uri = %request.uri(), "rejected request without bearer token");
        (StatusCode::UNAUTHORIZED, "missing bearer token").into_response()
    }
}

fn store_error(err: StoreError) -> Response {
    let status = match err {
        StoreError::UnknownEntry(_) => StatusCode::NOT_FOUND,
        StoreError::AlreadyCommitted(_)
        | StoreError::OutOfOrder { .. }
        | StoreError::SizeMismatch { .. } => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string()).into_response()
}

// ── GET cache ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LookupQuery {
    keys: String,
    version: String,
}

async fn lookup(State(state): State<AppState>, Query(query): Query<LookupQuery>) -> Response {
    match state.lookup(&query.keys, &query.version) {
        Some(id) => Json(json!({
            "scope": "refs/heads/main",
            "cacheKey": query.keys,
            "cacheVersion": query.version,
            "archiveLocation": state.archive_location(id),
        }))
        .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

// ── POST caches ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ReserveRequest {
    key: String,
    version: String,
}

async fn reserve(State(state): State<AppState>, Json(body): Json<ReserveRequest>) -> Response {
    match state.reserve(&body.key, &body.version) {
        Some(id) => {
            tracing::debug!(cache_id = id, key = %body.key, "reserved cache entry");
            (StatusCode::CREATED, Json(json!({ "cacheId": id }))).into_response()
        }
        None => (StatusCode::CONFLICT, "Cache already exists.").into_response(),
    }
}

// ── PATCH caches/{id} ───────────────────────────────────────────────

/// Parse `bytes {start}-{end}/*` into an inclusive range.
fn parse_content_range(value: &str) -> Option<(u64, u64)> {
    let (range, _total) = value.strip_prefix("bytes ")?.split_once('/')?;
    let (start, end) = range.split_once('-')?;
    let start: u64 = start.trim().parse().ok()?;
    let end: u64 = end.trim().parse().ok()?;
    (end >= start).then_some((start, end))
}

async fn upload_chunk(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let range = headers
        .get(header::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range);
    let Some((start, end)) = range else {
        return (StatusCode::BAD_REQUEST, "missing or malformed Content-Range").into_response();
    };
    let span = (end - start).checked_add(1);
    if span != Some(body.len() as u64) {
        return (
            StatusCode::BAD_REQUEST,
            format!("range {start}-{end} does not match {} body bytes", body.len()),
        )
            .into_response();
    }

    match state.append(id, start, &body) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => store_error(err),
    }
}

// ── POST caches/{id} ────────────────────────────────────────────────

#[derive(Deserialize)]
struct CommitRequest {
    size: u64,
}

async fn commit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CommitRequest>,
) -> Response {
    match state.commit(id, body.size) {
        Ok(()) => {
            tracing::debug!(cache_id = id, size = body.size, "committed cache entry");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => store_error(err),
    }
}

// ── GET _artifacts/{id} ─────────────────────────────────────────────

async fn download(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.archive(id) {
        Some(data) => data.into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn not_implemented() -> StatusCode {
    StatusCode::NOT_IMPLEMENTED
}
