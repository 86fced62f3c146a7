//! # Request Dispatcher
//!
//! Every path below `/` is a cache key. The verb picks the operation:
//!
//! | Verb       | Operation                       | Success          | Failure         |
//! |------------|---------------------------------|------------------|-----------------|
//! | GET        | locate, then relay or redirect  | relayed status   | 404 / 500       |
//! | HEAD       | locate                          | 200              | 404             |
//! | POST, PUT  | reserve, upload body, commit    | 201              | 500 / 400       |
//! | other      | nothing                         | 200, empty body  |                 |
//!
//! An empty key is the liveness probe and answers any verb.

use std::io;

use acp_cache_client::{CacheLookup, Relay};
use acp_core::CacheKey;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

use crate::error::AppError;
use crate::state::AppState;

/// Body of the liveness response.
pub const LIVENESS_TEXT: &str = "HTTP Cache is running!";

/// `/` for any verb.
pub async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

/// `/{key}` for any verb.
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    Path(raw): Path<String>,
    body: Body,
) -> Response {
    let Some(key) = CacheKey::from_path(&raw) else {
        return LIVENESS_TEXT.into_response();
    };

    match method {
        Method::GET => get_entry(&state, &key).await.into_response(),
        Method::HEAD => head_entry(&state, &key).await.into_response(),
        Method::POST | Method::PUT => put_entry(&state, &key, body).await.into_response(),
        _ => {
            tracing::debug!(method = %method, key = key.as_str(), "ignoring unsupported method");
            StatusCode::OK.into_response()
        }
    }
}

async fn get_entry(state: &AppState, key: &CacheKey) -> Result<Response, AppError> {
    let location = match state.client.locate(key).await.map_err(AppError::Lookup)? {
        CacheLookup::Found(location) => location,
        CacheLookup::Missing | CacheLookup::Unresolved => {
            return Ok(StatusCode::NOT_FOUND.into_response())
        }
    };

    if state.config.redirect_downloads {
        return Ok(match HeaderValue::from_str(location.as_str()) {
            Ok(target) => (StatusCode::FOUND, [(header::LOCATION, target)]).into_response(),
            Err(_) => {
                tracing::warn!(key = key.as_str(), "archive location is not a valid header value");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        });
    }

    match state.client.relay(&location).await.map_err(AppError::Relay)? {
        Relay::Rejected(status) => Ok(status.into_response()),
        Relay::Stream {
            status,
            content_length,
            body,
        } => {
            let mut response = Response::new(Body::from_stream(body));
            *response.status_mut() = status;
            if let Some(len) = content_length {
                response
                    .headers_mut()
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(len));
            }
            Ok(response)
        }
    }
}

/// Lookup failures are reported as absence; HEAD carries no error text.
async fn head_entry(state: &AppState, key: &CacheKey) -> StatusCode {
    match state.client.locate(key).await {
        Ok(CacheLookup::Found(_)) => StatusCode::OK,
        Ok(CacheLookup::Missing | CacheLookup::Unresolved) => StatusCode::NOT_FOUND,
        Err(err) => {
            tracing::warn!(key = key.as_str(), error = %err, "lookup failed during HEAD");
            StatusCode::NOT_FOUND
        }
    }
}

async fn put_entry(state: &AppState, key: &CacheKey, body: Body) -> Result<Response, AppError> {
    let cache_id = state.client.reserve(key).await.map_err(AppError::Reserve)?;

    let source = StreamReader::new(body.into_data_stream().map_err(io::Error::other));
    let size = state
        .client
        .upload(cache_id, source)
        .await
        .map_err(AppError::Upload)?;

    tracing::debug!(key = key.as_str(), cache_id = %cache_id, size, "stored cache entry");
    Ok(StatusCode::CREATED.into_response())
}
