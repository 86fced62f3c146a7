//! # acp-api — HTTP front end for the artifact cache proxy
//!
//! A stateless proxy that lets plain HTTP build-cache clients talk to the
//! artifact cache backend. Callers address entries by path; the proxy turns
//! each request into the backend's versioned protocol through
//! [`acp_cache_client::CacheClient`].
//!
//! ## API Surface
//!
//! | Path     | Handler                  |
//! |----------|--------------------------|
//! | `/`      | [`routes::liveness`]     |
//! | `/{key}` | [`routes::dispatch`]     |
//!
//! ## Middleware Stack
//!
//! ```text
//! TraceLayer → request log → DefaultBodyLimit (disabled) → Handler
//! ```
//!
//! The request log writes one `served request` line per request once the
//! response body has been sent.
//!
//! Uploads are streamed to the backend in fixed windows, so request bodies
//! are not size-limited.

pub mod error;
pub mod request_log;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", any(routes::liveness))
        .route("/*key", any(routes::dispatch))
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(request_log::log_request))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
