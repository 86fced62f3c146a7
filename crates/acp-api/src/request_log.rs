//! Per-request completion log.
//!
//! Every request, liveness probes and ignored verbs included, produces one
//! `served request` line carrying method, key, status, bytes sent and
//! elapsed time. The line is written when the response body is finished or
//! dropped, so a relayed archive is timed through its last byte rather than
//! up to its headers.

use std::time::Instant;

use axum::body::{Body, HttpBody};
use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use futures::StreamExt;

/// Emits the log line on drop.
struct RequestRecord {
    method: Method,
    key: String,
    status: StatusCode,
    started: Instant,
    bytes: u64,
}

impl Drop for RequestRecord {
    fn drop(&mut self) {
        tracing::info!(
            method = %self.method,
            key = %self.key,
            status = self.status.as_u16(),
            bytes = self.bytes,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "served request"
        );
    }
}

/// Middleware that attaches a [`RequestRecord`] to every response.
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let key = request.uri().path().trim_start_matches('/').to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let (mut parts, body) = response.into_parts();
    let mut record = RequestRecord {
        method,
        key,
        status: parts.status,
        started,
        bytes: 0,
    };

    let exact = body.size_hint().exact();
    if exact == Some(0) {
        drop(record);
        return Response::from_parts(parts, body);
    }
    if let Some(len) = exact {
        parts
            .headers
            .entry(header::CONTENT_LENGTH)
            .or_insert_with(|| HeaderValue::from(len));
    }

    let counted = body.into_data_stream().map(move |frame| {
        if let Ok(chunk) = &frame {
            record.bytes += chunk.len() as u64;
        }
        frame
    });
    Response::from_parts(parts, Body::from_stream(counted))
}
