//! # API Error Types
//!
//! Maps failed backend protocol steps to the status the caller sees. Cache
//! clients only read the status code and a plain-text message, so the body is
//! the backend error's display text and nothing more.

use acp_cache_client::CacheApiError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup failed for a GET (500).
    #[error("{0}")]
    Lookup(#[source] CacheApiError),

    /// The archive location could not be reached (500).
    #[error("{0}")]
    Relay(#[source] CacheApiError),

    /// The backend refused or failed the reservation (500).
    #[error("{0}")]
    Reserve(#[source] CacheApiError),

    /// Reading the request body, uploading a chunk, or committing failed (400).
    #[error("{0}")]
    Upload(#[source] CacheApiError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Lookup(_) | Self::Relay(_) | Self::Reserve(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Upload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(status = status.as_u16(), error = %self, "request failed");
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn reservation_failure() -> CacheApiError {
        CacheApiError::Reservation {
            status: 503,
            body: "service unavailable".into(),
        }
    }

    #[test]
    fn read_and_reserve_failures_are_server_errors() {
        assert_eq!(
            AppError::Reserve(reservation_failure()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Lookup(reservation_failure()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upload_failures_are_client_errors() {
        let err = AppError::Upload(CacheApiError::StreamRead {
            uploaded: 0,
            source: std::io::Error::other("client went away"),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn body_is_backend_error_text() {
        let resp = AppError::Reserve(reservation_failure()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(
            String::from_utf8(bytes.to_vec()).unwrap(),
            "failed to reserve cache: 503: service unavailable"
        );
    }
}
