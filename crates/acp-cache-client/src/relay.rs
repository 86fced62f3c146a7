//! # Archive Relay
//!
//! Fetches an entry's bytes from its pre-signed archive location. The
//! location already carries its own credentials, so the request goes out
//! without the bearer token or API headers.
//!
//! ## Known limitation
//!
//! Once a successful relay starts streaming, the caller has committed to a
//! success status. A transport failure after that point can only be logged
//! and the outbound body cut short; it cannot be turned into an error status.

use std::io;

use acp_core::ArchiveLocation;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::StatusCode;

use crate::error::CacheApiError;
use crate::CacheClient;

/// Result of contacting an archive location.
pub enum Relay {
    /// Status in `[100, 300)`: forward the body verbatim.
    Stream {
        status: StatusCode,
        content_length: Option<u64>,
        body: BoxStream<'static, io::Result<Bytes>>,
    },
    /// Any other status: pass it through, no body.
    Rejected(StatusCode),
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream {
                status,
                content_length,
                ..
            } => f
                .debug_struct("Stream")
                .field("status", status)
                .field("content_length", content_length)
                .finish_non_exhaustive(),
            Self::Rejected(status) => f.debug_tuple("Rejected").field(status).finish(),
        }
    }
}

impl Relay {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Stream { status, .. } | Self::Rejected(status) => *status,
        }
    }
}

/// Location without its query string. Pre-signed URLs carry their signature
/// in the query, which must not end up in logs.
fn loggable(location: &ArchiveLocation) -> String {
    match url::Url::parse(location.as_str()) {
        Ok(mut url) => {
            url.set_query(None);
            url.to_string()
        }
        Err(_) => "<unparseable location>".to_string(),
    }
}

impl CacheClient {
    /// Open a download from `location`.
    pub async fn relay(&self, location: &ArchiveLocation) -> Result<Relay, CacheApiError> {
        let shown = loggable(location);
        let resp = self
            .http
            .get(location.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(location = %shown, error = %e, "proxying cache failed");
                CacheApiError::Relay {
                    location: shown.clone(),
                    source: e,
                }
            })?;

        let status = resp.status();
        if !(status.is_informational() || status.is_success()) {
            tracing::warn!(location = %shown, status = status.as_u16(), "archive location rejected download");
            return Ok(Relay::Rejected(status));
        }

        let content_length = resp.content_length();
        let body = resp
            .bytes_stream()
            .map(move |item| {
                item.map_err(|e| {
                    tracing::error!(
                        location = %shown,
                        error = %e,
                        "archive stream failed mid-transfer; response already committed"
                    );
                    io::Error::other(e)
                })
            })
            .boxed();

        Ok(Relay::Stream {
            status,
            content_length,
            body,
        })
    }
}
