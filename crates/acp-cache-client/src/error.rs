//! Cache backend client error types.
//!
//! A cache miss is not an error: it is reported as
//! [`CacheLookup::Missing`](crate::CacheLookup::Missing). Everything here is a
//! failed protocol step, and none of them are retried.

use acp_core::{ByteRange, CacheEntryId, CoreError};

/// Errors from cache backend calls.
#[derive(Debug, thiserror::Error)]
pub enum CacheApiError {
    /// HTTP transport error talking to the backend API.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Lookup returned an error status other than 404/204.
    #[error("failed to get location: {endpoint} returned {status}: {body}")]
    Backend {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// A success response whose body is not the expected JSON.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        body: String,
        source: serde_json::Error,
    },
    /// Reading the upload source failed before end of stream.
    #[error("failed to read upload stream after {uploaded} bytes: {source}")]
    StreamRead {
        uploaded: u64,
        source: std::io::Error,
    },
    /// The backend refused to reserve an entry.
    #[error("failed to reserve cache: {status}: {body}")]
    Reservation { status: u16, body: String },
    /// The backend rejected one chunk; the whole upload is aborted.
    #[error("failed to upload chunk {range} of cache {cache_id} with status {status}: {body}")]
    ChunkUpload {
        cache_id: CacheEntryId,
        range: ByteRange,
        status: u16,
        body: String,
    },
    /// The backend rejected the final size report.
    #[error("failed to commit cache {cache_id} with status {status}: {body}")]
    Commit {
        cache_id: CacheEntryId,
        status: u16,
        body: String,
    },
    /// Transport error reaching a resolved archive location.
    #[error("failed to fetch archive from {location}: {source}")]
    Relay {
        location: String,
        source: reqwest::Error,
    },
    /// Upload accounting violated a core invariant.
    #[error("upload accounting error: {0}")]
    Core(#[from] CoreError),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

impl CacheApiError {
    /// Backend status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. }
            | Self::Reservation { status, .. }
            | Self::ChunkUpload { status, .. }
            | Self::Commit { status, .. } => Some(*status),
            _ => None,
        }
    }
}
