//! # acp-cache-client — Typed Rust client for the artifact cache backend
//!
//! Wraps the backend's versioned reservation protocol behind five calls:
//!
//! | Method | Path (relative to `{base}_apis/artifactcache/`) | Operation |
//! |--------|--------------------------|------------------------|
//! | GET    | `cache?keys=&version=`   | [`CacheClient::locate`] |
//! | POST   | `caches`                 | [`CacheClient::reserve`] |
//! | PATCH  | `caches/{cacheId}`       | [`CacheClient::upload`] (one call per chunk) |
//! | POST   | `caches/{cacheId}`       | [`CacheClient::commit`] |
//! | GET    | archive location         | [`CacheClient::relay`] (unauthenticated) |
//!
//! ## Architecture
//!
//! One `reqwest::Client` is built at startup and shared by every request for
//! connection reuse. API calls get the bearer token and protocol headers
//! attached per request; archive downloads go to pre-signed URLs and carry
//! none of them.
//!
//! ## Error Handling
//!
//! Every backend failure is surfaced as a [`CacheApiError`] carrying the status
//! and response body. Nothing is retried: a single rejected chunk aborts the
//! whole upload.

pub mod commit;
pub mod config;
pub mod error;
pub mod lookup;
pub mod relay;
pub mod reserve;
mod response;
pub mod upload;

pub use config::{CacheApiConfig, ConfigError};
pub use error::CacheApiError;
pub use lookup::CacheLookup;
pub use relay::Relay;

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, ACCEPT_CHARSET, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder};
use url::Url;

/// User agent the backend expects from cache clients.
pub const CACHE_USER_AGENT: &str = "actions/cache";

/// API version negotiated through the `Accept` header.
pub const CACHE_API_ACCEPT: &str = "application/json;api-version=6.0-preview.1";

/// Client for the cache backend.
#[derive(Debug, Clone)]
pub struct CacheClient {
    http: reqwest::Client,
    api_root: Url,
    bearer: HeaderValue,
    chunk_size: usize,
}

impl CacheClient {
    /// Create a new client from configuration.
    pub fn new(config: CacheApiConfig) -> Result<Self, CacheApiError> {
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", config.runtime_token.as_str()))
                .map_err(|_| CacheApiError::Config(ConfigError::InvalidToken))?;
        bearer.set_sensitive(true);

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(|e| CacheApiError::Http {
            endpoint: "client_init".into(),
            source: e,
        })?;

        Ok(Self {
            http,
            api_root: config.api_root,
            bearer,
            chunk_size: config.chunk_size,
        })
    }

    /// Upload window in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Resolve a resource path against the API root.
    fn api_url(&self, resource: &str) -> Result<Url, CacheApiError> {
        self.api_root
            .join(resource)
            .map_err(|e| ConfigError::InvalidUrl(resource.to_string(), e.to_string()).into())
    }

    /// Start an authenticated API request with the protocol headers attached.
    fn api_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, self.bearer.clone())
            .header(USER_AGENT, CACHE_USER_AGENT)
            .header(ACCEPT, CACHE_API_ACCEPT)
            .header(ACCEPT_CHARSET, "utf-8")
    }
}
