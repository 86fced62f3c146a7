//! # Application State
//!
//! Shared state for the Axum application, passed to the dispatcher via the
//! `State` extractor. Everything here is immutable after startup: the proxy
//! keeps no per-entry state between requests.

use std::sync::Arc;

use acp_cache_client::CacheClient;

/// Front-end behaviour switches, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Answer found GETs with `302 Found` to the archive location instead of
    /// relaying the bytes through the proxy.
    pub redirect_downloads: bool,
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The one backend client, shared by every request for connection reuse.
    pub client: Arc<CacheClient>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(client: CacheClient, config: ServerConfig) -> Self {
        Self {
            client: Arc::new(client),
            config,
        }
    }
}
