//! Cache backend client configuration.
//!
//! The backend base URL and bearer token come from the runner environment
//! (`ACTIONS_CACHE_URL`, `ACTIONS_RUNTIME_TOKEN`). Both are read once at
//! startup and held immutably for the life of the process.

use acp_core::DEFAULT_CHUNK_SIZE;
use reqwest::header::HeaderValue;
use url::Url;
use zeroize::Zeroizing;

/// Path segment every backend resource lives under.
const API_PREFIX: &str = "_apis/artifactcache/";

/// Configuration for connecting to the cache backend.
///
/// Custom `Debug` implementation redacts the `runtime_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct CacheApiConfig {
    /// Root of the backend API, `{base}_apis/artifactcache/`.
    pub api_root: Url,
    /// Bearer token sent on every API call.
    pub runtime_token: Zeroizing<String>,
    /// Upload window in bytes.
    pub chunk_size: usize,
    /// Optional TCP connect timeout. No overall request timeout is applied.
    pub connect_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for CacheApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheApiConfig")
            .field("api_root", &self.api_root.as_str())
            .field("runtime_token", &"[REDACTED]")
            .field("chunk_size", &self.chunk_size)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl CacheApiConfig {
    /// Build a configuration from an explicit base URL and token.
    pub fn new(base_url: &str, runtime_token: impl Into<String>) -> Result<Self, ConfigError> {
        let runtime_token = runtime_token.into();
        if runtime_token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if HeaderValue::from_str(&runtime_token).is_err() {
            return Err(ConfigError::InvalidToken);
        }
        Ok(Self {
            api_root: api_root(base_url)?,
            runtime_token: Zeroizing::new(runtime_token),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout_secs: None,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `ACTIONS_CACHE_URL` (required)
    /// - `ACTIONS_RUNTIME_TOKEN` (required)
    /// - `ACP_CHUNK_SIZE` (default: 1048576)
    /// - `ACP_CONNECT_TIMEOUT_SECS` (default: unset)
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("ACTIONS_CACHE_URL").map_err(|_| ConfigError::MissingBaseUrl)?;
        let token = std::env::var("ACTIONS_RUNTIME_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        let mut config = Self::new(&base_url, token)?;
        if let Some(size) = env_number::<usize>("ACP_CHUNK_SIZE")? {
            config = config.with_chunk_size(size)?;
        }
        config.connect_timeout_secs = env_number("ACP_CONNECT_TIMEOUT_SECS")?;
        Ok(config)
    }

    /// Override the upload window.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::InvalidNumber(
                "ACP_CHUNK_SIZE".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }
}

/// Normalize the runner-provided base URL into the API root.
///
/// The runner hands out a `pipelines` host for the cache service; the cache
/// API itself is served from the matching `artifactcache` host. A trailing
/// slash is ensured so the base path survives URL joining.
fn api_root(base_url: &str) -> Result<Url, ConfigError> {
    let mut raw = base_url.trim().replace("pipelines", "artifactcache");
    if raw.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let base = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(raw.clone(), e.to_string()))?;
    base.join(API_PREFIX)
        .map_err(|e| ConfigError::InvalidUrl(raw, e.to_string()))
}

fn env_number<T: std::str::FromStr>(var: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidNumber(var.to_string(), e.to_string())),
        Err(_) => Ok(None),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ACTIONS_CACHE_URL environment variable is required")]
    MissingBaseUrl,
    #[error("ACTIONS_RUNTIME_TOKEN environment variable is required")]
    MissingToken,
    #[error("ACTIONS_RUNTIME_TOKEN is not usable as a header value")]
    InvalidToken,
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {0}: {1}")]
    InvalidNumber(String, String),
}
