//! Entry lookup: `GET cache?keys={key}&version={hash}`.

use acp_core::{ArchiveLocation, CacheKey};
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use crate::error::CacheApiError;
use crate::response::{decode_json, error_text, is_failure, read_body};
use crate::CacheClient;

/// Lookup response. Only the location is consumed; the backend also returns
/// scope and timestamps which are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntryResponse {
    #[serde(default)]
    archive_location: Option<String>,
}

/// Outcome of resolving a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Backend answered 404 or 204: no entry for this key and version.
    Missing,
    /// Backend answered with a success body but no location. Should not
    /// happen; treated as a miss.
    Unresolved,
    /// Entry exists and can be fetched from this location.
    Found(ArchiveLocation),
}

impl CacheLookup {
    pub fn location(&self) -> Option<&ArchiveLocation> {
        match self {
            Self::Found(location) => Some(location),
            Self::Missing | Self::Unresolved => None,
        }
    }

    pub fn into_location(self) -> Option<ArchiveLocation> {
        match self {
            Self::Found(location) => Some(location),
            Self::Missing | Self::Unresolved => None,
        }
    }
}

impl CacheClient {
    /// Resolve a key to its archive location.
    pub async fn locate(&self, key: &CacheKey) -> Result<CacheLookup, CacheApiError> {
        let endpoint = "GET cache";
        let version = key.version();
        let url = self.api_url("cache")?;

        tracing::debug!(key = %key, version = %version, "looking up cache entry");

        let resp = self
            .api_request(Method::GET, url)
            .query(&[("keys", key.as_str()), ("version", version.as_str())])
            .send()
            .await
            .map_err(|e| CacheApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(CacheLookup::Missing);
        }
        if is_failure(status) {
            let body = error_text(resp).await;
            tracing::error!(key = %key, status = status.as_u16(), body = %body, "cache lookup failed");
            return Err(CacheApiError::Backend {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                body,
            });
        }

        let body = read_body(resp, endpoint).await?;
        let entry: CacheEntryResponse = match decode_json(&body, endpoint) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    body = %String::from_utf8_lossy(&body),
                    "undecodable cache lookup response"
                );
                return Err(e);
            }
        };

        match entry.archive_location.and_then(ArchiveLocation::new) {
            Some(location) => Ok(CacheLookup::Found(location)),
            None => {
                tracing::warn!(
                    key = %key,
                    status = status.as_u16(),
                    body = %String::from_utf8_lossy(&body),
                    "cache backend returned an entry without an archive location"
                );
                Ok(CacheLookup::Unresolved)
            }
        }
    }
}
