//! Entry reservation: `POST caches`.

use acp_core::{CacheEntryId, CacheKey, VersionHash};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::CacheApiError;
use crate::response::{decode_json, error_text, is_failure, read_body};
use crate::CacheClient;

#[derive(Debug, Serialize)]
struct ReserveCacheRequest<'a> {
    key: &'a CacheKey,
    version: VersionHash,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReserveCacheResponse {
    cache_id: CacheEntryId,
}

impl CacheClient {
    /// Ask the backend to allocate a new entry for `key`.
    ///
    /// A reservation that already exists for the key is reported like any
    /// other rejection.
    pub async fn reserve(&self, key: &CacheKey) -> Result<CacheEntryId, CacheApiError> {
        let endpoint = "POST caches";
        let url = self.api_url("caches")?;
        let req = ReserveCacheRequest {
            key,
            version: key.version(),
        };

        let resp = self
            .api_request(Method::POST, url)
            .json(&req)
            .send()
            .await
            .map_err(|e| CacheApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })?;

        let status = resp.status();
        if is_failure(status) {
            let body = error_text(resp).await;
            tracing::error!(key = %key, status = status.as_u16(), body = %body, "cache reservation rejected");
            return Err(CacheApiError::Reservation {
                status: status.as_u16(),
                body,
            });
        }

        let body = read_body(resp, endpoint).await?;
        let reserved: ReserveCacheResponse = decode_json(&body, endpoint)?;
        tracing::debug!(key = %key, cache_id = %reserved.cache_id, "reserved cache entry");
        Ok(reserved.cache_id)
    }
}
