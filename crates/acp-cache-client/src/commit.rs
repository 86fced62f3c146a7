//! Entry commit: `POST caches/{cacheId}` with the final size.

use acp_core::CacheEntryId;
use reqwest::{Method, StatusCode};
use serde::Serialize;

use crate::error::CacheApiError;
use crate::response::error_text;
use crate::CacheClient;

#[derive(Debug, Serialize)]
struct CommitCacheRequest {
    size: u64,
}

impl CacheClient {
    /// Close a reservation by reporting the total uploaded size.
    ///
    /// Must be called at most once per [`CacheEntryId`]; the backend gives no
    /// guarantee about a second commit.
    pub async fn commit(&self, cache_id: CacheEntryId, size: u64) -> Result<(), CacheApiError> {
        let endpoint = format!("POST caches/{cache_id}");
        let url = self.api_url(&format!("caches/{cache_id}"))?;

        let resp = self
            .api_request(Method::POST, url)
            .json(&CommitCacheRequest { size })
            .send()
            .await
            .map_err(|e| CacheApiError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            let body = error_text(resp).await;
            tracing::error!(cache_id = %cache_id, status = status.as_u16(), body = %body, "failed to commit cache");
            return Err(CacheApiError::Commit {
                cache_id,
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(cache_id = %cache_id, size, "committed cache entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_sent_as_a_number() {
        let body = serde_json::to_string(&CommitCacheRequest { size: 5_242_880 }).unwrap();
        assert_eq!(body, r#"{"size":5242880}"#);
    }
}
