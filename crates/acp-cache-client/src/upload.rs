//! # Chunked Upload
//!
//! Drains a source stream into sequential `PATCH caches/{cacheId}` calls, one
//! per window, each addressed with `Content-Range: bytes {start}-{end}/*`.
//! The backend's range protocol is sequential per entry, so every chunk is
//! acknowledged (204) before the next one is read. Once the source is
//! exhausted the entry is committed with the final cursor position.

use acp_core::{ByteRange, CacheEntryId, ChunkReader, UploadCursor};
use bytes::Bytes;
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio::io::AsyncRead;
use url::Url;

use crate::error::CacheApiError;
use crate::response::error_text;
use crate::CacheClient;

impl CacheClient {
    /// Upload `source` into a reserved entry and commit it.
    ///
    /// Returns the total number of bytes uploaded. An empty source makes no
    /// chunk calls and commits a size of zero. The first failed read or
    /// rejected chunk aborts the upload without committing.
    pub async fn upload<R>(&self, cache_id: CacheEntryId, source: R) -> Result<u64, CacheApiError>
    where
        R: AsyncRead + Unpin,
    {
        let url = self.api_url(&format!("caches/{cache_id}"))?;
        let mut reader = ChunkReader::with_window(source, self.chunk_size)?;
        let mut cursor = UploadCursor::new();
        let mut chunks = 0u64;

        loop {
            let chunk = reader
                .next_chunk()
                .await
                .map_err(|source| CacheApiError::StreamRead {
                    uploaded: cursor.position(),
                    source,
                })?;
            let Some(chunk) = chunk else {
                break;
            };
            let Some(range) = cursor.range_for(chunk.bytes.len()) else {
                continue;
            };

            self.upload_chunk(&url, cache_id, range, chunk.bytes).await?;
            cursor.advance(&range)?;
            chunks += 1;

            if chunk.is_final {
                break;
            }
        }

        let size = cursor.position();
        self.commit(cache_id, size).await?;
        tracing::info!(cache_id = %cache_id, size, chunks, "uploaded cache entry");
        Ok(size)
    }

    async fn upload_chunk(
        &self,
        url: &Url,
        cache_id: CacheEntryId,
        range: ByteRange,
        data: Bytes,
    ) -> Result<(), CacheApiError> {
        let endpoint = format!("PATCH caches/{cache_id}");
        tracing::debug!(cache_id = %cache_id, range = %range, "uploading cache chunk");

        let resp = self
            .api_request(Method::PATCH, url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_RANGE, range.content_range())
            .body(data)
            .send()
            .await
            .map_err(|e| CacheApiError::Http {
                endpoint,
                source: e,
            })?;

        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            let body = error_text(resp).await;
            tracing::error!(
                cache_id = %cache_id,
                range = %range,
                status = status.as_u16(),
                body = %body,
                "failed to upload cache chunk"
            );
            return Err(CacheApiError::ChunkUpload {
                cache_id,
                range,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
