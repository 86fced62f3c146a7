//! Response body helpers shared by the API calls.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::CacheApiError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Drop a leading UTF-8 byte-order mark. The backend occasionally prefixes
/// JSON bodies with one, which `serde_json` refuses.
pub(crate) fn strip_bom(body: &[u8]) -> &[u8] {
    body.strip_prefix(UTF8_BOM).unwrap_or(body)
}

/// Any status of 400 or above, including nonstandard codes past 599.
pub(crate) fn is_failure(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

/// Read the full body of a response.
pub(crate) async fn read_body(
    resp: reqwest::Response,
    endpoint: &str,
) -> Result<bytes::Bytes, CacheApiError> {
    resp.bytes().await.map_err(|e| CacheApiError::Http {
        endpoint: endpoint.to_string(),
        source: e,
    })
}

/// Decode a JSON body, tolerating a byte-order mark.
pub(crate) fn decode_json<T: DeserializeOwned>(
    body: &[u8],
    endpoint: &str,
) -> Result<T, CacheApiError> {
    serde_json::from_slice(strip_bom(body)).map_err(|e| CacheApiError::Decode {
        endpoint: endpoint.to_string(),
        body: String::from_utf8_lossy(body).into_owned(),
        source: e,
    })
}

/// Body text of a failed response, for error messages.
pub(crate) async fn error_text(resp: reqwest::Response) -> String {
    resp.text().await.unwrap_or_default()
}
