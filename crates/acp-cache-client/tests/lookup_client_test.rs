//! Contract tests for `CacheClient::locate` against a wiremock backend.
//!
//! | Backend answer                       | Expected outcome            |
//! |--------------------------------------|-----------------------------|
//! | 204 / 404                            | `CacheLookup::Missing`      |
//! | other 4xx / 5xx                      | `CacheApiError::Backend`    |
//! | 200 + `archiveLocation`              | `CacheLookup::Found`        |
//! | 200 + empty / absent location        | `CacheLookup::Unresolved`   |
//! | 200 + garbage                        | `CacheApiError::Decode`     |
//! | closed port                          | `CacheApiError::Http`       |

use acp_cache_client::{CacheApiConfig, CacheApiError, CacheClient, CacheLookup};
use acp_core::{CacheKey, VersionHash};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> CacheClient {
    let config = CacheApiConfig::new(base_url, "test-token").unwrap();
    CacheClient::new(config).unwrap()
}

fn key(s: &str) -> CacheKey {
    CacheKey::new(s).unwrap()
}

#[tokio::test]
async fn locate_sends_key_version_and_protocol_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .and(query_param("keys", "abc123"))
        .and(query_param("version", VersionHash::of("abc123").as_str()))
        .and(header("authorization", "Bearer test-token"))
        .and(header("user-agent", "actions/cache"))
        .and(header("accept", "application/json;api-version=6.0-preview.1"))
        .and(header("accept-charset", "utf-8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = test_client(&server.uri()).locate(&key("abc123")).await.unwrap();
    assert_eq!(lookup, CacheLookup::Missing);
}

#[tokio::test]
async fn locate_maps_404_to_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such entry"))
        .mount(&server)
        .await;

    let lookup = test_client(&server.uri()).locate(&key("abc123")).await.unwrap();
    assert_eq!(lookup, CacheLookup::Missing);
}

#[tokio::test]
async fn locate_maps_server_error_to_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .locate(&key("abc123"))
        .await
        .unwrap_err();
    match err {
        CacheApiError::Backend { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "database unavailable");
        }
        other => panic!("expected Backend, got: {other:?}"),
    }
}

#[tokio::test]
async fn locate_maps_client_error_to_backend_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .locate(&key("abc123"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("token expired"));
}

#[tokio::test]
async fn locate_returns_archive_location() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "scope": "refs/heads/main",
            "cacheKey": "abc123",
            "cacheVersion": VersionHash::of("abc123").as_str(),
            "creationTime": "2026-01-15T12:00:00Z",
            "archiveLocation": "https://blob.example/cache/7?sig=abc"
        })))
        .mount(&server)
        .await;

    let lookup = test_client(&server.uri()).locate(&key("abc123")).await.unwrap();
    assert_eq!(
        lookup.location().unwrap().as_str(),
        "https://blob.example/cache/7?sig=abc"
    );
}

#[tokio::test]
async fn locate_tolerates_byte_order_mark() {
    let server = MockServer::start().await;

    let mut body = vec![0xEF, 0xBB, 0xBF];
    body.extend_from_slice(br#"{"archiveLocation":"https://blob.example/cache/9"}"#);
    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(&server)
        .await;

    let lookup = test_client(&server.uri()).locate(&key("abc123")).await.unwrap();
    assert!(matches!(lookup, CacheLookup::Found(_)));
}

#[tokio::test]
async fn locate_treats_empty_location_as_unresolved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"archiveLocation": ""})),
        )
        .mount(&server)
        .await;

    let lookup = test_client(&server.uri()).locate(&key("abc123")).await.unwrap();
    assert_eq!(lookup, CacheLookup::Unresolved);
}

#[tokio::test]
async fn locate_treats_absent_location_as_unresolved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let lookup = test_client(&server.uri()).locate(&key("abc123")).await.unwrap();
    assert_eq!(lookup, CacheLookup::Unresolved);
}

#[tokio::test]
async fn locate_reports_undecodable_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .locate(&key("abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheApiError::Decode { .. }));
}

#[tokio::test]
async fn locate_reports_transport_failure() {
    let err = test_client("http://127.0.0.1:1/")
        .locate(&key("abc123"))
        .await
        .unwrap_err();
    assert!(matches!(err, CacheApiError::Http { .. }));
}

#[tokio::test]
async fn locate_encodes_awkward_keys() {
    let server = MockServer::start().await;
    let raw = "node modules & friends/linux?x=1";

    Mock::given(method("GET"))
        .and(path("/_apis/artifactcache/cache"))
        .and(query_param("keys", raw))
        .and(query_param("version", VersionHash::of(raw).as_str()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = test_client(&server.uri()).locate(&key(raw)).await.unwrap();
    assert_eq!(lookup, CacheLookup::Missing);
}
