//! Tests for `CacheClient::relay`: unauthenticated archive downloads.

use acp_cache_client::{CacheApiConfig, CacheApiError, CacheClient, Relay};
use acp_core::ArchiveLocation;
use futures::StreamExt;
use reqwest::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client() -> CacheClient {
    let config = CacheApiConfig::new("http://127.0.0.1:19000/", "test-token").unwrap();
    CacheClient::new(config).unwrap()
}

async fn drain(relay: Relay) -> Vec<u8> {
    match relay {
        Relay::Stream { mut body, .. } => {
            let mut out = Vec::new();
            while let Some(frame) = body.next().await {
                out.extend_from_slice(&frame.unwrap());
            }
            out
        }
        Relay::Rejected(status) => panic!("expected a stream, got {status}"),
    }
}

#[tokio::test]
async fn relay_streams_archive_bytes_verbatim() {
    let server = MockServer::start().await;
    let payload: Vec<u8> = (0..300_000u32).map(|i| (i % 256) as u8).collect();

    Mock::given(method("GET"))
        .and(path("/blobs/7"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let location = ArchiveLocation::new(format!("{}/blobs/7?sig=abc", server.uri())).unwrap();
    let relay = test_client().relay(&location).await.unwrap();
    assert_eq!(relay.status(), StatusCode::OK);
    assert!(matches!(
        relay,
        Relay::Stream { content_length: Some(300_000), .. }
    ));
    assert_eq!(drain(relay).await, payload);
}

#[tokio::test]
async fn relay_does_not_send_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blobs/8"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x"))
        .mount(&server)
        .await;

    let location = ArchiveLocation::new(format!("{}/blobs/8", server.uri())).unwrap();
    let relay = test_client().relay(&location).await.unwrap();
    drain(relay).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
    assert!(requests[0].headers.get("accept-charset").is_none());
}

#[tokio::test]
async fn relay_passes_through_failure_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blobs/9"))
        .respond_with(ResponseTemplate::new(403).set_body_string("signature expired"))
        .mount(&server)
        .await;

    let location = ArchiveLocation::new(format!("{}/blobs/9", server.uri())).unwrap();
    let relay = test_client().relay(&location).await.unwrap();
    assert!(matches!(relay, Relay::Rejected(StatusCode::FORBIDDEN)));
}

#[tokio::test]
async fn relay_reports_unreachable_location() {
    let location = ArchiveLocation::new("http://127.0.0.1:1/blobs/1").unwrap();
    let err = test_client().relay(&location).await.unwrap_err();
    match err {
        CacheApiError::Relay { location, .. } => {
            assert_eq!(location, "http://127.0.0.1:1/blobs/1");
        }
        other => panic!("expected Relay, got: {other:?}"),
    }
}

/// Serve one connection that promises 100 bytes, sends 10, then hangs up.
async fn truncated_archive_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n0123456789")
            .await
            .unwrap();
        socket.shutdown().await.ok();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn relay_surfaces_truncated_archive_as_stream_error() {
    let base = truncated_archive_server().await;
    let location = ArchiveLocation::new(format!("{base}/blobs/10")).unwrap();

    match test_client().relay(&location).await.unwrap() {
        Relay::Stream {
            status,
            content_length,
            mut body,
        } => {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(content_length, Some(100));

            let mut received = Vec::new();
            let mut failed = false;
            while let Some(frame) = body.next().await {
                match frame {
                    Ok(bytes) => received.extend_from_slice(&bytes),
                    Err(_) => {
                        failed = true;
                        break;
                    }
                }
            }
            assert!(failed, "truncated body must end with an error");
            assert_eq!(received, b"0123456789");
        }
        Relay::Rejected(status) => panic!("expected a stream, got {status}"),
    }
}
