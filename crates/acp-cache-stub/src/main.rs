//! Artifact cache backend stub: standalone development server.
//!
//! Point the proxy at it with
//! `ACTIONS_CACHE_URL=http://127.0.0.1:8091/ ACTIONS_RUNTIME_TOKEN=dev`.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("ACP_STUB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8091);
    let public_url = std::env::var("ACP_STUB_PUBLIC_URL")
        .unwrap_or_else(|_| format!("http://127.0.0.1:{port}"));

    let state = acp_cache_stub::AppState::new(public_url);
    tracing::info!(public_url = %state.public_url(), "archive locations will use this origin");
    let app = acp_cache_stub::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("acp-cache-stub listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;
    Ok(())
}
