//! # acp-server — Binary Entry Point
//!
//! Reads the backend location and token from the runner environment
//! (`ACTIONS_CACHE_URL`, `ACTIONS_RUNTIME_TOKEN`) and serves the proxy on
//! port 12321 unless told otherwise.

use std::net::{IpAddr, SocketAddr};

use acp_api::state::{AppState, ServerConfig};
use acp_cache_client::{CacheApiConfig, CacheClient};
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// HTTP cache proxy for the artifact cache backend.
#[derive(Parser, Debug)]
#[command(name = "acp-server", version, about, long_about = None)]
struct Cli {
    /// Port to listen on.
    #[arg(long, env = "ACP_PORT", default_value_t = 12321)]
    port: u16,

    /// Address to bind.
    #[arg(long, env = "ACP_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Answer cache hits with a redirect to the archive instead of relaying it.
    #[arg(long, env = "ACP_REDIRECT_DOWNLOADS")]
    redirect_downloads: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = CacheApiConfig::from_env().context("cache backend is not configured")?;
    tracing::info!(?config, "cache backend configured");
    let client = CacheClient::new(config).context("failed to create cache client")?;

    let state = AppState::new(
        client,
        ServerConfig {
            redirect_downloads: cli.redirect_downloads,
        },
    );
    let app = acp_api::app(state);

    let addr = SocketAddr::new(cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(redirect_downloads = cli.redirect_downloads, "acp-server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await
        .context("server error")?;

    Ok(())
}
