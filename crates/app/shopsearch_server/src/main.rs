//! ShopSearch MCP server binary.
//!
//! Serves the MCP Streamable HTTP endpoint at `/mcp` until Ctrl-C.

use std::net::SocketAddr;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use shopsearch_core::client::SearchClient;
use shopsearch_core::config::ApiConfig;

/// CLI arguments for the MCP server.
#[derive(Parser, Debug)]
#[command(name = "shopsearch_server", about = "ShopSearch MCP server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3200")]
    bind_addr: SocketAddr,

    /// Port override for `bind_addr` (0 = ephemeral).
    #[arg(long)]
    port: Option<u16>,

    /// Default site id (overrides SHOPSEARCH_SITE_ID).
    #[arg(long)]
    site_id: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout stays free for the bound address.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| {
                    tracing_subscriber::EnvFilter::try_new(
                        "info,shopsearch_mcp=debug,shopsearch_core=debug",
                    )
                })?,
        )
        .init();

    let args = Args::parse();

    let mut config = ApiConfig::from_env();
    if args.site_id.is_some() {
        config.site_id = args.site_id;
    }
    if config.site_id.is_none() {
        warn!("no default site id configured; every call must pass siteId");
    }

    let mut bind_addr = args.bind_addr;
    if let Some(port) = args.port {
        bind_addr.set_port(port);
    }

    info!(
        site_id = config.site_id.as_deref().unwrap_or("-"),
        api_base_url = %config.api_base_url,
        timeout_secs = config.timeout.as_secs(),
        "starting shopsearch_server"
    );

    let client = SearchClient::new(config)?;
    let ct = CancellationToken::new();
    let app = shopsearch_mcp::mcp_router(client, ct.clone());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let local_addr = listener.local_addr()?;
    println!("http://{local_addr}/mcp");
    info!(addr = %local_addr, "MCP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let ct = ct.clone();
            async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("ctrl-c received, shutting down"),
                    _ = ct.cancelled() => {}
                }
                ct.cancel();
            }
        })
        .await?;

    Ok(())
}
