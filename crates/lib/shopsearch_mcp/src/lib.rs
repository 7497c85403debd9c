//! # shopsearch_mcp
//!
//! MCP (Model Context Protocol) server for ShopSearch.
//!
//! Provides a Streamable HTTP MCP server exposing the search, recommendation
//! and tracking operations plus integration guidance and code validation.
//! The server is built as a library crate; `shopsearch_server` wires it up
//! on a port.

pub mod server;
pub mod tools;

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use shopsearch_core::client::SearchClient;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Build an Axum router that serves the MCP Streamable HTTP endpoint at `/mcp`.
///
/// # Arguments
///
/// * `client`: transport used by the proxy tools; carries the `ApiConfig`.
/// * `ct`: cancellation token for graceful shutdown of SSE streams.
pub fn mcp_router(client: SearchClient, ct: CancellationToken) -> axum::Router {
    let service: StreamableHttpService<server::ShopSearchServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(server::ShopSearchServer::new(client.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                stateful_mode: true,
                cancellation_token: ct,
                ..Default::default()
            },
        );

    axum::Router::new().nest_service("/mcp", service)
}
