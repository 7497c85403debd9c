// @awa-component: MCP-ToolTypes
//
//! Response types for MCP tools.

use serde::Serialize;

use shopsearch_core::request::CompiledRequest;

/// Result of a proxy tool called with `dryRun: true`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResult {
    /// Full URL including the encoded query string.
    pub url: String,
    pub request: CompiledRequest,
}

/// Result of a proxy tool that reached the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResult {
    pub operation: String,
    pub url: String,
    pub response: serde_json::Value,
}
