// @awa-component: MCP-ToolParams
//
//! Parameter types for the MCP tools that are not plain core parameter structs.

use schemars::JsonSchema;
use serde::Deserialize;

use shopsearch_core::guidance::TrackingEvent;
use shopsearch_core::request::Operation;
use shopsearch_core::validator::Platform;

/// Wrapper for proxy tools: the operation's parameters plus a dry-run switch.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall<P> {
    #[serde(flatten)]
    pub params: P,
    /// Return the compiled request instead of calling the API.
    #[serde(default)]
    pub dry_run: bool,
}

/// Parameters for `get_tracking_code` (and its `get_beacon_code` alias).
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingCodeRequest {
    /// Storefront platform.
    pub platform: Platform,
    /// Event to track: `product_view`, `cart_view` or `order_transaction`.
    pub event: TrackingEvent,
    /// Site id to embed. Falls back to the configured site.
    pub site_id: Option<String>,
}

/// Parameters for `get_api_reference`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiReferenceRequest {
    /// Operation to describe.
    pub operation: Operation,
    pub site_id: Option<String>,
}
