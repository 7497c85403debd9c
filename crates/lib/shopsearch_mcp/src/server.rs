// @awa-component: MCP-Server
//
//! MCP server handler: defines the ShopSearch MCP server and its tools.

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router,
};
use tracing::{debug, info, warn};

use shopsearch_core::client::{ClientError, SearchClient};
use shopsearch_core::request::{
    AutocompleteParams, BeaconParams, CompileError, CompiledRequest, MetaParams,
    RecommendationsParams, RequestCompiler, SearchParams, SuggestParams, TrendingParams,
};
use shopsearch_core::validator::ValidationInput;

use crate::tools::params::{ApiCall, ApiReferenceRequest, TrackingCodeRequest};
use crate::tools::{guidance, proxy};

/// ShopSearch MCP server handler.
///
/// Holds the `SearchClient` (and through it the `ApiConfig`) and a
/// `ToolRouter` for tool dispatch. A new instance is created per MCP session
/// by the `StreamableHttpService` factory.
#[derive(Clone)]
pub struct ShopSearchServer {
    client: SearchClient,
    tool_router: ToolRouter<Self>,
}

/// Helper to serialize a value to a pretty JSON CallToolResult.
fn json_result<T: serde::Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ErrorData::new(ErrorCode::INTERNAL_ERROR, e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn text_result(text: String) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn invalid_params(e: CompileError) -> ErrorData {
    ErrorData::new(ErrorCode::INVALID_PARAMS, e.to_string(), None)
}

fn client_error(e: ClientError) -> ErrorData {
    ErrorData::new(ErrorCode::INTERNAL_ERROR, e.to_string(), None)
}

impl ShopSearchServer {
    /// A compiler for one logical request.
    fn compiler(&self) -> RequestCompiler {
        RequestCompiler::new(self.client.config().site_id.clone())
    }

    fn configured_site(&self) -> Option<&str> {
        self.client.config().site_id.as_deref()
    }

    /// Return the compiled request on dry runs, otherwise send it.
    async fn dispatch(
        &self,
        request: CompiledRequest,
        dry_run: bool,
    ) -> Result<CallToolResult, ErrorData> {
        if dry_run {
            debug!(operation = request.operation.name(), "dry run");
            return json_result(&proxy::dry_run(&self.client, request));
        }
        match proxy::call(&self.client, &request).await {
            Ok(result) => json_result(&result),
            Err(e) => {
                warn!(operation = request.operation.name(), error = %e, "API call failed");
                Err(client_error(e))
            }
        }
    }
}

#[tool_router]
impl ShopSearchServer {
    /// Create a new server instance.
    pub fn new(client: SearchClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// Return tool definitions registered in this server.
    #[cfg(test)]
    pub(crate) fn list_tools() -> Vec<rmcp::model::Tool> {
        Self::tool_router().list_all()
    }

    /// Product search.
    #[tool(
        description = "Search products. Supports filters and bgfilters (array values repeat the key), compound sort, included/excluded facets, pagination and personalization. Set dryRun to get the compiled request instead."
    )]
    async fn search(
        &self,
        Parameters(call): Parameters<ApiCall<SearchParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "search", dry_run = call.dry_run, "tool call");
        let request = self.compiler().search(&call.params).map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Autocomplete results for a partial query.
    #[tool(description = "Autocomplete products for a partial query typed by the shopper")]
    async fn autocomplete(
        &self,
        Parameters(call): Parameters<ApiCall<AutocompleteParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "autocomplete", dry_run = call.dry_run, "tool call");
        let request = self
            .compiler()
            .autocomplete(&call.params)
            .map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Facet values only.
    #[tool(
        description = "Fetch facet values only (search with resultsPerPage forced to 0)"
    )]
    async fn facets(
        &self,
        Parameters(call): Parameters<ApiCall<SearchParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "facets", dry_run = call.dry_run, "tool call");
        let request = self.compiler().facets(&call.params).map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Query suggestions.
    #[tool(description = "Spell-corrected query suggestions")]
    async fn suggest(
        &self,
        Parameters(call): Parameters<ApiCall<SuggestParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "suggest", dry_run = call.dry_run, "tool call");
        let request = self.compiler().suggest(&call.params).map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Trending queries.
    #[tool(description = "Most popular search queries for the site")]
    async fn trending(
        &self,
        Parameters(call): Parameters<ApiCall<TrendingParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "trending", dry_run = call.dry_run, "tool call");
        let request = self.compiler().trending(&call.params).map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Personalized recommendations.
    #[tool(
        description = "Product recommendations for one or more profile tags (tags required). List parameters are comma-joined."
    )]
    async fn recommendations(
        &self,
        Parameters(call): Parameters<ApiCall<RecommendationsParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "recommendations", dry_run = call.dry_run, "tool call");
        let request = self
            .compiler()
            .recommendations(&call.params)
            .map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Site metadata.
    #[tool(description = "Site metadata: sort options and facet configuration")]
    async fn meta(
        &self,
        Parameters(call): Parameters<ApiCall<MetaParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "meta", dry_run = call.dry_run, "tool call");
        let request = self.compiler().meta(&call.params).map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Send tracking events.
    #[tool(
        description = "Send a batch of tracking (beacon) events. All events share one userId/sessionId/pageLoadId."
    )]
    async fn send_tracking_events(
        &self,
        Parameters(call): Parameters<ApiCall<BeaconParams>>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "send_tracking_events", dry_run = call.dry_run, "tool call");
        let request = self.compiler().beacon(&call.params).map_err(invalid_params)?;
        self.dispatch(request, call.dry_run).await
    }

    /// Tracking snippet for a platform and event.
    #[tool(description = "Get the tracking code snippet for a platform and event")]
    fn get_tracking_code(
        &self,
        Parameters(req): Parameters<TrackingCodeRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "get_tracking_code", platform = req.platform.name(), event = req.event.name(), "tool call");
        text_result(guidance::tracking_code(&req, self.configured_site()))
    }

    /// Alias of `get_tracking_code`.
    #[tool(description = "Alias of get_tracking_code (beacon is the tracking transport)")]
    fn get_beacon_code(
        &self,
        Parameters(req): Parameters<TrackingCodeRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "get_beacon_code", platform = req.platform.name(), event = req.event.name(), "tool call");
        text_result(guidance::tracking_code(&req, self.configured_site()))
    }

    /// Endpoint documentation.
    #[tool(description = "Describe an API operation: endpoint, method, docs URL and parameter rules")]
    fn get_api_reference(
        &self,
        Parameters(req): Parameters<ApiReferenceRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "get_api_reference", operation = req.operation.name(), "tool call");
        text_result(guidance::api_reference(&req, self.configured_site()))
    }

    /// Heuristic validation of integration code.
    #[tool(
        description = "Validate tracking or API integration code. Returns errors, warnings, suggestions and troubleshooting for an optional issue description."
    )]
    fn validate_code(
        &self,
        Parameters(input): Parameters<ValidationInput>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(tool = "validate_code", code_type = input.code_type.name(), "tool call");
        text_result(guidance::validation_report(&input))
    }
}

#[tool_handler]
impl ServerHandler for ShopSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "ShopSearch MCP server: product search, recommendations, tracking and integration guidance"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
