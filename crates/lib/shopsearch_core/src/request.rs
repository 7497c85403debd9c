// @awa-component: QRY-RequestCompiler
//
//! Request compiler: typed operation parameters to wire-ready requests.
//!
//! Every compile is pure: it reads a parameter struct, resolves the tracking
//! identity once, and emits a [`CompiledRequest`]. Sending it is the
//! transport's job (see [`crate::client`]).

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::ids::{IdSource, RandomIds};
use crate::query::{
    FieldMap, FilterValue, QueryParameterSet, SortDirection, push_dotted_filters, push_sort,
};

/// Value of the fixed `resultsFormat` key on search-family requests.
pub const RESULTS_FORMAT: &str = "native";

/// Compile errors. Only missing or empty required fields are hard errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },
}

impl CompileError {
    fn missing(field: &'static str) -> Self {
        CompileError::InvalidParameter {
            field,
            reason: "is required and must not be empty".to_string(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            CompileError::InvalidParameter { field, .. } => field,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// The operations the compiler knows how to shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Search,
    Autocomplete,
    Facets,
    Suggest,
    Trending,
    Recommendations,
    Meta,
    Beacon,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Operation::Search,
        Operation::Autocomplete,
        Operation::Facets,
        Operation::Suggest,
        Operation::Trending,
        Operation::Recommendations,
        Operation::Meta,
        Operation::Beacon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Operation::Search => "search",
            Operation::Autocomplete => "autocomplete",
            Operation::Facets => "facets",
            Operation::Suggest => "suggest",
            Operation::Trending => "trending",
            Operation::Recommendations => "recommendations",
            Operation::Meta => "meta",
            Operation::Beacon => "beacon",
        }
    }

    /// Request path relative to the API (or beacon) base URL.
    pub fn path(self, site_id: &str) -> String {
        match self {
            Operation::Search | Operation::Facets => "/api/search/search.json".to_string(),
            Operation::Autocomplete => "/api/search/autocomplete.json".to_string(),
            Operation::Suggest => "/api/suggest/query".to_string(),
            Operation::Trending => "/api/suggest/trending".to_string(),
            Operation::Recommendations => format!("/boost/{site_id}/recommend"),
            Operation::Meta => "/api/meta/meta.json".to_string(),
            Operation::Beacon => "/beacon".to_string(),
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            Operation::Beacon => HttpMethod::Post,
            _ => HttpMethod::Get,
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            // "tracking" is the historical name of the beacon operation.
            "tracking" => Ok(Operation::Beacon),
            name => Operation::ALL
                .into_iter()
                .find(|op| op.name() == name)
                .ok_or_else(|| CompileError::InvalidParameter {
                    field: "operation",
                    reason: format!("unknown operation \"{s}\""),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
}

/// Caller-supplied tracking identity. Missing fields are synthesized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingInput {
    /// Persistent shopper id (cookie `ssUserId`).
    pub user_id: Option<String>,
    /// Browser session id.
    pub session_id: Option<String>,
    /// Id of the current page view.
    pub page_load_id: Option<String>,
}

impl TrackingInput {
    /// Resolve the identity for one compiled request. Each missing field is
    /// synthesized exactly once here; callers must reuse the result.
    pub fn resolve(&self, ids: &mut dyn IdSource) -> TrackingIdentity {
        let mut fill = |field: &str, supplied: &Option<String>| match supplied_value(supplied) {
            Some(v) => v.to_string(),
            None => {
                let id = ids.next_id();
                log::debug!("synthesized {field} {id}");
                id
            }
        };
        TrackingIdentity {
            user_id: fill("userId", &self.user_id),
            session_id: fill("sessionId", &self.session_id),
            page_load_id: fill("pageLoadId", &self.page_load_id),
        }
    }
}

/// Resolved identity triple shared by every slot of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingIdentity {
    pub user_id: String,
    pub session_id: String,
    pub page_load_id: String,
}

impl TrackingIdentity {
    fn push_into(&self, params: &mut QueryParameterSet) {
        params.push("userId", self.user_id.as_str());
        params.push("sessionId", self.session_id.as_str());
        params.push("pageLoadId", self.page_load_id.as_str());
    }

    fn beacon_context(&self, site_id: &str) -> serde_json::Value {
        json!({
            "userId": self.user_id,
            "sessionId": self.session_id,
            "pageLoadId": self.page_load_id,
            "website": { "trackingCode": site_id },
        })
    }
}

/// Parameters for `search` and `facets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Site id. Falls back to the configured site.
    pub site_id: Option<String>,
    /// Search query text.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    pub results_per_page: Option<u32>,
    /// Field filters; array values are OR-ed (`{"brand": ["Nike", "Adidas"]}`).
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, FilterValue>")]
    pub filters: FieldMap<FilterValue>,
    /// Background filters, not reflected in facet state.
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, FilterValue>")]
    pub bgfilters: FieldMap<FilterValue>,
    /// Sort fields in priority order (`{"price": "asc"}`).
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, SortDirection>")]
    pub sort: FieldMap<SortDirection>,
    #[serde(default)]
    pub included_facets: Vec<String>,
    #[serde(default)]
    pub excluded_facets: Vec<String>,
    /// `direct`, `minimal` or `full`.
    pub redirect_response: Option<String>,
    pub landing_page: Option<String>,
    pub tag: Option<String>,
    /// Page URL the search runs on.
    pub domain: Option<String>,
    /// Logged-in shopper id for personalization.
    pub shopper: Option<String>,
    /// SKUs currently in the cart.
    #[serde(default)]
    pub cart: Vec<String>,
    /// Recently viewed SKUs, most recent first.
    #[serde(default)]
    pub last_viewed: Vec<String>,
    #[serde(flatten)]
    pub tracking: TrackingInput,
}

/// Parameters for `autocomplete`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteParams {
    pub site_id: Option<String>,
    /// Partial query typed by the shopper.
    pub q: String,
    pub results_per_page: Option<u32>,
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, FilterValue>")]
    pub filters: FieldMap<FilterValue>,
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, FilterValue>")]
    pub bgfilters: FieldMap<FilterValue>,
    #[serde(flatten)]
    pub tracking: TrackingInput,
}

/// Parameters for `suggest`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestParams {
    pub site_id: Option<String>,
    pub q: String,
    /// Two-letter language code, e.g. `en`.
    pub language: Option<String>,
    pub suggestion_count: Option<u32>,
    pub product_count: Option<u32>,
}

/// Parameters for `trending`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendingParams {
    pub site_id: Option<String>,
    /// Maximum number of trending queries.
    pub limit: Option<u32>,
}

/// Parameters for `recommendations`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsParams {
    pub site_id: Option<String>,
    /// Recommendation profile tags. Required.
    #[serde(default)]
    pub tags: Vec<String>,
    /// SKUs of the products being viewed.
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub brands: Vec<String>,
    /// SKUs that must never be recommended.
    #[serde(default)]
    pub blocked_items: Vec<String>,
    #[serde(default)]
    pub cart: Vec<String>,
    #[serde(default)]
    pub last_viewed: Vec<String>,
    /// Per-tag result limits, positionally matching `tags`.
    #[serde(default)]
    pub limits: Vec<u32>,
    pub shopper: Option<String>,
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, FilterValue>")]
    pub filters: FieldMap<FilterValue>,
    #[serde(flatten)]
    pub tracking: TrackingInput,
}

/// Parameters for `meta`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetaParams {
    pub site_id: Option<String>,
}

/// Beacon event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum BeaconEventType {
    #[serde(rename = "product.view")]
    ProductView,
    #[serde(rename = "cart.view")]
    CartView,
    #[serde(rename = "order.transaction")]
    OrderTransaction,
    #[serde(rename = "profile.render")]
    ProfileRender,
    #[serde(rename = "profile.impression")]
    ProfileImpression,
    #[serde(rename = "profile.click")]
    ProfileClick,
}

impl BeaconEventType {
    pub fn category(self) -> &'static str {
        match self {
            BeaconEventType::ProfileRender
            | BeaconEventType::ProfileImpression
            | BeaconEventType::ProfileClick => "searchspring.recommendations.user-interactions",
            _ => "searchspring.shopper.lifecycle",
        }
    }
}

/// One event in a beacon batch.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeaconEventInput {
    #[serde(rename = "type")]
    pub event_type: BeaconEventType,
    /// Event-specific data (e.g. `{"sku": "...", "qty": 1}`).
    #[serde(default)]
    pub event: serde_json::Value,
}

/// Parameters for `beacon`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BeaconParams {
    pub site_id: Option<String>,
    #[serde(default)]
    pub events: Vec<BeaconEventInput>,
    #[serde(flatten)]
    pub tracking: TrackingInput,
}

/// A request ready for the transport.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledRequest {
    pub operation: Operation,
    pub site_id: String,
    pub method: HttpMethod,
    pub path: String,
    pub params: QueryParameterSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<TrackingIdentity>,
}

impl CompiledRequest {
    fn new(operation: Operation, site_id: &str, params: QueryParameterSet) -> Self {
        Self {
            operation,
            site_id: site_id.to_string(),
            method: operation.method(),
            path: operation.path(site_id),
            params,
            body: None,
            identity: None,
        }
    }

    /// Path plus encoded query string.
    pub fn path_and_query(&self) -> String {
        if self.params.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.params.to_query_string())
        }
    }
}

/// Compiles operation parameters into [`CompiledRequest`]s.
///
/// Holds the configured default site id and the id source used for
/// tracking identity defaults. Build one per logical request.
pub struct RequestCompiler<I: IdSource = RandomIds> {
    default_site_id: Option<String>,
    ids: I,
}

impl RequestCompiler<RandomIds> {
    pub fn new(default_site_id: Option<String>) -> Self {
        Self::with_ids(default_site_id, RandomIds)
    }
}

impl<I: IdSource> RequestCompiler<I> {
    pub fn with_ids(default_site_id: Option<String>, ids: I) -> Self {
        Self {
            default_site_id,
            ids,
        }
    }

    fn site_id<'a>(&'a self, supplied: &'a Option<String>) -> CompileResult<&'a str> {
        supplied_value(supplied)
            .or_else(|| supplied_value(&self.default_site_id))
            .ok_or_else(|| CompileError::missing("siteId"))
    }

    /// Fixed leading keys of every search-family request.
    fn search_family_base(site_id: &str) -> QueryParameterSet {
        let mut params = QueryParameterSet::new();
        params.push("siteId", site_id);
        params.push("resultsFormat", RESULTS_FORMAT);
        params
    }

    pub fn search(&mut self, p: &SearchParams) -> CompileResult<CompiledRequest> {
        self.search_shaped(Operation::Search, p)
    }

    /// Facet-only search: `resultsPerPage` is pinned to `0` whatever the
    /// caller asked for.
    pub fn facets(&mut self, p: &SearchParams) -> CompileResult<CompiledRequest> {
        let mut request = self.search_shaped(Operation::Facets, p)?;
        if let Some(requested) = p.results_per_page.filter(|n| *n != 0) {
            log::debug!("ignoring resultsPerPage={requested} for facets request");
        }
        request.params.set("resultsPerPage", "0");
        Ok(request)
    }

    fn search_shaped(&mut self, op: Operation, p: &SearchParams) -> CompileResult<CompiledRequest> {
        let site_id = self.site_id(&p.site_id)?.to_string();
        check_page(p.page)?;

        let mut params = Self::search_family_base(&site_id);
        params.push_opt("q", p.q.as_deref());
        if let Some(page) = p.page {
            params.push("page", page.to_string());
        }
        if let Some(n) = p.results_per_page {
            params.push("resultsPerPage", n.to_string());
        }
        push_dotted_filters(&mut params, "filter", &p.filters);
        push_dotted_filters(&mut params, "bgfilter", &p.bgfilters);
        push_sort(&mut params, &p.sort);
        params.push_repeated("includedFacets", &p.included_facets);
        params.push_repeated("excludedFacets", &p.excluded_facets);
        params.push_opt("redirectResponse", p.redirect_response.as_deref());
        params.push_opt("landingPage", p.landing_page.as_deref());
        params.push_opt("tag", p.tag.as_deref());

        let identity = p.tracking.resolve(&mut self.ids);
        identity.push_into(&mut params);
        params.push_opt("domain", p.domain.as_deref());
        params.push_opt("shopper", p.shopper.as_deref());
        params.push_csv("cart", &p.cart);
        params.push_csv("lastViewed", &p.last_viewed);

        let mut request = CompiledRequest::new(op, &site_id, params);
        request.identity = Some(identity);
        log::debug!("compiled {} with {} params", op.name(), request.params.len());
        Ok(request)
    }

    pub fn autocomplete(&mut self, p: &AutocompleteParams) -> CompileResult<CompiledRequest> {
        let site_id = self.site_id(&p.site_id)?.to_string();
        let q = required_text(&p.q, "q")?;

        let mut params = Self::search_family_base(&site_id);
        params.push("q", q);
        if let Some(n) = p.results_per_page {
            params.push("resultsPerPage", n.to_string());
        }
        push_dotted_filters(&mut params, "filter", &p.filters);
        push_dotted_filters(&mut params, "bgfilter", &p.bgfilters);

        let identity = p.tracking.resolve(&mut self.ids);
        identity.push_into(&mut params);

        let mut request = CompiledRequest::new(Operation::Autocomplete, &site_id, params);
        request.identity = Some(identity);
        Ok(request)
    }

    pub fn suggest(&mut self, p: &SuggestParams) -> CompileResult<CompiledRequest> {
        let site_id = self.site_id(&p.site_id)?.to_string();
        let q = required_text(&p.q, "q")?;

        let mut params = QueryParameterSet::new();
        params.push("siteId", site_id.as_str());
        params.push("q", q);
        params.push_opt("language", p.language.as_deref());
        if let Some(n) = p.suggestion_count {
            params.push("suggestionCount", n.to_string());
        }
        if let Some(n) = p.product_count {
            params.push("productCount", n.to_string());
        }
        Ok(CompiledRequest::new(Operation::Suggest, &site_id, params))
    }

    pub fn trending(&mut self, p: &TrendingParams) -> CompileResult<CompiledRequest> {
        let site_id = self.site_id(&p.site_id)?.to_string();

        let mut params = QueryParameterSet::new();
        params.push("siteId", site_id.as_str());
        if let Some(limit) = p.limit {
            params.push("limit", limit.to_string());
        }
        Ok(CompiledRequest::new(Operation::Trending, &site_id, params))
    }

    pub fn recommendations(
        &mut self,
        p: &RecommendationsParams,
    ) -> CompileResult<CompiledRequest> {
        let site_id = self.site_id(&p.site_id)?.to_string();
        if p.tags.iter().all(|t| t.trim().is_empty()) {
            return Err(CompileError::missing("tags"));
        }

        let mut params = QueryParameterSet::new();
        params.push("siteId", site_id.as_str());
        params.push_csv("tags", &p.tags);
        params.push_csv("products", &p.products);
        params.push_csv("categories", &p.categories);
        params.push_csv("brands", &p.brands);
        params.push_csv("blockedItems", &p.blocked_items);
        params.push_csv("cart", &p.cart);
        params.push_csv("lastViewed", &p.last_viewed);
        let limits: Vec<String> = p.limits.iter().map(u32::to_string).collect();
        params.push_csv("limits", &limits);
        params.push_opt("shopper", p.shopper.as_deref());
        push_dotted_filters(&mut params, "filter", &p.filters);

        let identity = p.tracking.resolve(&mut self.ids);
        identity.push_into(&mut params);

        let mut request = CompiledRequest::new(Operation::Recommendations, &site_id, params);
        request.identity = Some(identity);
        Ok(request)
    }

    pub fn meta(&mut self, p: &MetaParams) -> CompileResult<CompiledRequest> {
        let site_id = self.site_id(&p.site_id)?.to_string();
        let params = Self::search_family_base(&site_id);
        Ok(CompiledRequest::new(Operation::Meta, &site_id, params))
    }

    /// Beacon batch. Every event's `context` carries the same identity.
    pub fn beacon(&mut self, p: &BeaconParams) -> CompileResult<CompiledRequest> {
        let site_id = self.site_id(&p.site_id)?.to_string();
        if p.events.is_empty() {
            return Err(CompileError::missing("events"));
        }

        let identity = p.tracking.resolve(&mut self.ids);
        let events: Vec<serde_json::Value> = p
            .events
            .iter()
            .map(|e| {
                json!({
                    "type": e.event_type,
                    "category": e.event_type.category(),
                    "id": self.ids.next_id(),
                    "event": e.event,
                    "context": identity.beacon_context(&site_id),
                })
            })
            .collect();

        let mut request = CompiledRequest::new(Operation::Beacon, &site_id, QueryParameterSet::new());
        request.body = Some(serde_json::Value::Array(events));
        request.identity = Some(identity);
        Ok(request)
    }

    /// Compile from a JSON argument bag, dispatching on `op`.
    pub fn compile_value(
        &mut self,
        op: Operation,
        args: serde_json::Value,
    ) -> CompileResult<CompiledRequest> {
        match op {
            Operation::Search => self.search(&parse_args(args)?),
            Operation::Facets => self.facets(&parse_args(args)?),
            Operation::Autocomplete => self.autocomplete(&parse_args(args)?),
            Operation::Suggest => self.suggest(&parse_args(args)?),
            Operation::Trending => self.trending(&parse_args(args)?),
            Operation::Recommendations => self.recommendations(&parse_args(args)?),
            Operation::Meta => self.meta(&parse_args(args)?),
            Operation::Beacon => self.beacon(&parse_args(args)?),
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: serde_json::Value) -> CompileResult<T> {
    serde_json::from_value(args).map_err(|e| CompileError::InvalidParameter {
        field: "params",
        reason: e.to_string(),
    })
}

fn supplied_value(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text<'a>(value: &'a str, field: &'static str) -> CompileResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CompileError::missing(field))
    } else {
        Ok(trimmed)
    }
}

fn check_page(page: Option<u32>) -> CompileResult<()> {
    match page {
        Some(0) => Err(CompileError::InvalidParameter {
            field: "page",
            reason: "pages are 1-based".to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{SeededIds, is_v4_shaped};

    fn compiler() -> RequestCompiler<SeededIds> {
        RequestCompiler::with_ids(Some("abc123".to_string()), SeededIds::new(42))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn search_params(json: serde_json::Value) -> SearchParams {
        serde_json::from_value(json).expect("valid search params")
    }

    #[test]
    fn search_emits_fixed_keys_first() {
        let req = compiler()
            .search(&search_params(json!({"q": "shoes", "page": 2})))
            .expect("compile");
        let keys = req.params.keys();
        assert_eq!(&keys[..4], &["siteId", "resultsFormat", "q", "page"]);
        assert_eq!(req.params.get("siteId"), Some("abc123"));
        assert_eq!(req.params.get("resultsFormat"), Some("native"));
        assert_eq!(req.path, "/api/search/search.json");
        assert_eq!(req.method, HttpMethod::Get);
    }

    #[test]
    fn array_filters_repeat_keys_instead_of_joining() {
        let req = compiler()
            .search(&search_params(json!({
                "filters": {"brand": ["Nike", "Adidas", "Puma"], "color": "red"},
                "bgfilters": {"stock_status": ["in", "backorder"]}
            })))
            .expect("compile");
        assert_eq!(req.params.count("filter.brand"), 3);
        assert_eq!(req.params.get_all("filter.brand"), vec!["Nike", "Adidas", "Puma"]);
        assert_eq!(req.params.count("filter.color"), 1);
        assert_eq!(req.params.get_all("bgfilter.stock_status"), vec!["in", "backorder"]);
        assert!(!req.params.iter().any(|(k, v)| k.starts_with("filter.") && v.contains(',')));
    }

    #[test]
    fn array_elements_are_sent_verbatim_one_key_each() {
        let req = compiler()
            .search(&search_params(json!({
                "filters": {"size": ["10", "", " 11 "]},
                "includedFacets": ["brand", ""]
            })))
            .expect("compile");
        assert_eq!(req.params.count("filter.size"), 3);
        assert_eq!(req.params.get_all("filter.size"), vec!["10", "", " 11 "]);
        assert_eq!(req.params.get_all("includedFacets"), vec!["brand", ""]);
    }

    #[test]
    fn compound_sort_keeps_mapping_order() {
        let req = compiler()
            .search(&search_params(json!({"sort": {"ratings": "desc", "price": "asc"}})))
            .expect("compile");
        let sorts: Vec<(&str, &str)> = req
            .params
            .iter()
            .filter(|(k, _)| k.starts_with("sort."))
            .collect();
        assert_eq!(sorts, vec![("sort.ratings", "desc"), ("sort.price", "asc")]);
    }

    #[test]
    fn facet_lists_are_repeated_not_comma_joined() {
        let req = compiler()
            .search(&search_params(json!({
                "includedFacets": ["brand", "color", "size"],
                "excludedFacets": ["price"]
            })))
            .expect("compile");
        assert_eq!(req.params.get_all("includedFacets"), vec!["brand", "color", "size"]);
        assert_eq!(req.params.get_all("excludedFacets"), vec!["price"]);
        assert!(req.params.get_all("includedFacets").iter().all(|v| !v.contains(',')));
    }

    #[test]
    fn csv_fields_join_and_empty_arrays_are_omitted() {
        let req = compiler()
            .search(&search_params(json!({"cart": ["a", "b"], "lastViewed": []})))
            .expect("compile");
        assert_eq!(req.params.count("cart"), 1);
        assert_eq!(req.params.get("cart"), Some("a,b"));
        assert!(!req.params.contains_key("lastViewed"));
    }

    #[test]
    fn synthesized_identity_matches_every_slot() {
        let req = compiler()
            .search(&search_params(json!({"q": "hat"})))
            .expect("compile");
        let identity = req.identity.as_ref().expect("identity");
        assert_eq!(req.params.get_all("userId"), vec![identity.user_id.as_str()]);
        assert_eq!(req.params.get_all("sessionId"), vec![identity.session_id.as_str()]);
        assert_eq!(req.params.get_all("pageLoadId"), vec![identity.page_load_id.as_str()]);
        assert!(is_v4_shaped(&identity.user_id));
        assert_ne!(identity.user_id, identity.session_id);
        assert_ne!(identity.session_id, identity.page_load_id);
    }

    #[test]
    fn supplied_identity_is_passed_through() {
        let req = compiler()
            .search(&search_params(json!({"userId": "u-1", "sessionId": "s-1"})))
            .expect("compile");
        assert_eq!(req.params.get("userId"), Some("u-1"));
        assert_eq!(req.params.get("sessionId"), Some("s-1"));
        assert!(is_v4_shaped(req.params.get("pageLoadId").expect("pageLoadId")));
    }

    #[test]
    fn beacon_events_share_one_identity() {
        let params: BeaconParams = serde_json::from_value(json!({
            "events": [
                {"type": "profile.render", "event": {"tag": "similar"}},
                {"type": "profile.impression", "event": {"tag": "similar"}},
                {"type": "cart.view", "event": {"items": [{"sku": "A1", "qty": 1}]}}
            ]
        }))
        .expect("beacon params");
        let req = compiler().beacon(&params).expect("compile");
        let identity = req.identity.expect("identity");
        let body = req.body.expect("body");
        let events = body.as_array().expect("array");
        assert_eq!(events.len(), 3);
        for event in events {
            assert_eq!(event["context"]["userId"], identity.user_id.as_str());
            assert_eq!(event["context"]["sessionId"], identity.session_id.as_str());
            assert_eq!(event["context"]["pageLoadId"], identity.page_load_id.as_str());
            assert_eq!(event["context"]["website"]["trackingCode"], "abc123");
        }
        assert_ne!(events[0]["id"], events[1]["id"]);
        assert_eq!(events[2]["category"], "searchspring.shopper.lifecycle");
        assert_eq!(req.method, HttpMethod::Post);
    }

    #[test]
    fn beacon_without_events_is_rejected() {
        let err = compiler().beacon(&BeaconParams::default()).unwrap_err();
        assert_eq!(err.field(), "events");
    }

    #[test]
    fn facets_pins_results_per_page_to_zero() {
        let req = compiler()
            .facets(&search_params(json!({"q": "shirt", "resultsPerPage": 48})))
            .expect("compile");
        assert_eq!(req.params.get_all("resultsPerPage"), vec!["0"]);
        assert_eq!(req.operation, Operation::Facets);
    }

    #[test]
    fn facets_adds_pin_when_caller_omits_it() {
        let req = compiler()
            .facets(&SearchParams::default())
            .expect("compile");
        assert_eq!(req.params.get_all("resultsPerPage"), vec!["0"]);
    }

    #[test]
    fn recommendations_without_tags_fails_naming_tags() {
        let params = RecommendationsParams::default();
        let err = compiler().recommendations(&params).unwrap_err();
        assert_eq!(err.field(), "tags");
        assert!(err.to_string().contains("tags"));

        let blank = RecommendationsParams {
            tags: strings(&["", " "]),
            ..Default::default()
        };
        assert_eq!(compiler().recommendations(&blank).unwrap_err().field(), "tags");
    }

    #[test]
    fn recommendations_use_csv_for_every_list() {
        let params = RecommendationsParams {
            tags: strings(&["similar", "crosssell"]),
            products: strings(&["P1"]),
            categories: strings(&["shoes", "boots"]),
            brands: strings(&["Nike"]),
            blocked_items: strings(&["X1", "X2"]),
            cart: strings(&["C1", "C2"]),
            last_viewed: strings(&["L1", "L2", "L3"]),
            limits: vec![5, 10],
            ..Default::default()
        };
        let req = compiler().recommendations(&params).expect("compile");
        assert_eq!(req.path, "/boost/abc123/recommend");
        for (key, joined) in [
            ("tags", "similar,crosssell"),
            ("products", "P1"),
            ("categories", "shoes,boots"),
            ("brands", "Nike"),
            ("blockedItems", "X1,X2"),
            ("cart", "C1,C2"),
            ("lastViewed", "L1,L2,L3"),
            ("limits", "5,10"),
        ] {
            assert_eq!(req.params.count(key), 1, "{key}");
            assert_eq!(req.params.get(key), Some(joined), "{key}");
        }
        assert_eq!(&req.params.keys()[..2], &["siteId", "tags"]);
    }

    #[test]
    fn recommendations_omit_empty_csv_fields() {
        let params = RecommendationsParams {
            tags: strings(&["similar"]),
            ..Default::default()
        };
        let req = compiler().recommendations(&params).expect("compile");
        for key in ["products", "categories", "brands", "blockedItems", "cart", "lastViewed", "limits"] {
            assert!(!req.params.contains_key(key), "{key} should be omitted");
        }
    }

    #[test]
    fn missing_site_id_is_rejected() {
        let mut compiler = RequestCompiler::with_ids(None, SeededIds::new(1));
        let err = compiler.meta(&MetaParams::default()).unwrap_err();
        assert_eq!(err.field(), "siteId");
    }

    #[test]
    fn caller_site_id_overrides_default() {
        let req = compiler()
            .meta(&MetaParams {
                site_id: Some("zzz999".to_string()),
            })
            .expect("compile");
        assert_eq!(req.params.get("siteId"), Some("zzz999"));
    }

    #[test]
    fn page_zero_is_rejected() {
        let err = compiler()
            .search(&search_params(json!({"page": 0})))
            .unwrap_err();
        assert_eq!(err.field(), "page");
    }

    #[test]
    fn autocomplete_and_suggest_require_query() {
        let err = compiler()
            .autocomplete(&AutocompleteParams::default())
            .unwrap_err();
        assert_eq!(err.field(), "q");
        let err = compiler().suggest(&SuggestParams::default()).unwrap_err();
        assert_eq!(err.field(), "q");
    }

    #[test]
    fn suggest_and_trending_carry_no_identity() {
        let req = compiler()
            .suggest(&SuggestParams {
                q: "sho".to_string(),
                suggestion_count: Some(5),
                ..Default::default()
            })
            .expect("compile");
        assert!(req.identity.is_none());
        assert_eq!(req.params.keys(), vec!["siteId", "q", "suggestionCount"]);

        let req = compiler()
            .trending(&TrendingParams {
                site_id: None,
                limit: Some(6),
            })
            .expect("compile");
        assert_eq!(req.path_and_query(), "/api/suggest/trending?siteId=abc123&limit=6");
    }

    #[test]
    fn compile_value_dispatches_by_operation() {
        let req = compiler()
            .compile_value(Operation::Autocomplete, json!({"q": "jea"}))
            .expect("compile");
        assert_eq!(req.path, "/api/search/autocomplete.json");

        let err = compiler()
            .compile_value(Operation::Search, json!({"sort": {"price": "sideways"}}))
            .unwrap_err();
        assert_eq!(err.field(), "params");
    }

    #[test]
    fn operation_names_parse_with_tracking_alias() {
        assert_eq!("tracking".parse::<Operation>(), Ok(Operation::Beacon));
        assert_eq!("Beacon".parse::<Operation>(), Ok(Operation::Beacon));
        assert_eq!("facets".parse::<Operation>(), Ok(Operation::Facets));
        assert!("checkout".parse::<Operation>().is_err());
    }
}
