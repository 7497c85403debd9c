// @awa-component: MCP-GuidanceTools
//
//! Static guidance tools: tracking snippets, endpoint reference, validation.

use shopsearch_core::guidance;
use shopsearch_core::validator::{self, ValidationInput};

use crate::tools::params::{ApiReferenceRequest, TrackingCodeRequest};

/// Embedded when neither the call nor the configuration names a site.
pub const SITE_ID_PLACEHOLDER: &str = "YOUR_SITE_ID";

fn pick_site_id<'a>(requested: &'a Option<String>, configured: Option<&'a str>) -> &'a str {
    requested
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(configured)
        .unwrap_or(SITE_ID_PLACEHOLDER)
}

/// Tracking snippet for `get_tracking_code` / `get_beacon_code`.
pub fn tracking_code(req: &TrackingCodeRequest, configured_site: Option<&str>) -> String {
    let site_id = pick_site_id(&req.site_id, configured_site);
    let mut out = guidance::render_tracking_code(site_id, req.platform, req.event);
    if site_id == SITE_ID_PLACEHOLDER {
        out.push_str("\nReplace YOUR_SITE_ID with your site id before deploying.\n");
    }
    out
}

/// Endpoint reference for `get_api_reference`.
pub fn api_reference(req: &ApiReferenceRequest, configured_site: Option<&str>) -> String {
    let site_id = pick_site_id(&req.site_id, configured_site);
    match guidance::endpoint_reference(req.operation) {
        Some(reference) => guidance::render_endpoint_reference(reference, site_id),
        None => format!("No reference available for {}", req.operation.name()),
    }
}

/// Rendered validation report for `validate_code`.
pub fn validation_report(input: &ValidationInput) -> String {
    validator::validate(input).render()
}
