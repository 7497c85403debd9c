// @awa-component: VAL-CodeValidator
//
//! Heuristic validator for pasted integration code.
//!
//! Runs a fixed battery of surface-text checks for the declared code type,
//! an optional platform battery, and keyword-triggered troubleshooting.
//! Matching is case-insensitive substring containment; no parsing happens.
//! The validator never fails: garbage in yields a report full of findings.

use std::fmt::Write as _;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

/// What kind of code is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    /// Beacon/tracking event code.
    #[serde(alias = "beacon")]
    Tracking,
    Search,
    Autocomplete,
    Recommendations,
}

impl CodeType {
    pub fn name(self) -> &'static str {
        match self {
            CodeType::Tracking => "tracking",
            CodeType::Search => "search",
            CodeType::Autocomplete => "autocomplete",
            CodeType::Recommendations => "recommendations",
        }
    }
}

/// Storefront platform the snippet lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Shopify,
    #[serde(alias = "big-commerce")]
    Bigcommerce,
    #[serde(alias = "magento")]
    Magento2,
    Custom,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Shopify,
        Platform::Bigcommerce,
        Platform::Magento2,
        Platform::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Shopify => "shopify",
            Platform::Bigcommerce => "bigcommerce",
            Platform::Magento2 => "magento2",
            Platform::Custom => "custom",
        }
    }
}

/// Validator input.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationInput {
    /// Source code to check.
    pub code: String,
    pub code_type: CodeType,
    pub platform: Option<Platform>,
    /// Free-text description of the problem the user is seeing.
    pub issue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationFinding {
    pub severity: Severity,
    pub message: String,
}

/// One matched troubleshooting group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Troubleshooting {
    pub title: &'static str,
    pub guidance: &'static str,
}

/// Result of a validation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub code_type: CodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    pub findings: Vec<ValidationFinding>,
    pub passed: Vec<&'static str>,
    pub troubleshooting: Vec<Troubleshooting>,
}

impl ValidationReport {
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationFinding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }

    pub fn errors(&self) -> Vec<&ValidationFinding> {
        self.with_severity(Severity::Error).collect()
    }

    pub fn warnings(&self) -> Vec<&ValidationFinding> {
        self.with_severity(Severity::Warning).collect()
    }

    pub fn suggestions(&self) -> Vec<&ValidationFinding> {
        self.with_severity(Severity::Suggestion).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.with_severity(Severity::Error).next().is_some()
    }

    /// Markdown rendering: findings by severity, passed checks,
    /// troubleshooting, then support links.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "## Code Validation Report ({})", self.code_type.name());
        if let Some(platform) = self.platform {
            let _ = write!(out, ", platform: {}", platform.name());
        }
        out.push_str("\n\n");

        let errors = self.errors();
        let warnings = self.warnings();
        let suggestions = self.suggestions();
        let _ = writeln!(
            out,
            "Result: {} error(s), {} warning(s), {} suggestion(s)\n",
            errors.len(),
            warnings.len(),
            suggestions.len()
        );

        for (label, findings) in [
            ("Errors", errors),
            ("Warnings", warnings),
            ("Suggestions", suggestions),
        ] {
            if findings.is_empty() {
                continue;
            }
            let _ = writeln!(out, "### {label} ({})", findings.len());
            for f in findings {
                let _ = writeln!(out, "- {}", f.message);
            }
            out.push('\n');
        }

        if !self.passed.is_empty() {
            let _ = writeln!(out, "### Passed ({})", self.passed.len());
            for p in &self.passed {
                let _ = writeln!(out, "- {p}");
            }
            out.push('\n');
        }

        for t in &self.troubleshooting {
            let _ = writeln!(out, "### Troubleshooting: {}\n{}\n", t.title, t.guidance);
        }

        out.push_str("### Support Resources\n");
        for (title, url) in SUPPORT_LINKS {
            let _ = writeln!(out, "- {title}: {url}");
        }
        out
    }
}

/// Fixed support links appended to every report.
pub const SUPPORT_LINKS: &[(&str, &str)] = &[
    ("Tracking documentation", "https://docs.searchspring.com/reference/tracking"),
    ("Search API reference", "https://docs.searchspring.com/reference/search"),
    ("Recommendations API reference", "https://docs.searchspring.com/reference/recommendations"),
    ("Support", "https://help.searchspring.net"),
];

/// Predicate shapes. Markers are lowercase; the snippet is lowercased once.
enum Rule {
    /// Passes when any marker is present.
    Present(&'static [&'static str]),
    /// Passes when no marker is present.
    Absent(&'static [&'static str]),
    /// Applies when any `when` marker is present; each labelled field group
    /// must then have at least one marker present.
    Requires {
        when: &'static [&'static str],
        fields: &'static [(&'static str, &'static [&'static str])],
    },
    /// Applies when any `when` marker is present; fails unless an `unless`
    /// marker is also present.
    Forbids {
        when: &'static [&'static str],
        unless: &'static [&'static str],
    },
    /// Hand-written check; `None` means not applicable.
    Inspect(fn(&str) -> Option<bool>),
}

struct Check {
    severity: Severity,
    rule: Rule,
    /// Finding text when the check fails.
    failure: &'static str,
    /// Recorded under "Passed" when the check holds.
    success: &'static str,
}

enum Outcome {
    Pass,
    Fail(Vec<&'static str>),
    NotApplicable,
}

fn any_of(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

impl Check {
    fn evaluate(&self, code: &str) -> Outcome {
        match &self.rule {
            Rule::Present(markers) => pass_if(any_of(code, markers)),
            Rule::Absent(markers) => pass_if(!any_of(code, markers)),
            Rule::Requires { when, fields } => {
                if !any_of(code, when) {
                    return Outcome::NotApplicable;
                }
                let missing: Vec<&'static str> = fields
                    .iter()
                    .filter(|(_, markers)| !any_of(code, markers))
                    .map(|(label, _)| *label)
                    .collect();
                if missing.is_empty() {
                    Outcome::Pass
                } else {
                    Outcome::Fail(missing)
                }
            }
            Rule::Forbids { when, unless } => {
                if !any_of(code, when) {
                    Outcome::NotApplicable
                } else {
                    pass_if(any_of(code, unless))
                }
            }
            Rule::Inspect(inspect) => match inspect(code) {
                Some(ok) => pass_if(ok),
                None => Outcome::NotApplicable,
            },
        }
    }
}

fn pass_if(ok: bool) -> Outcome {
    if ok { Outcome::Pass } else { Outcome::Fail(Vec::new()) }
}

const SCRIPT_MARKERS: &[&str] = &[
    "snapui.searchspring.io",
    "cdn.searchspring.net",
    "searchspring.js",
    "bundle.js",
];

const SCRIPT_INCLUDED: Check = Check {
    severity: Severity::Error,
    rule: Rule::Present(SCRIPT_MARKERS),
    failure: "Missing script inclusion: add the bundle <script> tag (https://snapui.searchspring.io/<siteId>/bundle.js) before any tracking calls",
    success: "Script inclusion found",
};

const SITE_ID_MARKERS: &[&str] = &["siteid", "site_id", "trackingcode"];

const BUNDLE_HOST: &str = "snapui.searchspring.io/";

/// Values in the site id slot that were never filled in.
const SITE_ID_PLACEHOLDERS: &[&str] = &["your_site_id", "your-site-id", "{site_id}", "<siteid>"];

/// A site id is named explicitly or is the first path segment of the bundle
/// URL. Placeholders count as neither.
fn has_site_id(code: &str) -> Option<bool> {
    let code = SITE_ID_PLACEHOLDERS
        .iter()
        .fold(code.to_string(), |code, placeholder| code.replace(placeholder, ""));
    if any_of(&code, SITE_ID_MARKERS) {
        return Some(true);
    }
    let in_bundle_url = code.match_indices(BUNDLE_HOST).any(|(at, _)| {
        let rest = &code[at + BUNDLE_HOST.len()..];
        let segment = rest.split('/').next().unwrap_or_default();
        rest.contains('/')
            && !segment.is_empty()
            && !segment.contains(|c: char| c.is_whitespace() || c == '"' || c == '\'')
    });
    Some(in_bundle_url)
}

/// Fails when a `filter.<field>=` value carries a comma or the values are
/// built with `.join(` on the same line as `filter.`.
fn filters_repeat_keys(code: &str) -> Option<bool> {
    if !code.contains("filter.") {
        return None;
    }
    let literal_csv = code.match_indices("filter.").any(|(at, _)| {
        let rest = &code[at..];
        let pair_end = rest
            .find(|c: char| matches!(c, '&' | '"' | '\'' | '`' | '\n') || c.is_whitespace())
            .unwrap_or(rest.len());
        let pair = &rest[..pair_end];
        match pair.split_once('=') {
            Some((_, value)) => value.contains(',') || value.contains("%2c"),
            None => false,
        }
    });
    let joined = code
        .lines()
        .any(|line| line.contains("filter.") && line.contains(".join("));
    Some(!literal_csv && !joined)
}

const SITE_ID: Check = Check {
    severity: Severity::Error,
    rule: Rule::Inspect(has_site_id),
    failure: "No site id found; requests and events cannot be attributed to your site",
    success: "Site id present",
};

const ERROR_HANDLING: Check = Check {
    severity: Severity::Warning,
    rule: Rule::Present(&[".catch(", "catch (", "catch(", "try {", "try{"]),
    failure: "No error handling around the API call; failed requests will break the page silently",
    success: "Error handling present",
};

const IDENTITY: Check = Check {
    severity: Severity::Warning,
    rule: Rule::Present(&["userid", "sessionid"]),
    failure: "userId/sessionId not passed; results will not be personalized or attributed to the shopper",
    success: "Shopper identity passed",
};

const ENCODE_QUERY: Check = Check {
    severity: Severity::Suggestion,
    rule: Rule::Requires {
        when: &["q="],
        fields: &[("URL encoding", &["encodeuricomponent", "urlsearchparams"])],
    },
    failure: "Encode query text with encodeURIComponent or URLSearchParams",
    success: "Query text is encoded",
};

const NO_XHR: Check = Check {
    severity: Severity::Suggestion,
    rule: Rule::Absent(&["xmlhttprequest"]),
    failure: "Prefer fetch() over XMLHttpRequest",
    success: "Uses fetch-style requests",
};

const TRACKING_CHECKS: &[Check] = &[
    SCRIPT_INCLUDED,
    SITE_ID,
    Check {
        severity: Severity::Error,
        rule: Rule::Present(&[
            "track.product.view",
            "track.cart.view",
            "track.order.transaction",
            "track.event",
            "/beacon",
        ]),
        failure: "No tracking call found (e.g. searchspring.tracker.track.product.view)",
        success: "Tracking call found",
    },
    Check {
        severity: Severity::Error,
        rule: Rule::Requires {
            when: &["track.product.view"],
            fields: &[("SKU field (`sku`)", &["sku", "uid"])],
        },
        failure: "Product view tracking must identify the product",
        success: "Product view tracking identifies the product",
    },
    Check {
        severity: Severity::Error,
        rule: Rule::Requires {
            when: &["track.cart.view"],
            fields: &[
                ("SKU field (`sku`)", &["sku"]),
                ("quantity field (`qty`)", &["qty", "quantity"]),
            ],
        },
        failure: "Cart tracking items are incomplete",
        success: "Cart tracking items carry sku and qty",
    },
    Check {
        severity: Severity::Error,
        rule: Rule::Requires {
            when: &["track.order.transaction"],
            fields: &[
                ("order id (`id`)", &["orderid", "order_id", "order.id", "id:"]),
                ("order total (`total`)", &["total"]),
                ("item quantities (`qty`)", &["qty", "quantity"]),
            ],
        },
        failure: "Order transaction tracking is incomplete",
        success: "Order transaction tracking carries id, total and quantities",
    },
    Check {
        severity: Severity::Warning,
        rule: Rule::Requires {
            when: &["track.cart.view", "track.order.transaction"],
            fields: &[("price field (`price`)", &["price"])],
        },
        failure: "Items should include a price for revenue attribution",
        success: "Items include price",
    },
    Check {
        severity: Severity::Warning,
        rule: Rule::Present(&[
            "defer",
            "domcontentloaded",
            "addeventlistener('load'",
            "addeventlistener(\"load\"",
            "window.onload",
        ]),
        failure: "Tracking calls should run after the bundle loads: defer the script or wrap calls in a DOMContentLoaded listener",
        success: "Tracking waits for the bundle to load",
    },
    Check {
        severity: Severity::Warning,
        rule: Rule::Absent(&["your_site_id", "your-site-id", "example-sku", "replace_me"]),
        failure: "Placeholder values found; replace them with real template output",
        success: "No placeholder values",
    },
    Check {
        severity: Severity::Suggestion,
        rule: Rule::Absent(&["var "]),
        failure: "Prefer `const`/`let` over `var`",
        success: "No `var` declarations",
    },
    Check {
        severity: Severity::Suggestion,
        rule: Rule::Absent(&["console.log"]),
        failure: "Remove console.log debugging before going live",
        success: "No console.log debugging",
    },
];

const SEARCH_CHECKS: &[Check] = &[
    Check {
        severity: Severity::Error,
        rule: Rule::Present(&["/api/search/search.json", "search.json"]),
        failure: "No search endpoint call found (expected /api/search/search.json)",
        success: "Search endpoint call found",
    },
    SITE_ID,
    Check {
        severity: Severity::Warning,
        rule: Rule::Present(&["resultsformat"]),
        failure: "Add resultsFormat=native to receive the native response shape",
        success: "resultsFormat set",
    },
    Check {
        severity: Severity::Warning,
        rule: Rule::Inspect(filters_repeat_keys),
        failure: "Multi-value filters must repeat the filter.<field> key once per value, not join values with commas",
        success: "Filters appear to repeat keys per value",
    },
    IDENTITY,
    ERROR_HANDLING,
    ENCODE_QUERY,
    NO_XHR,
];

const AUTOCOMPLETE_CHECKS: &[Check] = &[
    Check {
        severity: Severity::Error,
        rule: Rule::Present(&["/api/search/autocomplete.json", "autocomplete.json"]),
        failure: "No autocomplete endpoint call found (expected /api/search/autocomplete.json)",
        success: "Autocomplete endpoint call found",
    },
    SITE_ID,
    Check {
        severity: Severity::Warning,
        rule: Rule::Present(&["debounce", "settimeout"]),
        failure: "Debounce keystrokes before calling autocomplete to avoid a request per key press",
        success: "Keystrokes are debounced",
    },
    IDENTITY,
    ERROR_HANDLING,
    ENCODE_QUERY,
    NO_XHR,
];

const RECOMMENDATIONS_CHECKS: &[Check] = &[
    Check {
        severity: Severity::Error,
        rule: Rule::Present(&["/recommend", "/boost/"]),
        failure: "No recommendations endpoint call found (expected /boost/<siteId>/recommend)",
        success: "Recommendations endpoint call found",
    },
    SITE_ID,
    Check {
        severity: Severity::Error,
        rule: Rule::Present(&["tags"]),
        failure: "No profile tags passed; the recommendations API requires `tags`",
        success: "Profile tags passed",
    },
    Check {
        severity: Severity::Warning,
        rule: Rule::Present(&["products=", "products:", "product=", "cart", "lastviewed"]),
        failure: "Pass products, cart or lastViewed context so recommendations are relevant",
        success: "Shopper context passed",
    },
    Check {
        severity: Severity::Warning,
        rule: Rule::Present(&["profile.render", "profile.impression", "/beacon"]),
        failure: "Report profile.render and profile.impression beacon events so recommendation performance is measured",
        success: "Recommendation events reported",
    },
    ERROR_HANDLING,
    NO_XHR,
];

const SHOPIFY_CHECKS: &[Check] = &[
    Check {
        severity: Severity::Warning,
        rule: Rule::Present(&["{{", "{%"]),
        failure: "No Liquid output found; output product data with Liquid (e.g. {{ product.selected_or_first_available_variant.sku }})",
        success: "Liquid output found",
    },
    Check {
        severity: Severity::Suggestion,
        rule: Rule::Absent(&["product.variants[0]", "product.variants.first"]),
        failure: "product.variants.first ignores the selected variant; use product.selected_or_first_available_variant",
        success: "Variant access follows the selected variant",
    },
];

const BIGCOMMERCE_CHECKS: &[Check] = &[Check {
    severity: Severity::Suggestion,
    rule: Rule::Forbids {
        when: &["product.sku"],
        unless: &["product.id"],
    },
    failure: "product.sku is empty for products without a SKU; fall back with {{#if product.sku}}{{product.sku}}{{else}}{{product.id}}{{/if}}",
    success: "SKU access has a product.id fallback",
}];

const MAGENTO_CHECKS: &[Check] = &[
    Check {
        severity: Severity::Warning,
        rule: Rule::Present(&["<?php", "<?=", "$block->"]),
        failure: "No PHP template output found; render values from the block (e.g. <?= $block->escapeJs($product->getSku()) ?>)",
        success: "PHP template output found",
    },
    Check {
        severity: Severity::Suggestion,
        rule: Rule::Forbids {
            when: &["getsku()", "getname()"],
            unless: &["escapejs", "escapehtml"],
        },
        failure: "Escape template output with $block->escapeJs() before embedding it in script",
        success: "Template output is escaped",
    },
];

fn battery(code_type: CodeType) -> &'static [Check] {
    match code_type {
        CodeType::Tracking => TRACKING_CHECKS,
        CodeType::Search => SEARCH_CHECKS,
        CodeType::Autocomplete => AUTOCOMPLETE_CHECKS,
        CodeType::Recommendations => RECOMMENDATIONS_CHECKS,
    }
}

fn platform_battery(platform: Platform) -> &'static [Check] {
    match platform {
        Platform::Shopify => SHOPIFY_CHECKS,
        Platform::Bigcommerce => BIGCOMMERCE_CHECKS,
        Platform::Magento2 => MAGENTO_CHECKS,
        Platform::Custom => &[],
    }
}

struct IssueGroup {
    keywords: &'static [&'static str],
    title: &'static str,
    guidance: &'static str,
}

/// Troubleshooting groups, in presentation order.
const ISSUE_GROUPS: &[IssueGroup] = &[
    IssueGroup {
        keywords: &["not working", "not tracking", "no data", "not firing"],
        title: "Tracking not firing",
        guidance: "Open the browser network tab and filter for `beacon`. If no requests appear, \
the tracking call is never reached: confirm the script tag is present on the page, that the call \
runs on the right template (product, cart or order confirmation), and that no earlier script error \
stops execution. If requests appear but data is missing in the dashboard, check that the site id \
matches your account and allow up to an hour for processing.",
    },
    IssueGroup {
        keywords: &["undefined", "is not defined"],
        title: "Script load order",
        guidance: "`searchspring is not defined` means the tracking call ran before the bundle \
finished loading. Load the bundle with `defer` and wrap tracking calls in a `DOMContentLoaded` \
listener, or move the calls below the script tag. Avoid `async` on the bundle when inline calls \
depend on it.",
    },
    IssueGroup {
        keywords: &["search", "results"],
        title: "API integration",
        guidance: "Call `/api/search/search.json` with `siteId` and `resultsFormat=native`. Pass \
each filter value as its own `filter.<field>` key (do not comma-join values), use \
`bgfilter.<field>` for filters hidden from the shopper, and `sort.<field>=asc|desc` for sorting. \
An empty result set usually means a filter value does not match the indexed value exactly; \
inspect `facets` in the response for valid values.",
    },
    IssueGroup {
        keywords: &["recommend", "recs"],
        title: "Recommendations",
        guidance: "The recommendations endpoint `/boost/<siteId>/recommend` requires `tags` \
matching a profile configured in the dashboard. Empty responses usually mean the tag is wrong or \
the profile has no products for the supplied `products`/`cart` context. Send `profile.render` and \
`profile.impression` beacon events so the profile can learn.",
    },
    IssueGroup {
        keywords: &["cors", "blocked"],
        title: "CORS and blocked requests",
        guidance: "Search and recommendation endpoints allow browser requests; a CORS error \
usually means the URL is wrong (check the site id subdomain) or a proxy strips headers. Ad \
blockers can block beacon requests; verify in a private window with extensions disabled.",
    },
];

/// Validate a snippet. Every check in the selected batteries runs.
pub fn validate(input: &ValidationInput) -> ValidationReport {
    let code = input.code.to_lowercase();

    let mut findings = Vec::new();
    let mut passed = Vec::new();

    let platform_checks = input.platform.map(platform_battery).unwrap_or(&[]);
    for check in battery(input.code_type).iter().chain(platform_checks) {
        match check.evaluate(&code) {
            Outcome::Pass => passed.push(check.success),
            Outcome::NotApplicable => {}
            Outcome::Fail(missing) => {
                let message = if missing.is_empty() {
                    check.failure.to_string()
                } else {
                    format!("{}: missing {}", check.failure, missing.join(", "))
                };
                findings.push(ValidationFinding {
                    severity: check.severity,
                    message,
                });
            }
        }
    }

    let troubleshooting = input
        .issue
        .as_deref()
        .map(classify_issue)
        .unwrap_or_default();

    log::debug!(
        "validated {} snippet: {} findings, {} passed, {} troubleshooting",
        input.code_type.name(),
        findings.len(),
        passed.len(),
        troubleshooting.len()
    );

    ValidationReport {
        code_type: input.code_type,
        platform: input.platform,
        findings,
        passed,
        troubleshooting,
    }
}

/// Match an issue description against every troubleshooting group.
pub fn classify_issue(issue: &str) -> Vec<Troubleshooting> {
    let issue = issue.to_lowercase();
    ISSUE_GROUPS
        .iter()
        .filter(|g| any_of(&issue, g.keywords))
        .map(|g| Troubleshooting {
            title: g.title,
            guidance: g.guidance,
        })
        .collect()
}
