// @awa-component: DOC-GuidanceTables
//
//! Static integration guidance: tracking snippets per platform and event,
//! and endpoint reference text per operation.
//!
//! Pure lookup data. Snippets use `{site_id}` as their only placeholder.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::request::{HttpMethod, Operation};
use crate::validator::Platform;

/// Events a storefront tracks through the tracking script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrackingEvent {
    #[serde(alias = "product")]
    ProductView,
    #[serde(alias = "cart")]
    CartView,
    #[serde(alias = "order", alias = "transaction")]
    OrderTransaction,
}

impl TrackingEvent {
    pub const ALL: [TrackingEvent; 3] = [
        TrackingEvent::ProductView,
        TrackingEvent::CartView,
        TrackingEvent::OrderTransaction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TrackingEvent::ProductView => "product_view",
            TrackingEvent::CartView => "cart_view",
            TrackingEvent::OrderTransaction => "order_transaction",
        }
    }

    /// Page template the snippet belongs on.
    pub fn placement(self) -> &'static str {
        match self {
            TrackingEvent::ProductView => "product detail page",
            TrackingEvent::CartView => "cart page",
            TrackingEvent::OrderTransaction => "order confirmation page",
        }
    }
}

const SCRIPT_TAG: &str = r#"<script src="https://snapui.searchspring.io/{site_id}/bundle.js" id="searchspring-context" defer></script>"#;

type TemplateRow = (Platform, TrackingEvent, &'static str);

const TRACKING_TEMPLATES: &[TemplateRow] = &[
    (
        Platform::Shopify,
        TrackingEvent::ProductView,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.product.view({
      sku: '{{ product.selected_or_first_available_variant.sku }}',
      childSku: '{{ product.selected_or_first_available_variant.id }}',
    });
  });
</script>"#,
    ),
    (
        Platform::Shopify,
        TrackingEvent::CartView,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.cart.view({
      items: [
        {% for item in cart.items %}
        { sku: '{{ item.sku }}', qty: {{ item.quantity }}, price: {{ item.final_price | money_without_currency | remove: ',' }} },
        {% endfor %}
      ],
    });
  });
</script>"#,
    ),
    (
        Platform::Shopify,
        TrackingEvent::OrderTransaction,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.order.transaction({
      order: {
        id: '{{ order.order_number }}',
        total: {{ order.total_price | money_without_currency | remove: ',' }},
      },
      items: [
        {% for item in order.line_items %}
        { sku: '{{ item.sku }}', qty: {{ item.quantity }}, price: {{ item.final_price | money_without_currency | remove: ',' }} },
        {% endfor %}
      ],
    });
  });
</script>"#,
    ),
    (
        Platform::Bigcommerce,
        TrackingEvent::ProductView,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.product.view({
      sku: '{{#if product.sku}}{{product.sku}}{{else}}{{product.id}}{{/if}}',
    });
  });
</script>"#,
    ),
    (
        Platform::Bigcommerce,
        TrackingEvent::CartView,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.cart.view({
      items: [
        {{#each cart.items}}
        { sku: '{{#if sku}}{{sku}}{{else}}{{product_id}}{{/if}}', qty: {{quantity}}, price: {{price.value}} },
        {{/each}}
      ],
    });
  });
</script>"#,
    ),
    (
        Platform::Bigcommerce,
        TrackingEvent::OrderTransaction,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.order.transaction({
      order: { id: '{{checkout.order.id}}', total: {{checkout.order.total.value}} },
      items: [
        {{#each checkout.order.items}}
        { sku: '{{#if sku}}{{sku}}{{else}}{{product_id}}{{/if}}', qty: {{quantity}}, price: {{price.value}} },
        {{/each}}
      ],
    });
  });
</script>"#,
    ),
    (
        Platform::Magento2,
        TrackingEvent::ProductView,
        r#"<?php $product = $block->getProduct(); ?>
<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.product.view({
      sku: '<?= $block->escapeJs($product->getSku()) ?>',
    });
  });
</script>"#,
    ),
    (
        Platform::Magento2,
        TrackingEvent::CartView,
        r#"<?php $items = $block->getQuote()->getAllVisibleItems(); ?>
<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.cart.view({
      items: [
        <?php foreach ($items as $item): ?>
        { sku: '<?= $block->escapeJs($item->getSku()) ?>', qty: <?= (int) $item->getQty() ?>, price: <?= (float) $item->getPrice() ?> },
        <?php endforeach; ?>
      ],
    });
  });
</script>"#,
    ),
    (
        Platform::Magento2,
        TrackingEvent::OrderTransaction,
        r#"<?php $order = $block->getOrder(); ?>
<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.order.transaction({
      order: {
        id: '<?= $block->escapeJs($order->getIncrementId()) ?>',
        total: <?= (float) $order->getGrandTotal() ?>,
      },
      items: [
        <?php foreach ($order->getAllVisibleItems() as $item): ?>
        { sku: '<?= $block->escapeJs($item->getSku()) ?>', qty: <?= (int) $item->getQtyOrdered() ?>, price: <?= (float) $item->getPrice() ?> },
        <?php endforeach; ?>
      ],
    });
  });
</script>"#,
    ),
    (
        Platform::Custom,
        TrackingEvent::ProductView,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.product.view({ sku: product.sku });
  });
</script>"#,
    ),
    (
        Platform::Custom,
        TrackingEvent::CartView,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.cart.view({
      items: cart.items.map((item) => ({ sku: item.sku, qty: item.quantity, price: item.price })),
    });
  });
</script>"#,
    ),
    (
        Platform::Custom,
        TrackingEvent::OrderTransaction,
        r#"<script>
  window.addEventListener('DOMContentLoaded', () => {
    searchspring.tracker.track.order.transaction({
      order: { id: order.id, total: order.total },
      items: order.items.map((item) => ({ sku: item.sku, qty: item.quantity, price: item.price })),
    });
  });
</script>"#,
    ),
];

/// Raw template for a platform and event.
pub fn tracking_template(platform: Platform, event: TrackingEvent) -> Option<&'static str> {
    TRACKING_TEMPLATES
        .iter()
        .find(|(p, e, _)| *p == platform && *e == event)
        .map(|(_, _, t)| *t)
}

/// Script tag for a site.
pub fn script_tag(site_id: &str) -> String {
    SCRIPT_TAG.replace("{site_id}", site_id)
}

/// Complete tracking snippet: script tag followed by the event call.
pub fn render_tracking_code(site_id: &str, platform: Platform, event: TrackingEvent) -> String {
    let body = tracking_template(platform, event).unwrap_or_default();
    format!(
        "<!-- {} tracking for the {} ({}) -->\n{}\n{}\n",
        event.name(),
        event.placement(),
        platform.name(),
        script_tag(site_id),
        body.replace("{site_id}", site_id)
    )
}

/// Reference entry for one API operation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointReference {
    pub operation: Operation,
    pub summary: &'static str,
    pub docs_url: &'static str,
    pub notes: &'static [&'static str],
}

const ENDPOINTS: &[EndpointReference] = &[
    EndpointReference {
        operation: Operation::Search,
        summary: "Full-text product search with filtering, sorting, faceting and merchandising.",
        docs_url: "https://docs.searchspring.com/reference/search",
        notes: &[
            "Always send siteId and resultsFormat=native.",
            "Repeat filter.<field> once per value; values are OR-ed.",
            "bgfilter.<field> filters results without exposing facet state.",
            "sort.<field>=asc|desc; multiple sort keys apply in order.",
        ],
    },
    EndpointReference {
        operation: Operation::Autocomplete,
        summary: "Product results for a partial query while the shopper types.",
        docs_url: "https://docs.searchspring.com/reference/autocomplete",
        notes: &["Debounce keystrokes.", "Pair with suggest for query completions."],
    },
    EndpointReference {
        operation: Operation::Facets,
        summary: "Facet values only: a search request with resultsPerPage=0.",
        docs_url: "https://docs.searchspring.com/reference/search",
        notes: &["resultsPerPage is always 0.", "Use includedFacets to limit the response."],
    },
    EndpointReference {
        operation: Operation::Suggest,
        summary: "Spell-corrected query suggestions.",
        docs_url: "https://docs.searchspring.com/reference/suggest",
        notes: &["Requires q."],
    },
    EndpointReference {
        operation: Operation::Trending,
        summary: "Most popular search queries for the site.",
        docs_url: "https://docs.searchspring.com/reference/trending",
        notes: &["Use limit to cap the number of terms."],
    },
    EndpointReference {
        operation: Operation::Recommendations,
        summary: "Personalized product recommendations for configured profiles.",
        docs_url: "https://docs.searchspring.com/reference/recommendations",
        notes: &[
            "tags is required and must name dashboard profiles.",
            "List parameters (products, cart, lastViewed, limits, ...) are comma-joined.",
        ],
    },
    EndpointReference {
        operation: Operation::Meta,
        summary: "Site metadata: sort options, facet configuration.",
        docs_url: "https://docs.searchspring.com/reference/meta",
        notes: &[],
    },
    EndpointReference {
        operation: Operation::Beacon,
        summary: "Tracking events (product views, carts, orders, recommendation interactions).",
        docs_url: "https://docs.searchspring.com/reference/tracking",
        notes: &[
            "All events of one page view share userId, sessionId and pageLoadId.",
            "Prefer the tracking script over raw beacon calls.",
        ],
    },
];

pub fn endpoint_reference(operation: Operation) -> Option<&'static EndpointReference> {
    ENDPOINTS.iter().find(|e| e.operation == operation)
}

/// Markdown rendering of an endpoint reference including its request path.
pub fn render_endpoint_reference(reference: &EndpointReference, site_id: &str) -> String {
    let op = reference.operation;
    let mut out = format!(
        "## {} ({} {})\n\n{}\n\nDocs: {}\n",
        op.name(),
        match op.method() {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        },
        op.path(site_id),
        reference.summary,
        reference.docs_url
    );
    if !reference.notes.is_empty() {
        out.push('\n');
        for note in reference.notes {
            out.push_str("- ");
            out.push_str(note);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{CodeType, ValidationInput, validate};

    #[test]
    fn every_platform_event_pair_has_a_template() {
        for platform in Platform::ALL {
            for event in TrackingEvent::ALL {
                assert!(
                    tracking_template(platform, event).is_some(),
                    "missing {platform:?} × {event:?}"
                );
            }
        }
    }

    #[test]
    fn rendered_snippets_pass_the_validator() {
        for platform in Platform::ALL {
            for event in TrackingEvent::ALL {
                let code = render_tracking_code("abc123", platform, event);
                let report = validate(&ValidationInput {
                    code,
                    code_type: CodeType::Tracking,
                    platform: Some(platform),
                    issue: None,
                });
                assert!(
                    !report.has_errors(),
                    "{platform:?} {event:?}: {:?}",
                    report.errors()
                );
            }
        }
    }

    #[test]
    fn script_tag_substitutes_site_id() {
        let tag = script_tag("xyz789");
        assert!(tag.contains("snapui.searchspring.io/xyz789/bundle.js"));
        assert!(!tag.contains("{site_id}"));
    }

    #[test]
    fn every_operation_has_a_reference() {
        for op in Operation::ALL {
            let reference = endpoint_reference(op).expect("reference");
            let text = render_endpoint_reference(reference, "abc123");
            assert!(text.contains(&op.path("abc123")));
        }
    }

    #[test]
    fn tracking_event_accepts_short_aliases() {
        let e: TrackingEvent = serde_json::from_str("\"cart\"").expect("alias");
        assert_eq!(e, TrackingEvent::CartView);
        let e: TrackingEvent = serde_json::from_str("\"order_transaction\"").expect("name");
        assert_eq!(e, TrackingEvent::OrderTransaction);
    }
}
