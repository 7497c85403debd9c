use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("shopsearch_cli").expect("binary");
    cmd.env_remove("SHOPSEARCH_SITE_ID")
        .env_remove("SHOPSEARCH_API_BASE_URL")
        .env_remove("SHOPSEARCH_BEACON_URL")
        .env("RUST_LOG", "info");
    cmd
}

fn code_file(code: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(code.as_bytes()).expect("write code");
    file
}

#[test]
fn version_prints_package_version() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn compile_search_repeats_filter_keys() {
    cli()
        .args([
            "compile",
            "search",
            "--site-id",
            "abc123",
            "--params",
            r#"{"q":"jacket","filters":{"color":["red","blue"]},"userId":"u1","sessionId":"s1","pageLoadId":"p1"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://abc123.a.searchspring.io/api/search/search.json?",
        ))
        .stdout(predicate::str::contains("filter.color=red&filter.color=blue"));
}

#[test]
fn compile_facets_pins_results_per_page() {
    cli()
        .args([
            "compile",
            "facets",
            "--site-id",
            "abc123",
            "--params",
            r#"{"resultsPerPage":48}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("resultsPerPage=0"))
        .stdout(predicate::str::contains("resultsPerPage=48").not());
}

#[test]
fn compile_reads_params_file() {
    let params = code_file(r#"{"tags":["similar"],"products":["A1","B2"]}"#);
    cli()
        .args(["compile", "recommendations", "--site-id", "abc123", "--params-file"])
        .arg(params.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("/boost/abc123/recommend"))
        .stdout(predicate::str::contains("products=A1%2CB2"));
}

#[test]
fn compile_recommendations_without_tags_fails() {
    cli()
        .args([
            "compile",
            "recommendations",
            "--site-id",
            "abc123",
            "--params",
            r#"{"tags":[]}"#,
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("tags"));
}

#[test]
fn compile_without_site_id_fails() {
    cli()
        .args(["compile", "meta"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("siteId"));
}

#[test]
fn compile_unknown_operation_fails() {
    cli()
        .args(["compile", "checkout", "--site-id", "abc123"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown operation"));
}

#[test]
fn validate_clean_tracking_snippet_succeeds() {
    let file = code_file(
        r#"<script src="https://snapui.searchspring.io/abc123/bundle.js" defer></script>
<script>
document.addEventListener('DOMContentLoaded', () => {
  searchspring.tracker.track.product.view({ siteId: 'abc123', sku: 'SKU-1' });
});
</script>"#,
    );
    cli()
        .args(["validate", "--code-type", "tracking", "--file"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Result: 0 error(s)"))
        .stdout(predicate::str::contains("Script inclusion found"));
}

#[test]
fn validate_missing_script_fails_with_troubleshooting() {
    let file = code_file("searchspring.tracker.track.cart.view({ items: [{ sku: 'A' }] });");
    cli()
        .args([
            "validate",
            "--code-type",
            "beacon",
            "--platform",
            "shopify",
            "--issue",
            "searchspring is undefined",
            "--file",
        ])
        .arg(file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing script inclusion"))
        .stdout(predicate::str::contains("quantity field"))
        .stdout(predicate::str::contains("Troubleshooting: Script load order"));
}

#[test]
fn validate_unknown_platform_fails() {
    let file = code_file("fetch('/api/search/search.json')");
    cli()
        .args(["validate", "--code-type", "search", "--platform", "wix", "--file"])
        .arg(file.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown platform"));
}
