//! API configuration.
//!
//! Passed explicitly to the client and server; nothing here is global.

use std::time::Duration;

const DEFAULT_API_BASE_URL: &str = "https://{site_id}.a.searchspring.io";
const DEFAULT_BEACON_URL: &str = "https://beacon.searchspring.io";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for talking to the search API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    /// Default site id used when a call does not supply one.
    pub site_id: Option<String>,
    /// API base URL. `{site_id}` is replaced per request.
    pub api_base_url: String,
    /// Beacon (tracking) base URL.
    pub beacon_url: String,
    /// Per-call HTTP timeout.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            site_id: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            beacon_url: DEFAULT_BEACON_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                  | Default                                 |
    /// |---------------------------|-----------------------------------------|
    /// | `SHOPSEARCH_SITE_ID`      | unset                                   |
    /// | `SHOPSEARCH_API_BASE_URL` | `https://{site_id}.a.searchspring.io`   |
    /// | `SHOPSEARCH_BEACON_URL`   | `https://beacon.searchspring.io`        |
    /// | `SHOPSEARCH_TIMEOUT_SECS` | `10`                                    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; used by `from_env` and tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match non_empty("SHOPSEARCH_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    log::warn!("ignoring invalid SHOPSEARCH_TIMEOUT_SECS={raw}");
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            site_id: non_empty("SHOPSEARCH_SITE_ID").map(|v| v.trim().to_string()),
            api_base_url: non_empty("SHOPSEARCH_API_BASE_URL").unwrap_or(defaults.api_base_url),
            beacon_url: non_empty("SHOPSEARCH_BEACON_URL").unwrap_or(defaults.beacon_url),
            timeout,
        }
    }

    /// API base URL for a site, without a trailing slash.
    pub fn api_base_for(&self, site_id: &str) -> String {
        self.api_base_url
            .replace("{site_id}", site_id)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn env_values_override_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("SHOPSEARCH_SITE_ID", " abc123 "),
            ("SHOPSEARCH_API_BASE_URL", "http://localhost:9000/"),
            ("SHOPSEARCH_TIMEOUT_SECS", "3"),
        ]));
        assert_eq!(config.site_id.as_deref(), Some("abc123"));
        assert_eq!(config.api_base_for("abc123"), "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_timeout_falls_back() {
        let config = ApiConfig::from_lookup(lookup(&[("SHOPSEARCH_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.timeout, Duration::from_secs(10));
        let config = ApiConfig::from_lookup(lookup(&[("SHOPSEARCH_TIMEOUT_SECS", "0")]));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn base_url_substitutes_site_id() {
        let config = ApiConfig::default();
        assert_eq!(config.api_base_for("abc123"), "https://abc123.a.searchspring.io");
    }
}
