// @awa-component: NET-SearchClient
//
//! HTTP transport for compiled requests.
//!
//! One `reqwest::Client` per `SearchClient`, configured with the per-call
//! timeout from [`ApiConfig`]. Each call is independent; there is no retry.

use reqwest::{Client, Request};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::request::{CompiledRequest, HttpMethod, Operation};

/// Transport errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Response parse error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Sends compiled requests to the search API.
#[derive(Clone, Debug)]
pub struct SearchClient {
    http: Client,
    config: ApiConfig,
}

impl SearchClient {
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shopsearch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Absolute URL (without query) for a compiled request.
    pub fn url_for(&self, request: &CompiledRequest) -> String {
        let base = match request.operation {
            Operation::Beacon => self.config.beacon_url.trim_end_matches('/').to_string(),
            _ => self.config.api_base_for(&request.site_id),
        };
        format!("{base}{}", request.path)
    }

    /// Absolute URL including the encoded query string.
    pub fn full_url(&self, request: &CompiledRequest) -> String {
        let url = self.url_for(request);
        if request.params.is_empty() {
            url
        } else {
            format!("{url}?{}", request.params.to_query_string())
        }
    }

    /// Build the `reqwest::Request` without sending it.
    pub fn build(&self, request: &CompiledRequest) -> Result<Request, ClientError> {
        let url = self.url_for(request);
        let builder = match request.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };
        let builder = builder.query(request.params.as_pairs());
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };
        Ok(builder.build()?)
    }

    /// Send a compiled request and return the JSON body.
    ///
    /// Empty bodies (beacon acknowledgements) decode to `null`.
    pub async fn send(&self, request: &CompiledRequest) -> Result<serde_json::Value, ClientError> {
        let http_request = self.build(request)?;
        log::debug!(
            "{} {} {}",
            request.operation.name(),
            http_request.method(),
            http_request.url()
        );

        let resp = self.http.execute(http_request).await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Status { status, body });
        }
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}
