//! Proxy helpers: turn a compiled request into a dry-run description or a
//! live API response.

use shopsearch_core::client::{ClientError, SearchClient};
use shopsearch_core::request::CompiledRequest;

use crate::tools::types::{DryRunResult, ProxyResult};

pub fn dry_run(client: &SearchClient, request: CompiledRequest) -> DryRunResult {
    DryRunResult {
        url: client.full_url(&request),
        request,
    }
}

pub async fn call(
    client: &SearchClient,
    request: &CompiledRequest,
) -> Result<ProxyResult, ClientError> {
    let response = client.send(request).await?;
    Ok(ProxyResult {
        operation: request.operation.name().to_string(),
        url: client.full_url(request),
        response,
    })
}
