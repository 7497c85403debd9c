//! Command handlers. Each prints its result to stdout.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::json;

use shopsearch_core::client::SearchClient;
use shopsearch_core::config::ApiConfig;
use shopsearch_core::request::{Operation, RequestCompiler};
use shopsearch_core::validator::{self, CodeType, Platform, ValidationInput};

use crate::{Error, Result};

/// Parse a kebab/lowercase name through the type's serde representation,
/// so CLI names and their aliases match the MCP tool arguments.
fn parse_name<T: DeserializeOwned>(what: &str, raw: &str) -> Result<T> {
    let normalized = raw.trim().to_ascii_lowercase();
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| Error::Custom(format!("unknown {what} \"{raw}\"")))
}

pub fn compile(
    operation: &str,
    params: &str,
    params_file: Option<&Path>,
    site_id: Option<String>,
) -> Result<()> {
    let operation: Operation = operation.parse()?;
    let raw = match params_file {
        Some(path) => std::fs::read_to_string(path)?,
        None => params.to_string(),
    };
    let args: serde_json::Value = serde_json::from_str(&raw)?;
    if !args.is_object() {
        return Err(Error::Custom("--params must be a JSON object".to_string()));
    }

    let mut config = ApiConfig::from_env();
    if site_id.is_some() {
        config.site_id = site_id;
    }

    let request = RequestCompiler::new(config.site_id.clone()).compile_value(operation, args)?;
    log::debug!("compiled {} request", operation.name());

    let client = SearchClient::new(config)?;
    let output = json!({
        "url": client.full_url(&request),
        "request": request,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Prints the report and fails when it contains errors.
pub fn validate(
    file: &Path,
    code_type: &str,
    platform: Option<&str>,
    issue: Option<String>,
) -> Result<()> {
    let code = std::fs::read_to_string(file)?;
    let input = ValidationInput {
        code,
        code_type: parse_name::<CodeType>("code type", code_type)?,
        platform: platform
            .map(|p| parse_name::<Platform>("platform", p))
            .transpose()?,
        issue,
    };

    let report = validator::validate(&input);
    println!("{}", report.render());

    if report.has_errors() {
        return Err(Error::Custom(format!(
            "validation failed with {} error(s)",
            report.errors().len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_name_accepts_aliases_case_insensitively() {
        let code_type: CodeType = parse_name("code type", "Beacon").expect("alias");
        assert_eq!(code_type, CodeType::Tracking);
        let platform: Platform = parse_name("platform", "big-commerce").expect("alias");
        assert_eq!(platform, Platform::Bigcommerce);
    }

    #[test]
    fn parse_name_rejects_unknown_values() {
        let err = parse_name::<Platform>("platform", "wix").expect_err("unknown");
        assert_eq!(err.to_string(), "unknown platform \"wix\"");
    }
}
