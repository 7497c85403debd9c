//! # shopsearch_core
//!
//! Core domain logic for ShopSearch: the request compiler, the code
//! validator, the id generator and the static integration guidance.

pub mod client;
pub mod config;
pub mod guidance;
pub mod ids;
pub mod query;
pub mod request;
pub mod validator;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
