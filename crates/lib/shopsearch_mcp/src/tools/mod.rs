//! Tool parameter types, response types and the pure helpers behind each tool.

pub mod guidance;
pub mod params;
pub mod proxy;
pub mod types;
