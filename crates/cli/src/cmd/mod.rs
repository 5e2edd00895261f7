//! CLI command implementations

pub mod config;
pub mod draft;
pub mod price;
