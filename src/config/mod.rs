//! Configuration system for kube-mapper
//!
//! Layers built-in defaults, an optional YAML file and environment overrides.
//! Command-line flags are applied on top by the binary.

pub mod loader;
pub mod paths;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{Config, DiscoveryConfig, DisplayConfig, OutputFormat, is_valid_namespace};
