//! Configuration schema definitions
//!
//! Defines the structure of the configuration file using serde. Every key is
//! optional; omitted keys take the built-in defaults below.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::MapperError;
use crate::mapper::DiscoveryOptions;
use crate::render::RenderOptions;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Restrict discovery to a single namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Namespaces skipped when discovering all namespaces
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_namespaces: Vec<String>,

    /// Path to a kubeconfig file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DisplayConfig {
    /// Print status, ports, TLS and replica detail lines
    #[serde(default = "default_true")]
    pub show_details: bool,

    #[serde(default = "default_true")]
    pub show_colors: bool,

    /// Omit the banner, blank separators and empty layers
    #[serde(default = "default_false")]
    pub compact: bool,

    #[serde(default)]
    pub format: OutputFormat,
}

/// Discovery tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Namespaces discovered concurrently (at least 1)
    #[serde(default = "default_namespace_concurrency")]
    pub namespace_concurrency: usize,

    /// Retries for transient provider failures
    #[serde(default)]
    pub retries: u32,

    /// Linear backoff step between retries
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Drop a whole namespace whenever one kind fails to list
    #[serde(default = "default_false")]
    pub strict: bool,
}

/// Output format
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_namespace_concurrency() -> usize {
    4
}

fn default_retry_backoff_ms() -> u64 {
    200
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_details: default_true(),
            show_colors: default_true(),
            compact: default_false(),
            format: OutputFormat::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            namespace_concurrency: default_namespace_concurrency(),
            retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            strict: default_false(),
        }
    }
}

/// Whether `name` is a valid DNS-1123 label (namespace names)
pub fn is_valid_namespace(name: &str) -> bool {
    (1..=63).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.starts_with('-')
        && !name.ends_with('-')
}

impl Config {
    /// Reject values that would make discovery meaningless
    pub fn validate(&self) -> Result<(), MapperError> {
        if let Some(namespace) = &self.namespace
            && !is_valid_namespace(namespace)
        {
            return Err(MapperError::Configuration(format!(
                "invalid namespace name: {:?}",
                namespace
            )));
        }
        if let Some(invalid) = self
            .exclude_namespaces
            .iter()
            .find(|ns| !is_valid_namespace(ns))
        {
            return Err(MapperError::Configuration(format!(
                "invalid excluded namespace name: {:?}",
                invalid
            )));
        }
        if self.discovery.namespace_concurrency == 0 {
            return Err(MapperError::Configuration(
                "discovery.namespaceConcurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            namespace_concurrency: self.discovery.namespace_concurrency,
            strict: self.discovery.strict,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            show_details: self.display.show_details,
            color: self.display.show_colors,
            compact: self.display.compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_name_rules() {
        assert!(is_valid_namespace("default"));
        assert!(is_valid_namespace("team-a1"));
        assert!(!is_valid_namespace(""));
        assert!(!is_valid_namespace("-lead"));
        assert!(!is_valid_namespace("trail-"));
        assert!(!is_valid_namespace("Upper"));
        assert!(!is_valid_namespace("dotted.name"));
        assert!(!is_valid_namespace(&"a".repeat(64)));
        assert!(is_valid_namespace(&"a".repeat(63)));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.discovery.namespace_concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(MapperError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_excluded_namespace() {
        let config = Config {
            exclude_namespaces: vec!["kube-system".into(), "Bad_NS".into()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Bad_NS"));
    }

    #[test]
    fn test_defaults_match_serde_defaults() {
        let parsed: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(parsed, Config::default());
        assert!(parsed.display.show_details);
        assert_eq!(parsed.discovery.namespace_concurrency, 4);
        assert_eq!(parsed.discovery.retry_backoff_ms, 200);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let result: Result<Config, _> = serde_yaml::from_str("display:\n  format: xml\n");
        assert!(result.is_err());
    }
}
