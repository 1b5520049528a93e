//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Command-line flags (applied by the caller)
    /// 2. Environment variable overrides
    /// 3. Config file (explicit path, or the default path when present)
    /// 4. Built-in defaults
    ///
    /// A missing default file falls back to defaults; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => {
                let path = paths::config_path();
                if path.exists() {
                    Self::load_file(&path)?
                } else {
                    tracing::debug!("No config file at {}, using defaults", path.display());
                    Config::default()
                }
            }
        };

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::load_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from YAML text; unknown keys are rejected
    pub fn load_str(contents: &str) -> Result<Config> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(contents)?;
        Ok(config)
    }

    /// Apply environment variable overrides from the process environment
    pub fn apply_env_overrides(config: Config) -> Config {
        Self::apply_overrides_from(config, |key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`
    ///
    /// - `NO_COLOR` (any non-empty value) disables colors
    /// - `KUBE_MAPPER_NAMESPACE` sets the namespace
    pub fn apply_overrides_from<F>(mut config: Config, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            config.display.show_colors = false;
        }

        if let Some(namespace) = lookup("KUBE_MAPPER_NAMESPACE").filter(|v| !v.is_empty()) {
            config.namespace = Some(namespace);
        }

        config
    }
}
