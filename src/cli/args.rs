//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, OutputFormat};

/// Map how Kubernetes resources in a cluster relate to each other
#[derive(Parser, Debug, Default)]
#[command(name = "kube-mapper", version)]
#[command(
    about = "Discover Kubernetes resources and render how traffic, workloads and configuration connect",
    long_about = None
)]
pub struct Args {
    /// Only map this namespace
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Skip a namespace when mapping all namespaces (repeatable)
    #[arg(long = "exclude-ns", value_name = "NAMESPACE")]
    pub exclude_ns: Vec<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read resources from a YAML manifest instead of a cluster
    #[arg(long, value_name = "MANIFEST")]
    pub from_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Hide status, port, TLS and replica detail lines
    #[arg(long)]
    pub no_details: bool,

    /// Omit the banner, separators and empty layers
    #[arg(long)]
    pub compact: bool,

    /// Output format
    #[arg(long, short = 'o', value_enum)]
    pub output: Option<OutputFormat>,

    /// Namespaces discovered concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Retries for transient API failures
    #[arg(long)]
    pub retries: Option<u32>,

    /// Drop a namespace entirely when any kind fails to list
    #[arg(long)]
    pub strict: bool,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    pub debug: bool,
}

impl Args {
    /// Apply flags on top of the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(namespace) = &self.namespace {
            config.namespace = Some(namespace.clone());
        }
        if !self.exclude_ns.is_empty() {
            config.exclude_namespaces = self.exclude_ns.clone();
        }
        if let Some(kubeconfig) = &self.kubeconfig {
            config.kubeconfig = Some(kubeconfig.clone());
        }
        if let Some(context) = &self.context {
            config.context = Some(context.clone());
        }
        if self.no_color {
            config.display.show_colors = false;
        }
        if self.no_details {
            config.display.show_details = false;
        }
        if self.compact {
            config.display.compact = true;
        }
        if let Some(format) = self.output {
            config.display.format = format;
        }
        if let Some(concurrency) = self.concurrency {
            config.discovery.namespace_concurrency = concurrency;
        }
        if let Some(retries) = self.retries {
            config.discovery.retries = retries;
        }
        if self.strict {
            config.discovery.strict = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "kube-mapper",
            "-n",
            "web",
            "--exclude-ns",
            "kube-system",
            "--exclude-ns",
            "monitoring",
            "--no-color",
            "-o",
            "json",
            "--concurrency",
            "2",
            "--strict",
        ]);
        let mut config = Config {
            namespace: Some("from-file".into()),
            exclude_namespaces: vec!["legacy".into()],
            ..Default::default()
        };
        args.apply_to(&mut config);

        assert_eq!(config.namespace.as_deref(), Some("web"));
        assert_eq!(config.exclude_namespaces, vec!["kube-system", "monitoring"]);
        assert!(!config.display.show_colors);
        assert_eq!(config.display.format, OutputFormat::Json);
        assert_eq!(config.discovery.namespace_concurrency, 2);
        assert!(config.discovery.strict);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let args = Args::default();
        let mut config = Config::default();
        config.display.compact = true;
        config.discovery.retries = 3;
        args.apply_to(&mut config);

        assert!(config.display.compact);
        assert_eq!(config.discovery.retries, 3);
        assert!(config.display.show_details);
    }

    #[test]
    fn test_invalid_output_format_is_rejected() {
        assert!(Args::try_parse_from(["kube-mapper", "-o", "xml"]).is_err());
    }
}
