//! Kubernetes access module
//!
//! Handles connection to the Kubernetes API server and provides the
//! `ClusterProvider` implementations used by discovery:
//! - `KubeProvider`: live cluster through kube-rs
//! - `ManifestProvider`: offline, backed by YAML manifests
//! - `RetryingProvider`: bounded retry around any provider
//!
//! Supports HTTP/HTTPS proxy configuration via the standard environment
//! variables (`HTTP_PROXY`, `HTTPS_PROXY`, `NO_PROXY`).

mod client_provider;
mod manifest;
mod provider;
mod retry;

pub use client_provider::KubeProvider;
pub use manifest::ManifestProvider;
#[cfg(test)]
pub use provider::MockClusterProvider;
pub use provider::ClusterProvider;
pub use retry::RetryingProvider;

use std::path::Path;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

/// Initialize and return a Kubernetes client
///
/// Without an explicit kubeconfig path or context the default loading strategy
/// applies:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client(kubeconfig: Option<&Path>, context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .context("Failed to load kubeconfig")?
        }
        None if context.is_some() => Config::from_kubeconfig(&options)
            .await
            .context("Failed to load kubeconfig context")?,
        None => Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    tracing::debug!(cluster = %config.cluster_url, "Connecting to cluster");
    let client = Client::try_from(config).context("Failed to create Kubernetes client")?;
    Ok(client)
}

/// Current context name from a kubeconfig, for display
pub fn current_context(kubeconfig: Option<&Path>) -> Option<String> {
    let config = match kubeconfig {
        Some(path) => Kubeconfig::read_from(path).ok()?,
        None => Kubeconfig::read().ok()?,
    };
    config.current_context
}
