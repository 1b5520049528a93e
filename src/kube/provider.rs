//! Cluster resource provider boundary
//!
//! Everything the mapper needs from a cluster: namespace listing plus typed
//! list/get per resource kind. Implemented by the live kube-rs client and by
//! the offline manifest provider.

use async_trait::async_trait;

use crate::error::ProviderResult;
use crate::models::{ResourceKind, ResourcePayload};

/// Read-only access to cluster objects, scoped by namespace
///
/// Cluster-scoped kinds ignore the namespace argument.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClusterProvider: Send + Sync {
    /// Names of all namespaces visible to the caller
    async fn list_namespaces(&self) -> ProviderResult<Vec<String>>;

    /// All objects of `kind` in `namespace`
    async fn list(&self, kind: ResourceKind, namespace: &str)
    -> ProviderResult<Vec<ResourcePayload>>;

    /// One object by name; a missing object fails with `NotFound`
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> ProviderResult<ResourcePayload>;
}
