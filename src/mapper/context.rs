//! Shared processing context
//!
//! Wraps the provider with typed list/get calls that return promptly once the
//! run is cancelled.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::tasks::TaskGroup;
use crate::error::{ProcessError, ProviderError, ProviderResult};
use crate::kube::ClusterProvider;
use crate::models::{KindObject, ResourceKind, ResourcePayload};

#[derive(Clone)]
pub struct ProcessContext {
    provider: Arc<dyn ClusterProvider>,
    token: CancellationToken,
}

impl ProcessContext {
    pub fn new(provider: Arc<dyn ClusterProvider>, token: CancellationToken) -> Self {
        Self { provider, token }
    }

    pub fn check_cancelled(&self) -> Result<(), ProcessError> {
        if self.token.is_cancelled() {
            Err(ProcessError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// New task group bound to this context's token
    pub fn task_group<T: Send + 'static>(&self) -> TaskGroup<T> {
        TaskGroup::new(self.token.clone())
    }

    pub async fn list_payloads(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> ProviderResult<Vec<ResourcePayload>> {
        tokio::select! {
            _ = self.token.cancelled() => Err(ProviderError::Cancelled),
            result = self.provider.list(kind, namespace) => result,
        }
    }

    pub async fn get_payload(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> ProviderResult<ResourcePayload> {
        tokio::select! {
            _ = self.token.cancelled() => Err(ProviderError::Cancelled),
            result = self.provider.get(kind, namespace, name) => result,
        }
    }

    /// List typed objects of kind `T`
    pub async fn list<T: KindObject>(&self, namespace: &str) -> ProviderResult<Vec<Arc<T>>> {
        let payloads = self.list_payloads(T::KIND, namespace).await?;
        Ok(payloads.into_iter().filter_map(T::extract).collect())
    }

    /// Get one typed object of kind `T`
    pub async fn get<T: KindObject>(&self, namespace: &str, name: &str) -> ProviderResult<Arc<T>> {
        let payload = self.get_payload(T::KIND, namespace, name).await?;
        let actual = payload.kind();
        T::extract(payload).ok_or_else(|| {
            ProviderError::Decode(format!("expected {}, provider returned {}", T::KIND, actual))
        })
    }

    /// List objects a processor reads alongside its primary kind
    ///
    /// A failed list yields no objects; only cancellation is returned.
    pub async fn list_neighbors<T: KindObject>(
        &self,
        namespace: &str,
    ) -> Result<Vec<Arc<T>>, ProcessError> {
        match self.list::<T>(namespace).await {
            Ok(objects) => Ok(objects),
            Err(ProviderError::Cancelled) => Err(ProcessError::Cancelled),
            Err(err) => {
                tracing::debug!(kind = %T::KIND, namespace, error = %err, "Skipping neighbor list");
                Ok(Vec::new())
            }
        }
    }

    /// Get a cross-referenced object, mapping absence to `None`
    pub async fn get_reference<T: KindObject>(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Arc<T>>, ProcessError> {
        match self.get::<T>(namespace, name).await {
            Ok(obj) => Ok(Some(obj)),
            Err(ProviderError::Cancelled) => Err(ProcessError::Cancelled),
            Err(err) => {
                tracing::debug!(
                    kind = %T::KIND,
                    namespace,
                    name,
                    error = %err,
                    "Skipping unresolved reference"
                );
                Ok(None)
            }
        }
    }
}
