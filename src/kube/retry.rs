//! Bounded retry around a provider
//!
//! Only `Unavailable` failures are retried. Backoff grows linearly with the
//! attempt number and every sleep observes the cancellation token.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::provider::ClusterProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{ResourceKind, ResourcePayload};

pub struct RetryingProvider {
    inner: Arc<dyn ClusterProvider>,
    retries: u32,
    backoff: Duration,
    token: CancellationToken,
}

impl RetryingProvider {
    pub fn new(
        inner: Arc<dyn ClusterProvider>,
        retries: u32,
        backoff: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            inner,
            retries,
            backoff,
            token,
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> ProviderResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = ProviderResult<T>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Err(err) if err.is_transient() && attempt < self.retries => {
                    attempt += 1;
                    let delay = self.backoff * attempt;
                    tracing::warn!(
                        operation,
                        attempt,
                        max = self.retries,
                        error = %err,
                        "Retrying provider call"
                    );
                    tokio::select! {
                        _ = self.token.cancelled() => return Err(ProviderError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl ClusterProvider for RetryingProvider {
    async fn list_namespaces(&self) -> ProviderResult<Vec<String>> {
        self.with_retry("list namespaces", || self.inner.list_namespaces())
            .await
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> ProviderResult<Vec<ResourcePayload>> {
        self.with_retry("list", || self.inner.list(kind, namespace))
            .await
    }

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> ProviderResult<ResourcePayload> {
        self.with_retry("get", || self.inner.get(kind, namespace, name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kube::MockClusterProvider;

    fn retrying(mock: MockClusterProvider, retries: u32) -> RetryingProvider {
        RetryingProvider::new(
            Arc::new(mock),
            retries,
            Duration::from_millis(1),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_retries_unavailable_until_success() {
        let mut mock = MockClusterProvider::new();
        let mut calls = 0;
        mock.expect_list_namespaces().times(3).returning(move || {
            calls += 1;
            if calls < 3 {
                Err(ProviderError::Unavailable("connection reset".into()))
            } else {
                Ok(vec!["default".to_string()])
            }
        });

        let provider = retrying(mock, 2);
        assert_eq!(
            provider.list_namespaces().await.unwrap(),
            vec!["default".to_string()]
        );
    }

    #[tokio::test]
    async fn test_gives_up_after_retries() {
        let mut mock = MockClusterProvider::new();
        mock.expect_list()
            .times(2)
            .returning(|_, _| Err(ProviderError::Unavailable("timeout".into())));

        let provider = retrying(mock, 1);
        let err = provider
            .list(ResourceKind::Pod, "default")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_permission_denied_is_not_retried() {
        let mut mock = MockClusterProvider::new();
        mock.expect_get()
            .times(1)
            .returning(|_, _, _| Err(ProviderError::PermissionDenied("forbidden".into())));

        let provider = retrying(mock, 5);
        let err = provider
            .get(ResourceKind::Secret, "default", "tls")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_cancelled_backoff_returns_cancelled() {
        let mut mock = MockClusterProvider::new();
        mock.expect_list_namespaces()
            .returning(|| Err(ProviderError::Unavailable("down".into())));

        let token = CancellationToken::new();
        let provider = RetryingProvider::new(
            Arc::new(mock),
            3,
            Duration::from_secs(60),
            token.clone(),
        );
        token.cancel();

        let err = provider.list_namespaces().await.unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
    }
}
