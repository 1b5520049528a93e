//! Live cluster provider backed by kube-rs

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Endpoints, Namespace, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};

use super::provider::ClusterProvider;
use crate::error::{ProviderError, ProviderResult};
use crate::models::{KindObject, ResourceKind, ResourcePayload};

/// `ClusterProvider` over a kube-rs `Client`
#[derive(Clone)]
pub struct KubeProvider {
    client: Client,
}

impl KubeProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list_namespaced<K>(&self, namespace: &str) -> ProviderResult<Vec<ResourcePayload>>
    where
        K: KindObject + kube::Resource<Scope = NamespaceResourceScope>,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ProviderError::from_kube(e, K::KIND, namespace, ""))?;
        Ok(list
            .items
            .into_iter()
            .map(|obj| K::wrap(Arc::new(obj)))
            .collect())
    }

    async fn list_cluster<K: KindObject>(&self) -> ProviderResult<Vec<ResourcePayload>> {
        let api: Api<K> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ProviderError::from_kube(e, K::KIND, "", ""))?;
        Ok(list
            .items
            .into_iter()
            .map(|obj| K::wrap(Arc::new(obj)))
            .collect())
    }

    async fn get_namespaced<K>(&self, namespace: &str, name: &str) -> ProviderResult<ResourcePayload>
    where
        K: KindObject + kube::Resource<Scope = NamespaceResourceScope>,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let obj = api
            .get(name)
            .await
            .map_err(|e| ProviderError::from_kube(e, K::KIND, namespace, name))?;
        Ok(K::wrap(Arc::new(obj)))
    }

    async fn get_cluster<K: KindObject>(&self, name: &str) -> ProviderResult<ResourcePayload> {
        let api: Api<K> = Api::all(self.client.clone());
        let obj = api
            .get(name)
            .await
            .map_err(|e| ProviderError::from_kube(e, K::KIND, "", name))?;
        Ok(K::wrap(Arc::new(obj)))
    }
}

#[async_trait]
impl ClusterProvider for KubeProvider {
    async fn list_namespaces(&self) -> ProviderResult<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| ProviderError::from_kube(e, ResourceKind::Namespace, "", ""))?;
        tracing::debug!(count = list.items.len(), "Listed namespaces");
        Ok(list.items.iter().map(|ns| ns.name_any()).collect())
    }

    async fn list(
        &self,
        kind: ResourceKind,
        namespace: &str,
    ) -> ProviderResult<Vec<ResourcePayload>> {
        macro_rules! list_kind {
            (cluster $type:ty) => {
                self.list_cluster::<$type>().await
            };
            ($type:ty) => {
                self.list_namespaced::<$type>(namespace).await
            };
        }

        match kind {
            ResourceKind::Namespace => list_kind!(cluster Namespace),
            ResourceKind::IngressClass => list_kind!(cluster IngressClass),
            ResourceKind::Pod => list_kind!(Pod),
            ResourceKind::Service => list_kind!(Service),
            ResourceKind::Endpoints => list_kind!(Endpoints),
            ResourceKind::Ingress => list_kind!(Ingress),
            ResourceKind::ConfigMap => list_kind!(ConfigMap),
            ResourceKind::Deployment => list_kind!(Deployment),
            ResourceKind::HorizontalPodAutoscaler => list_kind!(HorizontalPodAutoscaler),
            ResourceKind::Secret => list_kind!(Secret),
        }
    }

    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> ProviderResult<ResourcePayload> {
        macro_rules! get_kind {
            (cluster $type:ty) => {
                self.get_cluster::<$type>(name).await
            };
            ($type:ty) => {
                self.get_namespaced::<$type>(namespace, name).await
            };
        }

        match kind {
            ResourceKind::Namespace => get_kind!(cluster Namespace),
            ResourceKind::IngressClass => get_kind!(cluster IngressClass),
            ResourceKind::Pod => get_kind!(Pod),
            ResourceKind::Service => get_kind!(Service),
            ResourceKind::Endpoints => get_kind!(Endpoints),
            ResourceKind::Ingress => get_kind!(Ingress),
            ResourceKind::ConfigMap => get_kind!(ConfigMap),
            ResourceKind::Deployment => get_kind!(Deployment),
            ResourceKind::HorizontalPodAutoscaler => get_kind!(HorizontalPodAutoscaler),
            ResourceKind::Secret => get_kind!(Secret),
        }
    }
}
