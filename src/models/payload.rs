//! Typed payloads carried by discovered resources
//!
//! Every discovered resource keeps a reference to the raw Kubernetes object it
//! was built from. The payload is a tagged variant keyed by kind, so renderer
//! detail lookups dispatch on the variant instead of inspecting types at runtime.

use std::fmt;
use std::sync::Arc;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Endpoints, Namespace, Pod, Secret, Service};
use k8s_openapi::api::networking::v1::{Ingress, IngressClass};
use serde::{Serialize, de::DeserializeOwned};

use super::details::{DetailField, DetailFields};
use super::resource_kind::ResourceKind;
use super::status::Summarize;

/// A Kubernetes object type the mapper knows how to discover
///
/// Implemented for each k8s-openapi type listed in `kind_objects!` below. The
/// associated `KIND` ties the Rust type to its `ResourceKind` tag.
pub trait KindObject:
    kube::Resource<DynamicType = ()>
    + Clone
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + DetailFields
    + Summarize
    + Send
    + Sync
    + 'static
{
    const KIND: ResourceKind;

    /// Wrap a shared object into its payload variant
    fn wrap(obj: Arc<Self>) -> ResourcePayload;

    /// Take the object back out of a payload of the matching variant
    fn extract(payload: ResourcePayload) -> Option<Arc<Self>>;
}

macro_rules! kind_objects {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        /// Raw object behind a discovered resource, tagged by kind
        #[derive(Debug, Clone)]
        pub enum ResourcePayload {
            $($variant(Arc<$ty>),)*
        }

        impl ResourcePayload {
            /// Kind tag of the wrapped object
            pub fn kind(&self) -> ResourceKind {
                match self {
                    $(ResourcePayload::$variant(_) => ResourceKind::$variant,)*
                }
            }

            /// Decode a JSON object of the given kind into its typed payload
            pub fn from_json(
                kind: ResourceKind,
                value: serde_json::Value,
            ) -> Result<Self, serde_json::Error> {
                match kind {
                    $(ResourceKind::$variant => serde_json::from_value::<$ty>(value)
                        .map(|obj| ResourcePayload::$variant(Arc::new(obj))),)*
                }
            }

            /// Kind-specific detail lines for the renderer
            pub fn detail_fields(&self) -> Vec<DetailField> {
                match self {
                    $(ResourcePayload::$variant(obj) => obj.detail_fields(),)*
                }
            }

            /// Object name and namespace (empty for cluster-scoped kinds)
            pub fn name_and_namespace(&self) -> (String, String) {
                use kube::ResourceExt;
                match self {
                    $(ResourcePayload::$variant(obj) => (
                        obj.name_any(),
                        if ResourceKind::$variant.is_cluster_scoped() {
                            String::new()
                        } else {
                            obj.namespace().unwrap_or_default()
                        },
                    ),)*
                }
            }

        }

        $(
            impl KindObject for $ty {
                const KIND: ResourceKind = ResourceKind::$variant;

                fn wrap(obj: Arc<Self>) -> ResourcePayload {
                    ResourcePayload::$variant(obj)
                }

                fn extract(payload: ResourcePayload) -> Option<Arc<Self>> {
                    match payload {
                        ResourcePayload::$variant(obj) => Some(obj),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

kind_objects! {
    Namespace => Namespace,
    Pod => Pod,
    Service => Service,
    Endpoints => Endpoints,
    Ingress => Ingress,
    ConfigMap => ConfigMap,
    Deployment => Deployment,
    HorizontalPodAutoscaler => HorizontalPodAutoscaler,
    Secret => Secret,
    IngressClass => IngressClass,
}
