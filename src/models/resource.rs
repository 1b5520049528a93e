//! Discovered resources and the edges between them

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use kube::ResourceExt;
use serde::Serialize;

use super::details::DetailField;
use super::payload::{KindObject, ResourcePayload};
use super::resource_kind::{RelationshipKind, ResourceKind};
use super::status::ResourceStatus;

/// Identity of a discovered object: `(kind, namespace, name)`
///
/// Cluster-scoped kinds carry an empty namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub namespace: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let namespace = if kind.is_cluster_scoped() {
            String::new()
        } else {
            namespace.into()
        };
        Self {
            kind,
            namespace,
            name: name.into(),
        }
    }

    /// Identity of a typed Kubernetes object
    pub fn of<T: KindObject>(obj: &T) -> Self {
        Self::new(T::KIND, obj.namespace().unwrap_or_default(), obj.name_any())
    }

    /// Sort key used for stable rendering order
    pub fn sort_key(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// One discovered object
#[derive(Debug, Clone)]
pub struct Resource {
    pub id: ResourceId,
    pub labels: BTreeMap<String, String>,
    pub status: ResourceStatus,
    /// Raw object, only read by renderer detail lookups
    pub payload: Option<ResourcePayload>,
}

impl Resource {
    /// Bare resource without a payload
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            labels: BTreeMap::new(),
            status: ResourceStatus::default(),
            payload: None,
        }
    }

    /// Build a resource from a typed object, summarizing its status
    pub fn from_object<T: KindObject>(obj: Arc<T>) -> Self {
        let id = ResourceId::of(obj.as_ref());
        let labels = obj.labels().clone();
        let status = obj.summarize();
        Self {
            id,
            labels,
            status,
            payload: Some(T::wrap(obj)),
        }
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.id.kind
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn namespace(&self) -> &str {
        &self.id.namespace
    }

    /// Kind-specific detail fields, empty without a payload
    pub fn detail_fields(&self) -> Vec<DetailField> {
        self.payload
            .as_ref()
            .map(ResourcePayload::detail_fields)
            .unwrap_or_default()
    }
}

/// Identity equality; payload and status never take part
impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Resource {}

/// Directed, typed and described edge between two resource identities
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub source: ResourceId,
    pub target: ResourceId,
    pub kind: RelationshipKind,
    pub description: String,
}

impl Relationship {
    pub fn new(
        source: ResourceId,
        target: ResourceId,
        kind: RelationshipKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            kind,
            description: description.into(),
        }
    }
}
