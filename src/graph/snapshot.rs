//! Serializable view of a finished graph

use std::collections::BTreeMap;

use serde::Serialize;

use super::ResourceGraph;
use crate::error::DiscoveryWarning;
use crate::models::{Relationship, ResourceId, ResourceKind, ResourceStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    pub status: ResourceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEntry {
    pub kind: crate::models::RelationshipKind,
    pub source: String,
    pub target: String,
    pub description: String,
}

impl RelationshipEntry {
    fn describe(id: &ResourceId) -> String {
        if id.namespace.is_empty() {
            id.to_string()
        } else {
            format!("{}/{}", id.namespace, id)
        }
    }
}

impl From<&Relationship> for RelationshipEntry {
    fn from(rel: &Relationship) -> Self {
        Self {
            kind: rel.kind,
            source: Self::describe(&rel.source),
            target: Self::describe(&rel.target),
            description: rel.description.clone(),
        }
    }
}

/// Graph contents without payloads, in deterministic order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub namespaces: Vec<String>,
    pub resources: Vec<ResourceEntry>,
    pub relationships: Vec<RelationshipEntry>,
    pub warnings: Vec<DiscoveryWarning>,
}

impl GraphSnapshot {
    pub(crate) fn from_graph(graph: &ResourceGraph) -> Self {
        let resources: Vec<ResourceEntry> = graph
            .all_resources()
            .into_iter()
            .map(|r| ResourceEntry {
                kind: r.id.kind,
                namespace: r.id.namespace,
                name: r.id.name,
                labels: r.labels,
                status: r.status,
            })
            .collect();

        let mut namespaces: Vec<String> = graph
            .resources_of_kind(ResourceKind::Namespace)
            .into_iter()
            .map(|r| r.id.name)
            .collect();
        namespaces.sort();

        let relationships = graph
            .all_relationships()
            .iter()
            .map(RelationshipEntry::from)
            .collect();

        Self {
            namespaces,
            resources,
            relationships,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: &[DiscoveryWarning]) -> Self {
        self.warnings = warnings.to_vec();
        self.warnings.sort();
        self
    }
}
